use crate::framework::{Resource, ResourceError, ResourceState};
use crate::lifecycle::Session;
use std::sync::Arc;
use tracing::instrument;

/// A brokerage office.
#[derive(Debug)]
pub struct Office {
    state: ResourceState,
}

impl Resource for Office {
    const KIND: &'static str = "Office";
    const FIELD_NAMES: &'static [&'static str] = &["links", "name", "phone"];

    fn from_state(state: ResourceState) -> Self {
        Self { state }
    }

    fn state(&self) -> &ResourceState {
        &self.state
    }
}

impl Office {
    /// A new transient office.
    pub fn new(session: &Session) -> Arc<Self> {
        session.create::<Self>()
    }

    /// Office display name.
    pub async fn name(&self) -> Result<Option<String>, ResourceError> {
        self.state.get("name").await
    }

    /// Rename the office locally; sent on the next save.
    pub async fn set_name(&self, name: &str) -> Result<(), ResourceError> {
        self.state.set("name", name).await
    }

    /// Main office phone number.
    pub async fn phone(&self) -> Result<Option<String>, ResourceError> {
        self.state.get("phone").await
    }

    /// Change the phone number locally.
    pub async fn set_phone(&self, phone: &str) -> Result<(), ResourceError> {
        self.state.set("phone", phone).await
    }

    /// Create or update the office. Returns `false` if nothing was dirty.
    #[instrument(skip(self))]
    pub async fn save(&self) -> Result<bool, ResourceError> {
        let session = self.state.session()?;
        let url = session.endpoint(&session.config().offices_path);
        self.state.save(&url).await
    }
}
