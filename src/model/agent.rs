use crate::framework::{Resource, ResourceError, ResourceState};
use crate::lifecycle::Session;
use crate::model::Office;
use std::sync::Arc;
use tracing::instrument;

/// A listing agent, optionally attached to an [`Office`].
#[derive(Debug)]
pub struct Agent {
    state: ResourceState,
}

impl Resource for Agent {
    const KIND: &'static str = "Agent";
    const FIELD_NAMES: &'static [&'static str] = &["links", "name", "email", "phone", "office"];

    fn from_state(state: ResourceState) -> Self {
        Self { state }
    }

    fn state(&self) -> &ResourceState {
        &self.state
    }
}

impl Agent {
    /// A new transient agent.
    pub fn new(session: &Session) -> Arc<Self> {
        session.create::<Self>()
    }

    /// Agent's full name.
    pub async fn name(&self) -> Result<Option<String>, ResourceError> {
        self.state.get("name").await
    }

    /// Rename the agent locally; sent on the next save.
    pub async fn set_name(&self, name: &str) -> Result<(), ResourceError> {
        self.state.set("name", name).await
    }

    /// Contact email address.
    pub async fn email(&self) -> Result<Option<String>, ResourceError> {
        self.state.get("email").await
    }

    /// Change the email address locally.
    pub async fn set_email(&self, email: &str) -> Result<(), ResourceError> {
        self.state.set("email", email).await
    }

    /// Direct phone number.
    pub async fn phone(&self) -> Result<Option<String>, ResourceError> {
        self.state.get("phone").await
    }

    /// Change the phone number locally.
    pub async fn set_phone(&self, phone: &str) -> Result<(), ResourceError> {
        self.state.set("phone", phone).await
    }

    /// The office the agent works from, resolved through the identity map.
    pub async fn office(&self) -> Result<Option<Arc<Office>>, ResourceError> {
        self.state.get_resource("office").await
    }

    /// Attach the agent to `office`, or detach with `None`.
    pub async fn set_office(&self, office: Option<&Arc<Office>>) {
        self.state.set_resource("office", office).await
    }

    /// Create or update the agent. Returns `false` if nothing was dirty.
    #[instrument(skip(self))]
    pub async fn save(&self) -> Result<bool, ResourceError> {
        let session = self.state.session()?;
        let url = session.endpoint(&session.config().agents_path);
        self.state.save(&url).await
    }
}
