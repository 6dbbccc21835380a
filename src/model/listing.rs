use crate::framework::{Resource, ResourceError, ResourceState};
use crate::lifecycle::Session;
use crate::model::{Agent, Office};
use std::sync::Arc;
use tracing::instrument;

/// A property listing.
///
/// `agent` and `office` arrive as nested payloads and are resolved into the
/// session's canonical [`Agent`] and [`Office`] instances on first read.
#[derive(Debug)]
pub struct Listing {
    state: ResourceState,
}

impl Resource for Listing {
    const KIND: &'static str = "Listing";
    const FIELD_NAMES: &'static [&'static str] = &[
        "links",
        "listingNumber",
        "status",
        "listPrice",
        "remarks",
        "agent",
        "office",
    ];

    fn from_state(state: ResourceState) -> Self {
        Self { state }
    }

    fn state(&self) -> &ResourceState {
        &self.state
    }
}

impl Listing {
    /// A new transient listing; [`save`](Self::save) creates it.
    pub fn new(session: &Session) -> Arc<Self> {
        session.create::<Self>()
    }

    /// MLS number of the listing.
    pub async fn listing_number(&self) -> Result<Option<String>, ResourceError> {
        self.state.get("listingNumber").await
    }

    pub async fn set_listing_number(&self, number: &str) -> Result<(), ResourceError> {
        self.state.set("listingNumber", number).await
    }

    /// Market status, e.g. `active` or `pending`.
    pub async fn status(&self) -> Result<Option<String>, ResourceError> {
        self.state.get("status").await
    }

    pub async fn set_status(&self, status: &str) -> Result<(), ResourceError> {
        self.state.set("status", status).await
    }

    /// Asking price in whole currency units.
    pub async fn list_price(&self) -> Result<Option<u64>, ResourceError> {
        self.state.get("listPrice").await
    }

    pub async fn set_list_price(&self, price: u64) -> Result<(), ResourceError> {
        self.state.set("listPrice", price).await
    }

    /// Free-form public remarks.
    pub async fn remarks(&self) -> Result<Option<String>, ResourceError> {
        self.state.get("remarks").await
    }

    pub async fn set_remarks(&self, remarks: &str) -> Result<(), ResourceError> {
        self.state.set("remarks", remarks).await
    }

    /// The listing agent, resolved through the identity map.
    pub async fn agent(&self) -> Result<Option<Arc<Agent>>, ResourceError> {
        self.state.get_resource("agent").await
    }

    /// Assign the listing agent, or clear it with `None`.
    pub async fn set_agent(&self, agent: Option<&Arc<Agent>>) {
        self.state.set_resource("agent", agent).await
    }

    /// The listing office, resolved through the identity map.
    pub async fn office(&self) -> Result<Option<Arc<Office>>, ResourceError> {
        self.state.get_resource("office").await
    }

    pub async fn set_office(&self, office: Option<&Arc<Office>>) {
        self.state.set_resource("office", office).await
    }

    /// Create or update the listing. Returns `false` if nothing was dirty.
    #[instrument(skip(self))]
    pub async fn save(&self) -> Result<bool, ResourceError> {
        let session = self.state.session()?;
        let url = session.endpoint(&session.config().listings_path);
        self.state.save(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockTransport;
    use crate::framework::{Authentication, Method};
    use serde_json::{json, Value};

    fn links(href: &str) -> Value {
        json!([{ "rel": "self", "href": href }])
    }

    fn setup() -> (Arc<MockTransport>, Session) {
        let mock = Arc::new(MockTransport::new());
        let session = Session::new(Authentication::new("agent-portal", "pw"), mock.clone());
        (mock, session)
    }

    #[tokio::test]
    async fn test_listing_and_agent_share_office_instance() {
        let (mock, session) = setup();
        mock.expect_get("/listings/1").return_ok(json!({
            "links": links("/listings/1"),
            "status": "active",
            "listPrice": 425000,
            "agent": {
                "links": links("/agents/7"),
                "name": "Dana",
                "office": { "links": links("/offices/3"), "name": "Downtown" }
            },
            "office": { "links": links("/offices/3") }
        }));

        let listing = session.find::<Listing>("/listings/1").await.unwrap();
        assert_eq!(listing.list_price().await.unwrap(), Some(425000));

        let agent = listing.agent().await.unwrap().unwrap();
        assert_eq!(agent.name().await.unwrap().as_deref(), Some("Dana"));

        let via_agent = agent.office().await.unwrap().unwrap();
        let via_listing = listing.office().await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&via_agent, &via_listing));
        assert_eq!(via_listing.name().await.unwrap().as_deref(), Some("Downtown"));

        assert_eq!(listing.remarks().await.unwrap(), None);
        assert_eq!(mock.request_count(), 1);
        mock.verify();
    }

    #[tokio::test]
    async fn test_new_listing_posts_to_configured_endpoint() {
        let (mock, session) = setup();
        let endpoint = session.endpoint("listings");
        mock.expect_post(endpoint.clone()).return_ok(json!({
            "links": links("http://localhost:8080/api/listings/99"),
            "listingNumber": "MLS-99",
            "status": "pending"
        }));

        let listing = Listing::new(&session);
        listing.set_listing_number("MLS-99").await.unwrap();
        listing.set_list_price(310000).await.unwrap();
        assert!(listing.save().await.unwrap());

        let request = &mock.requests()[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, endpoint);
        assert_eq!(request.principal, "agent-portal");
        let query = request.query.as_ref().unwrap();
        assert_eq!(query.selected(), ["listingNumber", "listPrice"]);
        assert_eq!(query.value("listPrice"), Some(&json!(310000)));

        assert_eq!(listing.status().await.unwrap().as_deref(), Some("pending"));
        assert_eq!(
            listing.url().as_deref(),
            Some("http://localhost:8080/api/listings/99")
        );
        assert!(!listing.save().await.unwrap());
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_assigning_agent_submits_its_link() {
        let (mock, session) = setup();
        mock.expect_put("/listings/1").return_ok(Value::Null);

        let listing = session.find::<Listing>("/listings/1").await.unwrap();
        let agent = session.find::<Agent>("/agents/7").await.unwrap();
        listing.set_agent(Some(&agent)).await;
        listing.save().await.unwrap();

        let query = mock.requests()[0].query.clone().unwrap();
        assert_eq!(query.selected(), ["agent"]);
        assert_eq!(
            query.value("agent"),
            Some(&json!({ "links": [{ "rel": "self", "href": "/agents/7" }] }))
        );

        let assigned = listing.agent().await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&assigned, &agent));
    }

    #[tokio::test]
    async fn test_unsaved_agent_edit_survives_listing_refresh() {
        let (mock, session) = setup();
        let payload = json!({
            "links": links("/listings/1"),
            "agent": { "links": links("/agents/7"), "name": "Dana" }
        });
        mock.expect_get("/listings/1").return_ok(payload.clone());
        mock.expect_get("/listings/1").return_ok(payload);

        let listing = session.find::<Listing>("/listings/1").await.unwrap();
        let agent = listing.agent().await.unwrap().unwrap();
        agent.set_name("Edited").await.unwrap();
        drop(agent);

        listing.state().refresh().await.unwrap();
        let agent = listing.agent().await.unwrap().unwrap();
        assert_eq!(agent.name().await.unwrap().as_deref(), Some("Edited"));
        assert_eq!(agent.state().dirty_fields().await, ["name"]);
    }

    #[tokio::test]
    async fn test_reassigning_same_agent_before_reading_is_noop() {
        let (mock, session) = setup();
        mock.expect_get("/listings/1").return_ok(json!({
            "links": links("/listings/1"),
            "status": "active",
            "agent": { "links": links("/agents/7") }
        }));

        let listing = session.find::<Listing>("/listings/1").await.unwrap();
        listing.status().await.unwrap();
        let agent = session.find::<Agent>("/agents/7").await.unwrap();
        listing.set_agent(Some(&agent)).await;

        assert!(!listing.save().await.unwrap());
        assert_eq!(mock.request_count(), 1);
    }
}
