//! # REST Entity Demo
//!
//! Walks a listing through the whole entity lifecycle against a seeded
//! [`MockTransport`]:
//!
//! 1. Resolve a listing by URL and let the first read fetch it.
//! 2. Follow the nested agent without another request.
//! 3. Change a field and save it back with a PUT.
//! 4. Create a new listing with a POST.

use rest_entity::framework::mock::MockTransport;
use rest_entity::framework::{Authentication, Resource, ResourceError};
use rest_entity::lifecycle::{setup_tracing, Session, SessionConfig};
use rest_entity::model::Listing;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, Instrument};

fn seed(mock: &MockTransport, config: &SessionConfig) {
    let listing_url = config.endpoint("listings/42");
    let agent_url = config.endpoint("agents/7");

    mock.expect_get(listing_url.clone()).return_ok(json!({
        "links": [{ "rel": "self", "href": listing_url }],
        "listingNumber": "MLS-42",
        "status": "active",
        "listPrice": 525000,
        "agent": {
            "links": [{ "rel": "self", "href": agent_url }],
            "name": "Dana Reyes",
            "email": "dana@example.com"
        }
    }));
    mock.expect_put(listing_url.clone()).return_ok(json!({
        "links": [{ "rel": "self", "href": listing_url }],
        "status": "pending"
    }));
    mock.expect_post(config.endpoint(&config.listings_path)).return_ok(json!({
        "links": [{ "rel": "self", "href": config.endpoint("listings/43") }],
        "listingNumber": "MLS-43",
        "status": "coming-soon"
    }));
}

#[tokio::main]
async fn main() -> Result<(), ResourceError> {
    setup_tracing();

    let config = SessionConfig::from_env();
    let mock = Arc::new(MockTransport::new());
    seed(&mock, &config);

    let session = Session::with_config(
        Authentication::new("demo", "demo-secret"),
        mock.clone(),
        config,
    );
    info!(base_url = %session.config().base_url, "Starting demo session");

    let span = tracing::info_span!("existing_listing");
    let listing = async {
        let listing = session
            .find::<Listing>(&session.endpoint("listings/42"))
            .await?;
        info!(
            number = ?listing.listing_number().await?,
            price = ?listing.list_price().await?,
            "Loaded listing"
        );

        if let Some(agent) = listing.agent().await? {
            info!(name = ?agent.name().await?, email = ?agent.email().await?, "Listing agent");
        }

        listing.set_status("pending").await?;
        listing.save().await?;
        info!(status = ?listing.status().await?, "Listing updated");
        Ok::<_, ResourceError>(listing)
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("new_listing");
    async {
        let draft = Listing::new(&session);
        draft.set_listing_number("MLS-43").await?;
        draft.set_list_price(389000).await?;
        draft.save().await?;
        info!(url = ?draft.url(), status = ?draft.status().await?, "Listing created");
        Ok::<_, ResourceError>(())
    }
    .instrument(span)
    .await?;

    info!(
        requests = mock.request_count(),
        tracked = session.manager().len(),
        url = ?listing.url(),
        "Demo completed"
    );
    Ok(())
}
