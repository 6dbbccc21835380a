//! # Observability & Tracing
//!
//! The entity layer logs through `tracing` with structured fields. This module
//! installs the subscriber for binaries that use it.
//!
//! ## Configuration
//!
//! Verbosity is controlled by `RUST_LOG`. The output uses the compact format
//! without module targets; every event already carries the resource `kind`.
//!
//! ```bash
//! # Fetches, saves and registrations
//! RUST_LOG=info cargo run
//!
//! # Every field access, hydration and dirty mark
//! RUST_LOG=debug cargo run
//!
//! # Only the identity map
//! RUST_LOG=rest_entity::framework::manager=debug cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **Fetches**: `Fetching` with the URL, then `Hydrated` with how many fields
//!   were applied and how many declared fields came back absent.
//! - **Saves**: a `save` span per call, `Saving` with method, URL and dirty
//!   field count, and `Created` when a POST hands back a self link.
//! - **Identity map**: `Registered`, `Reused` and `Promoting` per URL.
//! - **Warnings**: nested payloads without a self link, and URLs claimed by two
//!   instances.
//!
//! ## Example Output
//!
//! ```text
//! INFO Fetching kind="Listing" url="http://localhost:8080/api/listings/42"
//! INFO Registered kind="Agent" url="http://localhost:8080/api/agents/7"
//! INFO save: Saving kind="Listing" method=PUT url=http://localhost:8080/api/listings/42 fields=1
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
