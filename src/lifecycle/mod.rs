//! # Session Lifecycle
//!
//! Resources never reach for global state. Everything they need (credentials,
//! transport, identity map, endpoint configuration) is wired once into a
//! [`Session`] and handed to each resource at construction.
//!
//! ## The Session Pattern
//!
//! ```rust,ignore
//! let config = SessionConfig::from_env();
//! let session = Session::with_config(auth, transport, config);
//!
//! // Every resource built from this session shares its identity map.
//! let listing = session.find::<Listing>(&session.endpoint("listings/42")).await?;
//! let agent = listing.agent().await?;          // resolved through the manager
//! ```
//!
//! The session owns its registry, and the registry owns every resource it has
//! resolved. Resources only hold a weak handle back, so dropping the last
//! `Session` frees all of them at once.
//!
//! ## Observability
//!
//! [`setup_tracing`] installs the `tracing` subscriber; see the [`tracing`](self::tracing)
//! module for what gets logged.

pub mod config;
pub mod session;
pub mod tracing;

pub use config::*;
pub use session::*;
pub use self::tracing::setup_tracing;
