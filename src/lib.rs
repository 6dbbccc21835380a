//! # REST Entity
//!
//! > **Lazily hydrated, identity-mapped resources for a hypermedia REST API.**
//!
//! Each remote entity (a listing, an agent, an office) is represented by exactly one
//! in-memory object per session. Objects start as little more than a self link and
//! load themselves the first time a field is read. Writes are tracked per field, and
//! saving sends only what changed.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Composition over inheritance
//! Every resource embeds a [`ResourceState`](framework::ResourceState), the shared
//! hydration engine, and implements the small [`Resource`](framework::Resource) trait
//! to declare its kind and fields. Typed accessors on the concrete type are one-line
//! wrappers over the engine.
//!
//! ### One instance per URL
//! Nested payloads are never turned into throwaway copies. They are resolved through
//! the session's [`ResourceManager`](framework::ResourceManager), so `listing.agent()`
//! and a direct lookup of the same agent hand back the same object, and a change made
//! through one is visible through the other.
//!
//! ### Local changes win
//! A dirty field is the caller's truth until it is saved. Refreshes, nested payloads
//! and save responses update everything else around it.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! - **Role**: Field state, hydration, the save protocol, the identity map and the
//!   transport seam.
//! - **Key items**: [`ResourceState`](framework::ResourceState),
//!   [`ResourceManager`](framework::ResourceManager), [`Transport`](framework::Transport).
//!
//! ### 2. The Context ([`lifecycle`])
//! - **Role**: Wires credentials, transport, identity map and endpoint configuration
//!   into a [`Session`](lifecycle::Session), and installs logging.
//!
//! ### 3. The Resources ([`model`])
//! - **Role**: Concrete kinds built on the engine: [`Listing`](model::Listing),
//!   [`Agent`](model::Agent), [`Office`](model::Office).
//!
//! ## 🚀 Quick Start
//!
//! ### Running the Demo
//!
//! The demo binary runs against an in-memory [`MockTransport`](framework::mock::MockTransport).
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod framework;
pub mod lifecycle;
pub mod model;
