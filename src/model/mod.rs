//! Concrete resources of the listings API, each a thin typed facade over a
//! [`ResourceState`](crate::framework::ResourceState).

pub mod agent;
pub mod listing;
pub mod office;

pub use agent::*;
pub use listing::*;
pub use office::*;
