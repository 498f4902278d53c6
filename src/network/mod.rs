//! Network layer - HTTP request execution
//!
//! The Network actor receives send commands and reports each outcome back,
//! tagged with the id it was sent under.

pub mod actor;
pub mod client;

pub use actor::NetworkActor;
pub use client::{create_client, execute};
