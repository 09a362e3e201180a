//! Database monitoring agent.
//!
//! Tracks the set of database instances reported by the host, renders a
//! collector configuration for all of them and keeps exactly one collector
//! process running against it. Bursts of changes are debounced into a single
//! restart.

mod agent;
mod config;
pub(crate) mod constants;
mod errors;
mod feed;
mod metrics;
mod registry;
mod render;
mod secrets;
mod supervisor;
pub mod utils;

pub use agent::*;
pub use config::*;
pub use constants::MONITORING_WORKER_NAME;
pub use errors::*;
pub use feed::*;
pub use metrics::*;
pub use registry::*;
pub use render::*;
pub use secrets::*;
pub use supervisor::*;
pub use utils::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
