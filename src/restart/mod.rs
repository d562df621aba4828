//! Restarts: named recovery actions invoked explicitly by handlers.

pub mod registry;

pub use registry::{Restart, RestartEntry, RestartError, RestartRegistry};
