//! Core value types for the condition system.
//!
//! - [`condition`]: the signaled event value and its source location
//! - [`id`]: identifiers for scope frames and restarts
//! - [`verdict`]: handler verdicts and restart results

pub mod condition;
pub mod id;
pub mod verdict;

pub use condition::{Condition, Location};
pub use id::{FrameId, RestartId};
pub use verdict::{IntoVerdict, InvalidVerdict, RestartResult, Verdict};
