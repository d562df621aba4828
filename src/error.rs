//! Error types for the condition system.
//!
//! Most misuse is non-fatal and surfaces as [`ScopeError`] or
//! [`RestartError`] values (and a logged warning). The variants that describe
//! a failed signal resolution ([`Error::Unhandled`], [`Error::InvalidVerdict`],
//! [`Error::NoResumption`]) are fatal: the dispatcher renders them once to the
//! diagnostic sink and then applies the configured
//! [`FatalAction`](crate::config::FatalAction).

use crate::config::ConfigError;
use crate::restart::RestartError;
use crate::scope::ScopeError;
use crate::types::{Condition, FrameId};

/// The crate-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No handler on the current thread matched the condition name.
    #[error("Fatal condition: {condition}")]
    Unhandled {
        /// The condition nobody handled.
        condition: Condition,
    },
    /// A handler answered with a code outside the defined verdicts.
    #[error("Invalid handler option: {code}")]
    InvalidVerdict {
        /// The offending code.
        code: i32,
        /// The condition the handler was asked about.
        condition: Condition,
    },
    /// A handler aborted to a frame whose establishing call is not inside
    /// its protected region.
    #[error("handler frame {frame} aborted without a live resumption point ({condition})")]
    NoResumption {
        /// The target handler frame.
        frame: FrameId,
        /// The condition that was being resolved.
        condition: Condition,
    },
    /// Scope stack misuse.
    #[error(transparent)]
    Scope(#[from] ScopeError),
    /// Restart registry misuse.
    #[error(transparent)]
    Restart(#[from] RestartError),
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Returns `true` for the errors that terminate signal resolution.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Unhandled { .. } | Self::InvalidVerdict { .. } | Self::NoResumption { .. }
        )
    }

    /// Returns the condition a fatal error was raised for.
    #[must_use]
    pub const fn condition(&self) -> Option<&Condition> {
        match self {
            Self::Unhandled { condition }
            | Self::InvalidVerdict { condition, .. }
            | Self::NoResumption { condition, .. } => Some(condition),
            Self::Scope(_) | Self::Restart(_) | Self::Config(_) => None,
        }
    }
}

/// A specialized `Result` type for condition-system operations.
pub type Result<T> = std::result::Result<T, Error>;
