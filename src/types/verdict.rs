//! Handler verdicts and restart results.
//!
//! A handler answers a signaled condition with a [`Verdict`]. Handlers written
//! against a numeric protocol may instead return a raw `i32` code; codes are
//! validated when the dispatcher receives them, and an unknown code is a fatal
//! programmer error.

use core::fmt;

/// A handler's decision about a signaled condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Unwind to the point where this handler was established.
    Abort,
    /// The condition is dealt with; `signal` returns normally.
    Handled,
    /// Decline; the search continues with the next older matching handler.
    Pass,
}

impl Verdict {
    /// Raw code for [`Verdict::Abort`].
    pub const ABORT_CODE: i32 = 0;
    /// Raw code for [`Verdict::Handled`].
    pub const HANDLED_CODE: i32 = 1;
    /// Raw code for [`Verdict::Pass`].
    pub const PASS_CODE: i32 = 2;

    /// Decodes a raw verdict code.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidVerdict`] for any code other than the three defined.
    pub const fn from_code(code: i32) -> Result<Self, InvalidVerdict> {
        match code {
            Self::ABORT_CODE => Ok(Self::Abort),
            Self::HANDLED_CODE => Ok(Self::Handled),
            Self::PASS_CODE => Ok(Self::Pass),
            other => Err(InvalidVerdict { code: other }),
        }
    }

    /// Returns the raw code for this verdict.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Abort => Self::ABORT_CODE,
            Self::Handled => Self::HANDLED_CODE,
            Self::Pass => Self::PASS_CODE,
        }
    }

    /// Returns the verdict name as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Abort => "abort",
            Self::Handled => "handled",
            Self::Pass => "pass",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i32> for Verdict {
    type Error = InvalidVerdict;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

/// A handler returned a code outside the defined verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid handler verdict: {code}")]
pub struct InvalidVerdict {
    /// The offending code.
    pub code: i32,
}

/// Conversion from a handler's return value into a [`Verdict`].
///
/// Implemented for [`Verdict`] itself (always valid) and for raw `i32` codes
/// (validated).
pub trait IntoVerdict {
    /// Converts `self` into a verdict.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidVerdict`] when the value encodes no verdict.
    fn into_verdict(self) -> Result<Verdict, InvalidVerdict>;
}

impl IntoVerdict for Verdict {
    #[inline]
    fn into_verdict(self) -> Result<Verdict, InvalidVerdict> {
        Ok(self)
    }
}

impl IntoVerdict for i32 {
    #[inline]
    fn into_verdict(self) -> Result<Verdict, InvalidVerdict> {
        Verdict::from_code(self)
    }
}

/// Result of invoking a restart by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestartResult {
    /// The restart did what was needed.
    Succeed,
    /// The restart was unable to perform its action.
    Fail,
    /// No restart with the requested name is registered.
    NotFound,
}

impl RestartResult {
    /// Returns `true` for [`RestartResult::Succeed`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Succeed)
    }

    /// Maps a restart result onto a handler verdict: success means the
    /// condition is handled, anything else passes it on.
    #[must_use]
    pub const fn into_verdict_or_pass(self) -> Verdict {
        match self {
            Self::Succeed => Verdict::Handled,
            Self::Fail | Self::NotFound => Verdict::Pass,
        }
    }
}

impl fmt::Display for RestartResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeed => write!(f, "succeed"),
            Self::Fail => write!(f, "fail"),
            Self::NotFound => write!(f, "not found"),
        }
    }
}
