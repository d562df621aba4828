//! Signal resolution.
//!
//! [`signal`] is the one entry point application code uses to raise a
//! condition. Resolution walks the current thread's scope stack from the
//! head, offering the condition to every handler frame whose name matches,
//! most recent first:
//!
//! ```text
//! signal(name) ─► handler ─► Handled ─► release condition, return normally
//!                    │
//!                    ├────► Pass ────► next older handler with the same name
//!                    │
//!                    └────► Abort ───► run finalizers head→target, drop frames,
//!                                      land in the target's `protect` call
//!
//! no (more) matching handlers ─► render diagnostic, fatal action
//! ```
//!
//! # Non-local exits
//!
//! An abort is carried by Rust unwinding. Once the unwinder has run every
//! intervening finalizer and removed the frames down to and including the
//! target, the dispatcher resumes unwinding with a private payload naming the
//! target frame. Only the [`HandlerGuard::protect`](crate::HandlerGuard::protect)
//! call that armed that frame catches it. Code between the signal and the
//! target must not swallow panics it does not recognise.

mod signal;
mod unwind;

pub use signal::signal;
pub(crate) use unwind::unwind_to;

use crate::types::{Condition, FrameId};

/// How a handler's protected region was left.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exit<T> {
    /// The region fell through and produced a value.
    Completed(T),
    /// The handler aborted to its establishment point with this condition.
    Aborted(Condition),
}

impl<T> Exit<T> {
    /// Returns `true` if the region was aborted.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }

    /// Returns the value of a completed region.
    #[must_use]
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Aborted(_) => None,
        }
    }

    /// Returns the condition of an aborted region.
    #[must_use]
    pub fn aborted(self) -> Option<Condition> {
        match self {
            Self::Completed(_) => None,
            Self::Aborted(condition) => Some(condition),
        }
    }

    /// Converts into a `Result`, with the abort condition as the error.
    ///
    /// # Errors
    ///
    /// Returns the condition if the region was aborted.
    pub fn into_result(self) -> Result<T, Condition> {
        match self {
            Self::Completed(value) => Ok(value),
            Self::Aborted(condition) => Err(condition),
        }
    }

    /// Maps the value of a completed region.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Exit<U> {
        match self {
            Self::Completed(value) => Exit::Completed(f(value)),
            Self::Aborted(condition) => Exit::Aborted(condition),
        }
    }
}

/// Unwind payload transferring control to a handler's establishment point.
#[derive(Debug)]
pub(crate) struct AbortUnwind {
    pub(crate) target: FrameId,
    pub(crate) condition: Condition,
}

/// Signals a condition named `$name`, recording the macro call site.
///
/// The message is either an expression convertible into a `String` or a
/// format string followed by its arguments. A lone string literal is taken
/// as-is, braces included; inline captures such as `"{x}"` are only expanded
/// when at least one argument follows.
///
/// ```
/// use conditio::{Condition, Verdict, establish_handler, signal};
///
/// let _guard = establish_handler("io", |c: &Condition| {
///     assert!(c.message() == "read 3 of 8 bytes" || c.message() == "50% {done}");
///     Verdict::Handled
/// });
/// signal!("io", "read {} of {} bytes", 3, 8);
/// signal!("io", "50% {done}");
/// ```
#[macro_export]
macro_rules! signal {
    ($name:expr, $message:literal $(,)?) => {
        $crate::dispatch::signal(
            $name,
            $message,
            $crate::types::Location::new(::std::file!(), ::std::line!()),
        )
    };
    ($name:expr, $fmt:literal, $($arg:tt)+) => {
        $crate::dispatch::signal(
            $name,
            ::std::format!($fmt, $($arg)+),
            $crate::types::Location::new(::std::file!(), ::std::line!()),
        )
    };
    ($name:expr, $message:expr $(,)?) => {
        $crate::dispatch::signal(
            $name,
            $message,
            $crate::types::Location::new(::std::file!(), ::std::line!()),
        )
    };
}

/// Signals a condition named `"warning"`, recording the macro call site.
#[macro_export]
macro_rules! signal_warning {
    ($($message:tt)+) => {
        $crate::signal!($crate::dispatch::WARNING, $($message)+)
    };
}

/// Name of the condition raised by [`signal_warning!`].
pub const WARNING: &str = "warning";
