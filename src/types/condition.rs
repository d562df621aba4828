//! Condition values.
//!
//! A [`Condition`] describes one signaled event: a flat name used for handler
//! matching, a human-readable message, and the source location of the
//! `signal` call. Conditions are immutable once created.

use core::fmt;
use std::io::{self, Write};

/// Source location of a signal call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    file: String,
    line: u32,
}

impl Location {
    /// Creates a location from a file name and line number.
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Returns the caller's location, as reported by `#[track_caller]`.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let location = core::panic::Location::caller();
        Self::new(location.file(), location.line())
    }

    /// Returns the file name.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Returns the line number.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// An immutable description of one signaled event.
///
/// # Display Format
///
/// Conditions format as `<file>:<line>: <name>:<message>`.
///
/// ```
/// use conditio::{Condition, Location};
///
/// let cond = Condition::new("error", "disk full", Location::new("main.rs", 12));
/// assert_eq!(cond.to_string(), "main.rs:12: error:disk full");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    name: String,
    message: String,
    location: Location,
}

impl Condition {
    /// Creates a new condition.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            location,
        }
    }

    /// Returns the condition name handlers are matched against.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns where the condition was signaled.
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// Returns the file the condition was signaled from.
    #[must_use]
    pub fn file(&self) -> &str {
        self.location.file()
    }

    /// Returns the line the condition was signaled from.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.location.line()
    }

    /// Writes the rendered condition to `out`, without a trailing newline.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{self}")
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}:{}", self.location, self.name, self.message)
    }
}
