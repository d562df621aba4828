//! Rendering conditions and the fatal termination path.
//!
//! Every diagnostic the engine emits goes through the thread's
//! [`DiagnosticSink`]: fatal errors (unmatched conditions, invalid handler
//! verdicts, aborts without a resumption point) and the non-fatal warnings
//! for unregistering something that is not registered.

use crate::config::FatalAction;
use crate::error::Error;
use crate::tracing_compat::error;
use crate::types::Condition;
use core::fmt;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Renders a condition as `<file>:<line>: <name>:<message>`.
#[must_use]
pub fn render(condition: &Condition) -> String {
    condition.to_string()
}

/// Writes the rendered condition to stdout, without a trailing newline.
///
/// # Errors
///
/// Returns the underlying I/O error if stdout cannot be written.
pub fn print_condition(condition: &Condition) -> io::Result<()> {
    let mut out = io::stdout().lock();
    condition.write_to(&mut out)?;
    out.flush()
}

/// An in-memory diagnostic stream shared between the sink and its reader.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Rc<RefCell<String>>,
}

impl SharedBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything written so far.
    #[must_use]
    pub fn contents(&self) -> String {
        self.inner.borrow().clone()
    }

    /// Returns the written lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.inner.borrow().lines().map(str::to_string).collect()
    }

    /// Discards everything written so far.
    pub fn clear(&self) {
        self.inner.borrow_mut().clear();
    }

    fn push_line(&self, line: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.push_str(line);
        inner.push('\n');
    }
}

/// Where diagnostics are written.
#[derive(Debug, Clone, Default)]
pub enum DiagnosticSink {
    /// The process's standard error stream.
    #[default]
    Stderr,
    /// The process's standard output stream.
    Stdout,
    /// An in-memory buffer.
    Buffer(SharedBuffer),
}

impl DiagnosticSink {
    /// Creates a buffer sink and returns it with a handle for reading it.
    #[must_use]
    pub fn buffer() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::new();
        (Self::Buffer(buffer.clone()), buffer)
    }

    /// Writes one line of diagnostics.
    ///
    /// Write failures on the process streams are ignored; there is nowhere
    /// left to report them.
    pub fn emit(&self, line: impl fmt::Display) {
        match self {
            Self::Stderr => {
                let _ = writeln!(io::stderr().lock(), "{line}");
            }
            Self::Stdout => {
                let mut out = io::stdout().lock();
                let _ = writeln!(out, "{line}");
                let _ = out.flush();
            }
            Self::Buffer(buffer) => buffer.push_line(&line.to_string()),
        }
    }
}

/// Reports a non-fatal misuse and returns.
pub(crate) fn report_warning(sink: &DiagnosticSink, warning: impl fmt::Display) {
    sink.emit(format_args!("warning: {warning}"));
}

/// Renders a fatal error once and applies the fatal action.
pub(crate) fn terminate(sink: &DiagnosticSink, action: FatalAction, err: Error) -> ! {
    error!(error = %err, action = ?action, "fatal condition-system error");
    sink.emit(&err);
    match action {
        FatalAction::Exit(code) => std::process::exit(code),
        FatalAction::Panic => std::panic::resume_unwind(Box::new(err)),
    }
}
