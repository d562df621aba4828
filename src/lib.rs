//! Conditio: a Lisp-style condition system for Rust.
//!
//! # Overview
//!
//! Code that detects a problem *signals* a named condition instead of
//! deciding on the spot how to recover. Code further up the call stack has
//! *established handlers* for condition names, and each handler decides, at
//! signal time, whether the signaling code resumes, whether control leaves
//! for the handler's establishment point, or whether an older handler should
//! decide instead.
//!
//! # Core Guarantees
//!
//! - **Newest first**: handlers are consulted most recent first, and only
//!   those whose name matches the condition exactly
//! - **Finalizers run once**: every finalizer runs exactly once, on normal
//!   exit, on explicit release, or when an abort unwinds past it
//! - **Reverse order**: finalizers passed by an abort run innermost first
//! - **Loud failure**: a condition nobody handles is rendered once to the
//!   diagnostic sink and the thread's [`FatalAction`] runs
//! - **Thread isolation**: each thread owns its own scope stack, restart
//!   registry and configuration
//!
//! # Module Structure
//!
//! - [`types`]: Conditions, locations, verdicts and identifiers
//! - [`scope`]: The handler/finalizer stack
//! - [`restart`]: The named restart registry
//! - [`dispatch`]: [`signal`] resolution and abort unwinding
//! - [`cx`]: Per-thread context and the scoped guards
//! - [`diagnostics`]: Rendering and the fatal termination path
//! - [`config`]: Fatal-action and sink configuration
//! - [`error`](mod@error): Error types
//! - [`tracing_compat`]: Optional tracing integration (requires `tracing-integration` feature)
//!
//! # Example
//!
//! ```
//! use conditio::{Condition, Exit, RestartResult, Verdict, handler_case, invoke_restart,
//!     register_restart, signal};
//!
//! let _use_zero = register_restart("use-zero", |_: &Condition| RestartResult::Succeed);
//!
//! // Recoverable: the handler picks a restart and the signal site resumes.
//! let exit = handler_case(
//!     "parse-error",
//!     |c: &Condition| invoke_restart(c, "use-zero").into_verdict_or_pass(),
//!     || {
//!         signal!("parse-error", "bad digit");
//!         0
//!     },
//! );
//! assert_eq!(exit, Exit::Completed(0));
//!
//! // Not recoverable: the handler aborts to its establishment point.
//! let exit = handler_case("parse-error", |_: &Condition| Verdict::Abort, || {
//!     signal!("parse-error", "truncated input");
//!     1
//! });
//! assert!(exit.is_aborted());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod config;
pub mod cx;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod restart;
pub mod scope;
pub mod tracing_compat;
pub mod types;

// ── Test-only modules ───────────────────────────────────────────────────
#[cfg(any(test, feature = "test-internals"))]
pub mod test_utils;

// Re-exports for convenient access to core types
pub use config::{ConditionConfig, ConfigError, ConfigLoader, FatalAction};
pub use cx::{
    ConditionCx, FinalizerGuard, HandlerGuard, RestartGuard, configure, establish_finalizer,
    establish_handler, handler_case, invoke_restart, register_restart, restart_count,
    scope_depth, unregister_restart,
};
pub use diagnostics::{DiagnosticSink, SharedBuffer, print_condition, render};
pub use dispatch::{Exit, WARNING, signal};
pub use error::{Error, Result};
pub use restart::{Restart, RestartError, RestartRegistry};
pub use scope::{Handler, ScopeError, ScopeStack};
pub use types::{
    Condition, FrameId, IntoVerdict, InvalidVerdict, Location, RestartId, RestartResult, Verdict,
};
