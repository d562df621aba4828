//! Per-thread condition context and scoped guards.
//!
//! Each thread owns one [`ConditionCx`]: its scope stack, its restart
//! registry and its configuration. The context is created on first use and
//! torn down with the thread. Nothing in it is shared across threads, which is
//! why no operation here takes a lock.
//!
//! User callbacks (handlers, finalizers, restarts) never run while the
//! context is borrowed. Frames and callbacks are detached or cloned under the
//! borrow and invoked after it ends, so a callback is free to establish
//! handlers, register restarts, or signal.
//!
//! # Guards
//!
//! ```
//! use conditio::{Condition, Exit, Verdict, establish_finalizer, establish_handler, signal};
//!
//! let guard = establish_handler("parse-error", |_: &Condition| Verdict::Abort);
//! let exit = guard.protect(|| {
//!     let _cleanup = establish_finalizer(|| println!("cleanup"));
//!     signal!("parse-error", "unexpected token");
//!     42 // never reached: the handler aborts
//! });
//! assert!(matches!(exit, Exit::Aborted(cond) if cond.name() == "parse-error"));
//! ```

mod guard;

pub use guard::{
    FinalizerGuard, HandlerGuard, RestartGuard, establish_finalizer, establish_handler,
    handler_case, invoke_restart, register_restart, unregister_restart,
};

use crate::config::ConditionConfig;
use crate::diagnostics::{self, DiagnosticSink};
use crate::restart::{Restart, RestartError, RestartRegistry};
use crate::scope::{Frame, Handler, ScopeError, ScopeStack};
use crate::types::{FrameId, RestartId};
use std::cell::RefCell;
use std::rc::Rc;

/// The condition-system state owned by one thread.
#[derive(Debug, Default)]
pub struct ConditionCx {
    scopes: ScopeStack,
    restarts: RestartRegistry,
    config: ConditionConfig,
}

impl ConditionCx {
    /// Returns the thread's scope stack.
    #[must_use]
    pub const fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    /// Returns the thread's restart registry.
    #[must_use]
    pub const fn restarts(&self) -> &RestartRegistry {
        &self.restarts
    }

    /// Returns the thread's configuration.
    #[must_use]
    pub const fn config(&self) -> &ConditionConfig {
        &self.config
    }
}

thread_local! {
    static CX: RefCell<ConditionCx> = RefCell::new(ConditionCx::default());
}

/// Runs `f` with read access to the current thread's context.
///
/// `f` must not signal or touch guards; use it for inspection.
pub fn with_cx<R>(f: impl FnOnce(&ConditionCx) -> R) -> R {
    CX.with(|cx| f(&cx.borrow()))
}

fn with_cx_mut<R>(f: impl FnOnce(&mut ConditionCx) -> R) -> R {
    CX.with(|cx| f(&mut cx.borrow_mut()))
}

/// Like [`with_cx_mut`], but a no-op once the thread-local has been torn down.
fn try_with_cx_mut<R>(f: impl FnOnce(&mut ConditionCx) -> R) -> Option<R> {
    CX.try_with(|cx| f(&mut cx.borrow_mut())).ok()
}

/// Installs `config` for the current thread.
pub fn configure(config: ConditionConfig) {
    with_cx_mut(|cx| cx.config = config);
}

/// Returns a copy of the current thread's configuration.
#[must_use]
pub fn config() -> ConditionConfig {
    with_cx(|cx| cx.config.clone())
}

/// Returns the number of frames on the current thread's scope stack.
#[must_use]
pub fn scope_depth() -> usize {
    with_cx(|cx| cx.scopes.len())
}

/// Returns the number of restarts registered on the current thread.
#[must_use]
pub fn restart_count() -> usize {
    with_cx(|cx| cx.restarts.len())
}

pub(crate) fn sink() -> DiagnosticSink {
    with_cx(|cx| cx.config.sink().clone())
}

pub(crate) fn push_handler(name: String, handler: Rc<dyn Handler>) -> FrameId {
    with_cx_mut(|cx| cx.scopes.push_handler_rc(name, handler))
}

pub(crate) fn push_finalizer(callback: Box<dyn FnOnce()>) -> FrameId {
    with_cx_mut(|cx| cx.scopes.push_finalizer_boxed(callback))
}

/// Removes a frame and releases it after the borrow ends.
///
/// Absent frames are reported as warnings to the diagnostic sink.
pub(crate) fn pop_frame(id: FrameId) -> Result<(), ScopeError> {
    match with_cx_mut(|cx| cx.scopes.remove(id)) {
        Ok(frame) => {
            frame.release();
            Ok(())
        }
        Err(err) => {
            diagnostics::report_warning(&sink(), &err);
            Err(err)
        }
    }
}

/// Removes a frame if it is still on the stack. Returns `false` if an unwind
/// (or an explicit pop) already consumed it.
pub(crate) fn release_frame(id: FrameId) -> bool {
    let frame = try_with_cx_mut(|cx| {
        if cx.scopes.contains(id) {
            cx.scopes.remove(id).ok()
        } else {
            None
        }
    })
    .flatten();
    frame.map(Frame::release).is_some()
}

pub(crate) fn pop_head() -> Option<Frame> {
    with_cx_mut(|cx| cx.scopes.pop_head())
}

pub(crate) fn contains_frame(id: FrameId) -> bool {
    with_cx(|cx| cx.scopes.contains(id))
}

pub(crate) fn find_handler(name: &str, below: FrameId) -> Option<(FrameId, Rc<dyn Handler>)> {
    with_cx(|cx| cx.scopes.find_handler(name, Some(below)))
}

pub(crate) fn set_armed(id: FrameId, armed: bool) -> bool {
    try_with_cx_mut(|cx| cx.scopes.set_armed(id, armed)).unwrap_or(false)
}

pub(crate) fn is_armed(id: FrameId) -> bool {
    with_cx(|cx| cx.scopes.is_armed(id))
}

pub(crate) fn register_restart_entry(name: String, restart: impl Restart) -> RestartId {
    with_cx_mut(|cx| cx.restarts.register(name, restart))
}

pub(crate) fn unregister_restart_id(id: RestartId) -> Result<(), RestartError> {
    let result = with_cx_mut(|cx| cx.restarts.unregister(id));
    if let Err(err) = &result {
        diagnostics::report_warning(&sink(), err);
    }
    result
}

pub(crate) fn release_restart(id: RestartId) {
    let _ = try_with_cx_mut(|cx| {
        if cx.restarts.contains(id) {
            let _ = cx.restarts.unregister(id);
        }
    });
}

pub(crate) fn find_restart(name: &str) -> Option<Rc<dyn Restart>> {
    with_cx(|cx| cx.restarts.find(name))
}
