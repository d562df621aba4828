//! Scoped acquisition of handler frames, finalizer frames and restarts.
//!
//! Every guard removes what it registered when it is dropped, so frames never
//! outlive the code that pushed them. A guard whose frame was already
//! consumed by an unwind does nothing on drop.

use super::{
    find_restart, pop_frame, push_finalizer, push_handler, register_restart_entry,
    release_frame, release_restart, set_armed, sink, unregister_restart_id,
};
use crate::diagnostics;
use crate::dispatch::{AbortUnwind, Exit};
use crate::restart::{Restart, RestartError};
use crate::scope::{Handler, ScopeError};
use crate::tracing_compat::{debug, warn};
use crate::types::{Condition, FrameId, RestartId, RestartResult};
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// Guard for an established handler frame.
///
/// Created by [`establish_handler`]. The frame stays on the stack until the
/// guard is dropped (or consumed by [`protect`](Self::protect)). Guards are
/// tied to the thread that created them.
#[must_use = "dropping the guard removes the handler immediately"]
#[derive(Debug)]
pub struct HandlerGuard {
    id: FrameId,
    _not_send: PhantomData<Rc<()>>,
}

impl HandlerGuard {
    /// Returns the handler frame's identifier.
    #[must_use]
    pub const fn id(&self) -> FrameId {
        self.id
    }

    /// Runs `body` as the handler's protected region.
    ///
    /// Returns [`Exit::Completed`] when `body` falls through normally, or
    /// [`Exit::Aborted`] with the condition when this handler answered
    /// [`Verdict::Abort`](crate::Verdict::Abort): every finalizer registered
    /// inside the region has run by then, and execution continues here as if
    /// `body` had returned.
    ///
    /// The handler frame is removed in both cases; establish a new handler to
    /// catch another abort. Unwinds aimed at other handlers, and ordinary
    /// panics, pass through unchanged.
    ///
    /// If the frame is already gone (an earlier abort unwound past it), a
    /// [`ScopeError::NotFound`] warning is reported to the diagnostic sink
    /// and `body` still runs, unprotected; the result is then always
    /// [`Exit::Completed`].
    pub fn protect<T>(self, body: impl FnOnce() -> T) -> Exit<T> {
        let id = self.id;
        if !set_armed(id, true) {
            let err = ScopeError::NotFound { frame: id };
            warn!(frame = %id, "protecting a handler frame that is no longer on the stack");
            diagnostics::report_warning(&sink(), &err);
        }
        let result = panic::catch_unwind(AssertUnwindSafe(body));
        set_armed(id, false);
        match result {
            Ok(value) => Exit::Completed(value),
            Err(payload) => match payload.downcast::<AbortUnwind>() {
                Ok(abort) if abort.target == id => {
                    debug!(frame = %id, condition = %abort.condition.name(), "abort landed");
                    Exit::Aborted(abort.condition)
                }
                Ok(abort) => panic::resume_unwind(abort),
                Err(other) => panic::resume_unwind(other),
            },
        }
    }

    /// Removes the handler frame now.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::NotFound`] (and reports a warning) if the frame
    /// is no longer on the stack.
    pub fn unregister(self) -> Result<(), ScopeError> {
        let id = self.id;
        std::mem::forget(self);
        pop_frame(id)
    }
}

impl Drop for HandlerGuard {
    fn drop(&mut self) {
        release_frame(self.id);
    }
}

/// Pushes a handler for conditions named `name` onto the current thread's
/// scope stack.
///
/// ```
/// use conditio::{Condition, Verdict, establish_handler, signal};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(Cell::new(false));
/// let flag = Rc::clone(&seen);
/// let _guard = establish_handler("warning", move |_: &Condition| {
///     flag.set(true);
///     Verdict::Handled
/// });
/// signal!("warning", "low disk space");
/// assert!(seen.get());
/// ```
pub fn establish_handler(name: impl Into<String>, handler: impl Handler) -> HandlerGuard {
    let id = push_handler(name.into(), Rc::new(handler));
    HandlerGuard {
        id,
        _not_send: PhantomData,
    }
}

/// Establishes a handler and runs `body` as its protected region.
///
/// Shorthand for `establish_handler(name, handler).protect(body)`.
pub fn handler_case<T>(
    name: impl Into<String>,
    handler: impl Handler,
    body: impl FnOnce() -> T,
) -> Exit<T> {
    establish_handler(name, handler).protect(body)
}

/// Guard for an established finalizer frame.
///
/// The callback runs exactly once: on [`release`](Self::release), on drop, or
/// when an abort unwinds past the frame, whichever comes first.
#[must_use = "dropping the guard runs the finalizer immediately"]
#[derive(Debug)]
pub struct FinalizerGuard {
    id: FrameId,
    _not_send: PhantomData<Rc<()>>,
}

impl FinalizerGuard {
    /// Returns the finalizer frame's identifier.
    #[must_use]
    pub const fn id(&self) -> FrameId {
        self.id
    }

    /// Returns `true` while the callback has not run yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        super::contains_frame(self.id)
    }

    /// Runs the finalizer now (unless an unwind already ran it).
    pub fn release(self) {
        drop(self);
    }

    /// Removes the finalizer frame now, running its callback.
    ///
    /// Unlike [`release`](Self::release), a frame that is no longer on the
    /// stack is treated as misuse.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::NotFound`] (and reports a warning) if an unwind
    /// or an earlier removal already consumed the frame.
    pub fn unregister(self) -> Result<(), ScopeError> {
        let id = self.id;
        std::mem::forget(self);
        pop_frame(id)
    }
}

impl Drop for FinalizerGuard {
    fn drop(&mut self) {
        release_frame(self.id);
    }
}

/// Pushes a finalizer onto the current thread's scope stack.
pub fn establish_finalizer(callback: impl FnOnce() + 'static) -> FinalizerGuard {
    let id = push_finalizer(Box::new(callback));
    FinalizerGuard {
        id,
        _not_send: PhantomData,
    }
}

/// Guard for a registered restart. Dropping it unregisters the restart.
#[must_use = "dropping the guard unregisters the restart immediately"]
#[derive(Debug)]
pub struct RestartGuard {
    id: RestartId,
    _not_send: PhantomData<Rc<()>>,
}

impl RestartGuard {
    /// Returns the restart's identifier.
    #[must_use]
    pub const fn id(&self) -> RestartId {
        self.id
    }
}

impl Drop for RestartGuard {
    fn drop(&mut self) {
        release_restart(self.id);
    }
}

/// Registers `restart` under `name` on the current thread.
pub fn register_restart(name: impl Into<String>, restart: impl Restart) -> RestartGuard {
    let id = register_restart_entry(name.into(), restart);
    RestartGuard {
        id,
        _not_send: PhantomData,
    }
}

/// Unregisters a restart without invoking it.
///
/// # Errors
///
/// Returns [`RestartError::NotFound`] (and reports a warning) if the restart
/// is no longer registered.
pub fn unregister_restart(guard: RestartGuard) -> Result<(), RestartError> {
    let id = guard.id;
    std::mem::forget(guard);
    unregister_restart_id(id)
}

/// Invokes the most recent restart named `name` on the current thread.
///
/// Returns the restart's own result, or [`RestartResult::NotFound`] without
/// side effects when no such restart is registered.
pub fn invoke_restart(condition: &Condition, name: &str) -> RestartResult {
    find_restart(name).map_or(RestartResult::NotFound, |restart| restart.invoke(condition))
}
