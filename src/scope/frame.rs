//! Scope frames.
//!
//! A scope stack interleaves two kinds of frames in registration order:
//! handler frames, consulted by name when a condition is signaled, and
//! finalizer frames, whose callback runs exactly once when the frame is
//! removed.

use crate::types::{Condition, FrameId, IntoVerdict, InvalidVerdict, Verdict};
use core::fmt;
use std::rc::Rc;

/// A condition handler.
///
/// Any `Fn(&Condition) -> R` closure where `R` is a [`Verdict`] or a raw
/// `i32` verdict code is a handler. State the handler needs (the payload) is
/// captured by the closure.
pub trait Handler: 'static {
    /// Decides what to do about `condition`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidVerdict`] when the handler answered with a code that
    /// encodes no verdict.
    fn handle(&self, condition: &Condition) -> Result<Verdict, InvalidVerdict>;
}

impl<F, R> Handler for F
where
    F: Fn(&Condition) -> R + 'static,
    R: IntoVerdict,
{
    fn handle(&self, condition: &Condition) -> Result<Verdict, InvalidVerdict> {
        self(condition).into_verdict()
    }
}

/// The kind of a [`Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// A [`HandlerFrame`].
    Handler,
    /// A [`FinalizerFrame`].
    Finalizer,
}

/// A registered handler.
pub struct HandlerFrame {
    id: FrameId,
    name: String,
    handler: Rc<dyn Handler>,
    armed: bool,
}

impl HandlerFrame {
    pub(crate) fn new(id: FrameId, name: String, handler: Rc<dyn Handler>) -> Self {
        Self {
            id,
            name,
            handler,
            armed: false,
        }
    }

    /// Returns the frame's identifier.
    #[must_use]
    pub const fn id(&self) -> FrameId {
        self.id
    }

    /// Returns the condition name this handler matches.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` while the establishing call is inside its protected
    /// region, i.e. an abort to this frame has somewhere to land.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    pub(crate) fn set_armed(&mut self, armed: bool) {
        self.armed = armed;
    }

    /// Returns a shared reference to the handler callback.
    #[must_use]
    pub fn handler(&self) -> Rc<dyn Handler> {
        Rc::clone(&self.handler)
    }
}

impl fmt::Debug for HandlerFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFrame")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("armed", &self.armed)
            .finish_non_exhaustive()
    }
}

/// A registered cleanup callback.
pub struct FinalizerFrame {
    id: FrameId,
    callback: Box<dyn FnOnce()>,
}

impl FinalizerFrame {
    pub(crate) fn new(id: FrameId, callback: Box<dyn FnOnce()>) -> Self {
        Self { id, callback }
    }

    /// Returns the frame's identifier.
    #[must_use]
    pub const fn id(&self) -> FrameId {
        self.id
    }

    /// Runs the callback, consuming the frame.
    pub fn run(self) {
        (self.callback)();
    }
}

impl fmt::Debug for FinalizerFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinalizerFrame")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// One entry of a scope stack.
#[derive(Debug)]
pub enum Frame {
    /// A handler frame.
    Handler(HandlerFrame),
    /// A finalizer frame.
    Finalizer(FinalizerFrame),
}

impl Frame {
    /// Returns the frame's identifier.
    #[must_use]
    pub const fn id(&self) -> FrameId {
        match self {
            Self::Handler(h) => h.id(),
            Self::Finalizer(f) => f.id(),
        }
    }

    /// Returns the frame's kind.
    #[must_use]
    pub const fn kind(&self) -> FrameKind {
        match self {
            Self::Handler(_) => FrameKind::Handler,
            Self::Finalizer(_) => FrameKind::Finalizer,
        }
    }

    /// Releases the frame: a finalizer frame runs its callback, a handler
    /// frame is dropped without invoking anything.
    pub fn release(self) {
        match self {
            Self::Handler(_) => {}
            Self::Finalizer(f) => f.run(),
        }
    }

    pub(crate) fn as_handler(&self) -> Option<&HandlerFrame> {
        match self {
            Self::Handler(h) => Some(h),
            Self::Finalizer(_) => None,
        }
    }

    pub(crate) fn as_handler_mut(&mut self) -> Option<&mut HandlerFrame> {
        match self {
            Self::Handler(h) => Some(h),
            Self::Finalizer(_) => None,
        }
    }
}
