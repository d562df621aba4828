//! The handler/finalizer stack.
//!
//! Frames are kept newest-last in a small vector; "head" below means the most
//! recently pushed frame. Removing a finalizer frame through [`ScopeStack::pop`]
//! runs its callback: popping a finalizer *is* running it.
//!
//! The stack itself never calls back into user code while it is mutably
//! borrowed by the thread-local context. The context uses
//! [`ScopeStack::remove`] / [`ScopeStack::pop_head`] to detach frames and
//! releases them after the borrow ends.

use super::frame::{FinalizerFrame, Frame, Handler, HandlerFrame};
use crate::tracing_compat::{trace, warn};
use crate::types::FrameId;
use smallvec::SmallVec;
use std::rc::Rc;

/// Inline capacity before the stack spills to the heap.
const INLINE_FRAMES: usize = 8;

/// Error type for scope stack operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    /// The frame is not on the stack.
    #[error("trying to unregister non-existent frame {frame}")]
    NotFound {
        /// The frame that was looked up.
        frame: FrameId,
    },
}

/// A LIFO stack of handler and finalizer frames.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: SmallVec<[Frame; INLINE_FRAMES]>,
}

impl ScopeStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: SmallVec::new(),
        }
    }

    /// Pushes a handler frame for conditions named `name`.
    pub fn push_handler(&mut self, name: impl Into<String>, handler: impl Handler) -> FrameId {
        self.push_handler_rc(name.into(), Rc::new(handler))
    }

    pub(crate) fn push_handler_rc(&mut self, name: String, handler: Rc<dyn Handler>) -> FrameId {
        let id = FrameId::next();
        trace!(frame = %id, name = %name, depth = self.frames.len() + 1, "handler frame pushed");
        self.frames
            .push(Frame::Handler(HandlerFrame::new(id, name, handler)));
        id
    }

    /// Pushes a finalizer frame.
    pub fn push_finalizer(&mut self, callback: impl FnOnce() + 'static) -> FrameId {
        self.push_finalizer_boxed(Box::new(callback))
    }

    pub(crate) fn push_finalizer_boxed(&mut self, callback: Box<dyn FnOnce()>) -> FrameId {
        let id = FrameId::next();
        trace!(frame = %id, depth = self.frames.len() + 1, "finalizer frame pushed");
        self.frames
            .push(Frame::Finalizer(FinalizerFrame::new(id, callback)));
        id
    }

    /// Removes the frame `id` and releases it.
    ///
    /// A finalizer frame's callback runs exactly once as part of the removal;
    /// a handler frame is removed silently.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::NotFound`] (and logs a warning) if no such frame
    /// is on the stack. The stack is left untouched.
    pub fn pop(&mut self, id: FrameId) -> Result<(), ScopeError> {
        self.remove(id).map(Frame::release)
    }

    /// Detaches the frame `id` without releasing it.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::NotFound`] (and logs a warning) if no such frame
    /// is on the stack.
    pub fn remove(&mut self, id: FrameId) -> Result<Frame, ScopeError> {
        let Some(pos) = self.position(id) else {
            warn!(frame = %id, "trying to unregister non-existent frame");
            return Err(ScopeError::NotFound { frame: id });
        };
        let frame = self.frames.remove(pos);
        trace!(frame = %id, kind = ?frame.kind(), depth = self.frames.len(), "frame removed");
        Ok(frame)
    }

    /// Detaches the head frame, if any.
    pub fn pop_head(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Returns the head frame's identifier.
    #[must_use]
    pub fn head(&self) -> Option<FrameId> {
        self.frames.last().map(Frame::id)
    }

    /// Finds the most recent handler frame named `name` that is older than
    /// `below` (or anywhere on the stack when `below` is `None`).
    ///
    /// Finalizer frames are skipped.
    #[must_use]
    pub fn find_handler(
        &self,
        name: &str,
        below: Option<FrameId>,
    ) -> Option<(FrameId, Rc<dyn Handler>)> {
        self.frames
            .iter()
            .rev()
            .filter(|frame| below.is_none_or(|limit| frame.id() < limit))
            .filter_map(Frame::as_handler)
            .find(|handler| handler.name() == name)
            .map(|handler| (handler.id(), handler.handler()))
    }

    /// Returns `true` if the frame is on the stack.
    #[must_use]
    pub fn contains(&self, id: FrameId) -> bool {
        self.position(id).is_some()
    }

    /// Marks a handler frame as having (or no longer having) a live
    /// resumption point. Returns `false` if `id` is not a handler frame on the
    /// stack.
    pub fn set_armed(&mut self, id: FrameId, armed: bool) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        match self.frames[pos].as_handler_mut() {
            Some(handler) => {
                handler.set_armed(armed);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if `id` is an armed handler frame.
    #[must_use]
    pub fn is_armed(&self, id: FrameId) -> bool {
        self.position(id)
            .and_then(|pos| self.frames[pos].as_handler())
            .is_some_and(HandlerFrame::is_armed)
    }

    /// Returns the number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if no frames are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Iterates over the frames, head first.
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter().rev()
    }

    fn position(&self, id: FrameId) -> Option<usize> {
        // Frames are ordered by id; recent frames are the common case.
        self.frames.iter().rposition(|frame| frame.id() == id)
    }
}
