//! Handler and finalizer frames and the stack that holds them.
//!
//! - [`frame`]: the two frame kinds and the [`Handler`] trait
//! - [`stack`]: [`ScopeStack`], the LIFO container with run-on-pop finalizers

pub mod frame;
pub mod stack;

pub use frame::{FinalizerFrame, Frame, FrameKind, Handler, HandlerFrame};
pub use stack::{ScopeError, ScopeStack};
