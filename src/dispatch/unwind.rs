//! Unwinding the scope stack to an abort target.

use crate::cx;
use crate::tracing_compat::{debug, trace};
use crate::types::FrameId;

/// Pops frames from the head down to and including `target`.
///
/// Each finalizer runs as its frame is popped, innermost first, with the
/// context borrow already released; a finalizer may itself push or pop
/// frames. Handler frames are discarded. Stops early if the stack empties.
pub(crate) fn unwind_to(target: FrameId) {
    let mut popped = 0_usize;
    while let Some(frame) = cx::pop_head() {
        let id = frame.id();
        trace!(frame = %id, kind = ?frame.kind(), "unwinding frame");
        frame.release();
        popped += 1;
        if id == target {
            break;
        }
    }
    debug!(target = %target, popped, "unwound to handler");
}
