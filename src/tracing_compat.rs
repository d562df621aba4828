//! Optional tracing integration.
//!
//! Engine code logs through this module instead of naming `tracing`
//! directly. With the `tracing-integration` feature enabled the macros are the
//! real `tracing` macros; without it they expand to nothing, so the logging
//! calls cost nothing.
//!
//! ```ignore
//! use crate::tracing_compat::debug;
//!
//! debug!(frame = %id, name = %name, "handler frame pushed");
//! ```

#[cfg(feature = "tracing-integration")]
pub use tracing::{debug, error, info, trace, warn};

#[cfg(not(feature = "tracing-integration"))]
mod noop {
    #[doc(hidden)]
    #[macro_export]
    macro_rules! __conditio_noop_log {
        ($($arg:tt)*) => {};
    }
}

#[cfg(not(feature = "tracing-integration"))]
pub use crate::__conditio_noop_log as debug;
#[cfg(not(feature = "tracing-integration"))]
pub use crate::__conditio_noop_log as error;
#[cfg(not(feature = "tracing-integration"))]
pub use crate::__conditio_noop_log as info;
#[cfg(not(feature = "tracing-integration"))]
pub use crate::__conditio_noop_log as trace;
#[cfg(not(feature = "tracing-integration"))]
pub use crate::__conditio_noop_log as warn;

/// Returns `true` when the crate was built with tracing support.
#[must_use]
pub const fn is_enabled() -> bool {
    cfg!(feature = "tracing-integration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macros_accept_structured_fields() {
        let frame = 7_u64;
        trace!(frame, "trace event");
        debug!(frame = frame, name = %"x", "debug event");
        info!("info event");
        warn!(frame = ?frame, "warn event");
        error!("error event {}", frame);
        assert_eq!(is_enabled(), cfg!(feature = "tracing-integration"));
    }
}
