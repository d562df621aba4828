//! Shared helpers for unit and integration tests.
//!
//! Tests start with [`init_test_logging`] and bracket their body with
//! [`test_phase!`](crate::test_phase) / [`test_complete!`](crate::test_complete)
//! so a failing run's log shows where it stopped. Set `RUST_LOG` to raise the
//! level (`RUST_LOG=conditio=trace` shows every frame push and pop).

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_TEST_FILTER: &str = "conditio=debug";

/// Installs a global test subscriber writing through the test harness's
/// captured output. Safe to call from every test; only the first call
/// installs anything.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_FILTER));
        // Another harness may already own the global subscriber.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_names(true)
            .try_init();
    });
}

/// Logs the start of a named test phase.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        $crate::tracing_compat::info!(phase = %$name, "test phase started");
    };
}

/// Logs the successful end of a named test.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        $crate::tracing_compat::info!(test = %$name, "test completed");
    };
}

/// Asserts `cond`, logging the expectation and the observed value first.
///
/// ```ignore
/// crate::assert_with_log!(depth == 2, "two frames left", 2, depth);
/// ```
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr $(,)?) => {{
        let expected = &$expected;
        let actual = &$actual;
        $crate::tracing_compat::debug!(
            expected = ?expected,
            actual = ?actual,
            "assert: {}",
            $msg
        );
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, expected, actual);
    }};
}
