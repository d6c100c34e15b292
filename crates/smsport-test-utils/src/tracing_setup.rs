//! Tracing for tests.
//!
//! The core logs one `debug!` line per mapped message, which is usually what
//! a failing conversion test needs to see. Only the first initialisation in a
//! process takes effect.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_TEST_FILTER: &str = "info,smsport_core=debug";

/// Capture tracing output in the test harness with [`DEFAULT_TEST_FILTER`]
/// unless `RUST_LOG` overrides it.
pub fn init_test_tracing() {
    init_test_tracing_with(DEFAULT_TEST_FILTER);
}

/// Like [`init_test_tracing`] with an explicit fallback filter directive.
pub fn init_test_tracing_with(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}
