use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Send tracing output to the test harness, filtered with `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}
