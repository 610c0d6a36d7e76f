use std::sync::Once;

static INIT: Once = Once::new();

/// Routes library logging to the test harness. Honors `RUST_LOG`.
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .is_test(true)
            .try_init();
    });
}
