//! Logging utilities

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system.
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}

/// Initialize logging for tests, capturing output per test
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
