//! Logging utilities

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Reads the standard `RUST_LOG` environment variable; with it unset the
/// program stays silent.
pub fn init() {
    env_logger::init();
}
