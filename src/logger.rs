//! Tracing subscriber setup shared by the server binary and tests.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// The filter is taken from `RUST_LOG` when set, otherwise `default_level`
/// is applied to the whole process. Repeated calls are ignored so test
/// binaries may call this freely.
pub fn setup_logger(name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(true)
        .try_init();

    tracing::debug!("logger initialized for '{}'", name);
}
