//! Tracing setup for the `stemflux` binary.
//!
//! Logs go to stderr so stdout carries only the report.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::AppError;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Resolve the filter: explicit level, then `RUST_LOG`, then `info`.
pub fn build_filter(log_level: Option<&str>) -> Result<EnvFilter, AppError> {
    match log_level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| AppError::input(format!("Invalid log level '{level}': {e}"))),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))),
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_tracing(log_level: Option<&str>) -> Result<(), AppError> {
    let filter = build_filter(log_level)?;
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
    Ok(())
}
