// Path: crates/telemetry/src/error.rs
use thiserror::Error;

/// Errors raised by a metrics backend.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The Prometheus client rejected a collector, e.g. a duplicate or malformed name.
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}
