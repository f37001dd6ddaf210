// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling core logic from the backend.

use crate::error::TelemetryError;
use std::sync::Arc;

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopSink;

// --- Trait Definitions ---

/// A settable numeric gauge identified by a unique name.
pub trait GaugeSink: Send + Sync + std::fmt::Debug {
    /// Sets the gauge to the given value.
    fn set(&self, value: f64);
    /// The fully qualified name the gauge was registered under.
    fn name(&self) -> &str;
}

/// Creates named gauges and registers them with a metrics backend before first use.
pub trait GaugeFactory: Send + Sync + std::fmt::Debug {
    /// Creates and registers a gauge. Names must be unique within one factory.
    fn create_gauge(&self, name: &str, help: &str) -> Result<Arc<dyn GaugeSink>, TelemetryError>;
}

/// A sink for the bridge's own operational metrics.
pub trait BridgeMetricsSink: Send + Sync + std::fmt::Debug {
    /// Updates the gauge holding the seconds elapsed since startup.
    fn refresh_uptime(&self);
    /// Increments the counter of updates received from the feed.
    fn inc_updates_received(&self);
    /// Increments the counter of updates that carried a feed-reported error.
    fn inc_upstream_errors(&self);
    /// Increments the counter of failed handler invocations, labeled by metric and error code.
    fn inc_handler_error(&self, metric: &str, reason: &'static str);
    /// Increments the counter of read timeouts while waiting for updates.
    fn inc_read_timeouts(&self);
    /// Observes the time taken to dispatch one update to all of its handlers.
    fn observe_dispatch_duration(&self, duration_secs: f64);
}

// --- No-op implementations ---

/// A gauge that discards every value.
#[derive(Debug, Clone)]
pub struct NopGauge {
    name: String,
}

impl GaugeSink for NopGauge {
    fn set(&self, _value: f64) {}
    fn name(&self) -> &str {
        &self.name
    }
}

impl GaugeFactory for NopSink {
    fn create_gauge(&self, name: &str, _help: &str) -> Result<Arc<dyn GaugeSink>, TelemetryError> {
        Ok(Arc::new(NopGauge {
            name: name.to_string(),
        }))
    }
}

impl BridgeMetricsSink for NopSink {
    fn refresh_uptime(&self) {}
    fn inc_updates_received(&self) {}
    fn inc_upstream_errors(&self) {}
    fn inc_handler_error(&self, _metric: &str, _reason: &'static str) {}
    fn inc_read_timeouts(&self) {}
    fn observe_dispatch_duration(&self, _duration_secs: f64) {}
}
