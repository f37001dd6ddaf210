// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.
//!
//! Every collector lives in a `Registry` owned by the sink, so tests and
//! embedders can run several bridges in one process without name clashes.

use crate::error::TelemetryError;
use crate::sinks::*;
use prometheus::{
    exponential_buckets, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts,
    Registry,
};
use std::sync::Arc;
use std::time::Instant;

/// Namespace for the bridge's own metrics.
pub const SELF_NAMESPACE: &str = "gaugebridge";

/// A gauge registered in a Prometheus registry.
#[derive(Debug, Clone)]
pub struct PrometheusGauge {
    name: String,
    gauge: Gauge,
}

impl GaugeSink for PrometheusGauge {
    fn set(&self, value: f64) {
        self.gauge.set(value);
    }
    fn name(&self) -> &str {
        &self.name
    }
}

/// Prometheus-backed implementation of [`GaugeFactory`] and [`BridgeMetricsSink`].
#[derive(Debug, Clone)]
pub struct PrometheusSink {
    registry: Registry,
    started: Instant,
    uptime_seconds: Gauge,
    updates_received_total: IntCounter,
    upstream_errors_total: IntCounter,
    handler_errors_total: IntCounterVec,
    read_timeouts_total: IntCounter,
    dispatch_duration_seconds: Histogram,
}

impl PrometheusSink {
    /// Creates a fresh registry and registers the bridge's own collectors in it.
    pub fn install() -> Result<Self, TelemetryError> {
        Self::with_registry(Registry::new())
    }

    /// Registers the bridge's own collectors in an existing registry.
    pub fn with_registry(registry: Registry) -> Result<Self, TelemetryError> {
        let uptime_seconds = Gauge::with_opts(
            Opts::new(
                "uptime_seconds",
                "Time in seconds since the gauge bridge started",
            )
            .namespace(SELF_NAMESPACE),
        )?;
        let updates_received_total = IntCounter::with_opts(
            Opts::new(
                "updates_received_total",
                "Total updates received from the feed.",
            )
            .namespace(SELF_NAMESPACE),
        )?;
        let upstream_errors_total = IntCounter::with_opts(
            Opts::new(
                "upstream_errors_total",
                "Total updates that carried a feed-reported error.",
            )
            .namespace(SELF_NAMESPACE),
        )?;
        let handler_errors_total = IntCounterVec::new(
            Opts::new(
                "handler_errors_total",
                "Total failed handler invocations, by metric and reason.",
            )
            .namespace(SELF_NAMESPACE),
            &["metric", "reason"],
        )?;
        let read_timeouts_total = IntCounter::with_opts(
            Opts::new(
                "read_timeouts_total",
                "Total read timeouts while waiting for feed updates.",
            )
            .namespace(SELF_NAMESPACE),
        )?;
        let dispatch_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "dispatch_duration_seconds",
                "Latency of dispatching one update to all bound handlers.",
            )
            .namespace(SELF_NAMESPACE)
            .buckets(exponential_buckets(0.00001, 2.0, 16)?),
        )?;

        registry.register(Box::new(uptime_seconds.clone()))?;
        registry.register(Box::new(updates_received_total.clone()))?;
        registry.register(Box::new(upstream_errors_total.clone()))?;
        registry.register(Box::new(handler_errors_total.clone()))?;
        registry.register(Box::new(read_timeouts_total.clone()))?;
        registry.register(Box::new(dispatch_duration_seconds.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        let sink = Self {
            registry,
            started: Instant::now(),
            uptime_seconds,
            updates_received_total,
            upstream_errors_total,
            handler_errors_total,
            read_timeouts_total,
            dispatch_duration_seconds,
        };
        sink.refresh_uptime();
        Ok(sink)
    }

    /// The registry backing this sink, for exposition.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl GaugeFactory for PrometheusSink {
    fn create_gauge(&self, name: &str, help: &str) -> Result<Arc<dyn GaugeSink>, TelemetryError> {
        let gauge = Gauge::with_opts(Opts::new(name, help))?;
        self.registry.register(Box::new(gauge.clone()))?;
        Ok(Arc::new(PrometheusGauge {
            name: name.to_string(),
            gauge,
        }))
    }
}

impl BridgeMetricsSink for PrometheusSink {
    fn refresh_uptime(&self) {
        self.uptime_seconds
            .set(self.started.elapsed().as_secs_f64());
    }
    fn inc_updates_received(&self) {
        self.updates_received_total.inc();
    }
    fn inc_upstream_errors(&self) {
        self.upstream_errors_total.inc();
    }
    fn inc_handler_error(&self, metric: &str, reason: &'static str) {
        self.handler_errors_total
            .with_label_values(&[metric, reason])
            .inc();
    }
    fn inc_read_timeouts(&self) {
        self.read_timeouts_total.inc();
    }
    fn observe_dispatch_duration(&self, duration_secs: f64) {
        self.dispatch_duration_seconds.observe(duration_secs);
    }
}
