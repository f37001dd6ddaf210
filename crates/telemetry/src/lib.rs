// Path: crates/telemetry/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # gaugebridge Telemetry
//!
//! This crate provides the observability infrastructure for gaugebridge:
//! structured logging initialization, the gauge sinks handlers emit into, the
//! bridge's own operational metrics, and the Prometheus metrics endpoint.

/// Errors raised by metrics backends.
pub mod error;
/// A lightweight HTTP server for exposing `/metrics`, `/healthz`, and `/readyz` endpoints.
pub mod http;
/// The initialization routine for global structured logging.
pub mod init;
/// The concrete implementation of metrics sinks using the `prometheus` crate.
pub mod prometheus;
/// Abstract traits (`GaugeSink`, `GaugeFactory`, `BridgeMetricsSink`) for metrics reporting.
pub mod sinks;
/// A simple RAII timer for measuring the duration of a scope.
pub mod time;

pub use error::TelemetryError;
pub use sinks::{BridgeMetricsSink, GaugeFactory, GaugeSink, NopSink};
