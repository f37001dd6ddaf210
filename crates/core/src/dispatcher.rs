// Path: crates/core/src/dispatcher.rs
//! Routes each update to every handler bound to its channel.

use crate::registry::HandlerRegistry;
use crate::summary::EventSummaryCounter;
use gaugebridge_telemetry::time::Timer;
use gaugebridge_telemetry::BridgeMetricsSink;
use gaugebridge_types::error::ErrorCode;
use gaugebridge_types::{Scalar, Update};
use std::sync::Arc;

/// What happened to a single update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The feed reported an error for the update; no handler ran.
    UpstreamError,
    /// The update carried no value or a null one; no handler ran.
    NoValue,
    /// No binding exists for the channel.
    Unbound,
    /// Every bound handler ran. Failures did not stop the remaining handlers.
    Handled { succeeded: usize, failed: usize },
}

/// Sequential, per-handler-isolated dispatch over an immutable registry.
#[derive(Debug)]
pub struct Dispatcher {
    registry: HandlerRegistry,
    summary: Arc<EventSummaryCounter>,
    metrics: Arc<dyn BridgeMetricsSink>,
}

impl Dispatcher {
    pub fn new(
        registry: HandlerRegistry,
        summary: Arc<EventSummaryCounter>,
        metrics: Arc<dyn BridgeMetricsSink>,
    ) -> Self {
        Self {
            registry,
            summary,
            metrics,
        }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &dyn BridgeMetricsSink {
        self.metrics.as_ref()
    }

    /// Counts the update, then runs its channel's handlers in registration order.
    pub fn dispatch(&self, update: &Update) -> DispatchOutcome {
        let _timer = Timer::new(self.metrics.as_ref());
        self.summary.inc(&update.channel_id);
        self.metrics.inc_updates_received();

        if let Some(error) = &update.error {
            self.metrics.inc_upstream_errors();
            tracing::warn!(
                target: "dispatch",
                channel = %update.channel_id,
                error = %error,
                "Upstream error for channel, skipping update"
            );
            return DispatchOutcome::UpstreamError;
        }
        let Some(value) = update.value.as_ref().filter(|v| !matches!(v, Scalar::Null)) else {
            tracing::warn!(
                target: "dispatch",
                channel = %update.channel_id,
                "nil value received for channel"
            );
            return DispatchOutcome::NoValue;
        };

        tracing::debug!(
            target: "dispatch",
            channel = %update.channel_id,
            ts = ?update.timestamp,
            value = %value,
            "update"
        );

        let records = self.registry.handlers_for(&update.channel_id);
        if records.is_empty() {
            return DispatchOutcome::Unbound;
        }

        let mut failed = 0;
        for record in records {
            if let Err(e) = record.handler.handle(value) {
                failed += 1;
                let metric = record.handler.metric_name();
                self.metrics.inc_handler_error(metric, e.code());
                tracing::warn!(
                    target: "dispatch",
                    channel = %update.channel_id,
                    metric = %metric,
                    code = e.code(),
                    error = %e,
                    "Error handling value"
                );
            }
        }
        DispatchOutcome::Handled {
            succeeded: records.len() - failed,
            failed,
        }
    }
}
