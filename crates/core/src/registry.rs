// Path: crates/core/src/registry.rs
//! Channel id to handler lookup, built once before dispatch begins.

use crate::handler::Handler;
use gaugebridge_telemetry::GaugeFactory;
use gaugebridge_types::error::RegistryError;
use gaugebridge_types::ChannelBinding;
use std::collections::HashMap;

/// One binding together with the handler constructed for it.
#[derive(Debug, Clone)]
pub struct HandlerRecord {
    pub binding: ChannelBinding,
    pub handler: Handler,
}

/// Immutable mapping from channel id to the handlers bound to it, in config order.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    by_channel: HashMap<String, Vec<HandlerRecord>>,
    channel_order: Vec<String>,
    len: usize,
}

/// Applies the optional metric prefix: `prefix_name`, or `name` when the prefix is empty.
pub fn prefixed_metric_name(prefix: &str, metric_name: &str) -> String {
    if prefix.is_empty() {
        metric_name.to_string()
    } else {
        format!("{prefix}_{metric_name}")
    }
}

impl HandlerRegistry {
    /// Creates one gauge and one handler per binding.
    ///
    /// Bindings sharing a channel id are all kept, in order, so one channel can
    /// feed several metrics.
    pub fn build(
        bindings: &[ChannelBinding],
        factory: &dyn GaugeFactory,
        prefix: &str,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for binding in bindings {
            let metric = prefixed_metric_name(prefix, &binding.metric_name);
            let help = format!("From channel {}", binding.channel_id);
            let gauge = factory
                .create_gauge(&metric, &help)
                .map_err(|e| RegistryError::Gauge {
                    channel: binding.channel_id.clone(),
                    metric: metric.clone(),
                    reason: e.to_string(),
                })?;
            let handler = Handler::for_binding(binding, gauge);
            tracing::info!(
                target: "registry",
                metric = %metric,
                channel = %binding.channel_id,
                extract_bit = ?binding.extract_bit,
                "Created metric for channel"
            );
            registry.insert(HandlerRecord {
                binding: binding.clone(),
                handler,
            });
        }

        registry.verify_fan_out(bindings)?;
        Ok(registry)
    }

    /// Checks that every channel holds exactly one record per binding naming it.
    pub fn verify_fan_out(&self, bindings: &[ChannelBinding]) -> Result<(), RegistryError> {
        let mut expected: HashMap<&str, usize> = HashMap::new();
        for binding in bindings {
            *expected.entry(binding.channel_id.as_str()).or_default() += 1;
        }
        for channel in expected.keys().copied().chain(self.channel_order.iter().map(String::as_str)) {
            let want = expected.get(channel).copied().unwrap_or_default();
            let built = self.handlers_for(channel).len();
            if built != want {
                return Err(RegistryError::FanOutMismatch {
                    channel: channel.to_string(),
                    expected: want,
                    built,
                });
            }
        }
        Ok(())
    }

    fn insert(&mut self, record: HandlerRecord) {
        let channel = record.binding.channel_id.clone();
        let records = self.by_channel.entry(channel.clone()).or_default();
        if records.is_empty() {
            self.channel_order.push(channel);
        }
        records.push(record);
        self.len += 1;
    }

    /// The handlers bound to `channel_id`, empty when the channel is not configured.
    pub fn handlers_for(&self, channel_id: &str) -> &[HandlerRecord] {
        self.by_channel
            .get(channel_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct channel ids in first-appearance order, for building a subscription.
    pub fn channel_ids(&self) -> &[String] {
        &self.channel_order
    }

    /// Total number of handler records.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
