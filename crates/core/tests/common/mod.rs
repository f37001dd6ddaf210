// Path: crates/core/tests/common/mod.rs
#![allow(dead_code)]

use gaugebridge_core::{Dispatcher, EventSummaryCounter, HandlerRegistry};
use gaugebridge_telemetry::{GaugeFactory, GaugeSink, NopSink, TelemetryError};
use gaugebridge_types::ChannelBinding;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// A gauge remembering every value it was set to.
#[derive(Debug)]
pub struct RecordingGauge {
    name: String,
    values: Mutex<Vec<f64>>,
}

impl RecordingGauge {
    pub fn values(&self) -> Vec<f64> {
        self.values.lock().clone()
    }
}

impl GaugeSink for RecordingGauge {
    fn set(&self, value: f64) {
        self.values.lock().push(value);
    }
    fn name(&self) -> &str {
        &self.name
    }
}

/// Hands out recording gauges and keeps them by name for inspection.
#[derive(Debug, Default)]
pub struct RecordingFactory {
    gauges: Mutex<HashMap<String, Arc<RecordingGauge>>>,
}

impl RecordingFactory {
    pub fn values(&self, name: &str) -> Vec<f64> {
        self.gauges
            .lock()
            .get(name)
            .map(|g| g.values())
            .unwrap_or_default()
    }
}

impl GaugeFactory for RecordingFactory {
    fn create_gauge(&self, name: &str, _help: &str) -> Result<Arc<dyn GaugeSink>, TelemetryError> {
        let gauge = Arc::new(RecordingGauge {
            name: name.to_string(),
            values: Mutex::new(Vec::new()),
        });
        self.gauges.lock().insert(name.to_string(), gauge.clone());
        Ok(gauge)
    }
}

pub struct Harness {
    pub factory: RecordingFactory,
    pub summary: Arc<EventSummaryCounter>,
    pub dispatcher: Dispatcher,
}

pub fn harness(bindings: &[ChannelBinding]) -> Harness {
    let factory = RecordingFactory::default();
    let registry = HandlerRegistry::build(bindings, &factory, "").unwrap();
    let summary = Arc::new(EventSummaryCounter::new(Duration::from_secs(60)));
    let dispatcher = Dispatcher::new(registry, summary.clone(), Arc::new(NopSink));
    Harness {
        factory,
        summary,
        dispatcher,
    }
}
