// Path: crates/telemetry/src/time.rs
use crate::sinks::BridgeMetricsSink;
use std::time::Instant;

/// Observes the lifetime of a scope as one dispatch duration sample.
pub struct Timer<'a> {
    sink: &'a dyn BridgeMetricsSink,
    start: Instant,
}

impl<'a> Timer<'a> {
    pub fn new(sink: &'a dyn BridgeMetricsSink) -> Self {
        Self {
            sink,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer<'_> {
    fn drop(&mut self) {
        self.sink
            .observe_dispatch_duration(self.start.elapsed().as_secs_f64());
    }
}
