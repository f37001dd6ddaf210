// Path: crates/core/src/handler.rs
//! The two ways a scalar can become a gauge value.

use crate::{bits, coerce};
use gaugebridge_telemetry::GaugeSink;
use gaugebridge_types::error::HandlerError;
use gaugebridge_types::{ChannelBinding, Scalar};
use std::sync::Arc;

/// Emits the coerced value of every update.
#[derive(Debug, Clone)]
pub struct ValueHandler {
    gauge: Arc<dyn GaugeSink>,
}

/// Emits a single bit of every update as `0.0` or `1.0`.
#[derive(Debug, Clone)]
pub struct BitVectorHandler {
    gauge: Arc<dyn GaugeSink>,
    extract_bit: i64,
}

/// A handler bound to one gauge, selected from configuration at startup.
#[derive(Debug, Clone)]
pub enum Handler {
    /// See [`ValueHandler`].
    Value(ValueHandler),
    /// See [`BitVectorHandler`].
    BitVector(BitVectorHandler),
}

impl Handler {
    /// Picks the handler variant a binding asks for.
    pub fn for_binding(binding: &ChannelBinding, gauge: Arc<dyn GaugeSink>) -> Self {
        match binding.extract_bit {
            Some(extract_bit) => Self::BitVector(BitVectorHandler { gauge, extract_bit }),
            None => Self::Value(ValueHandler { gauge }),
        }
    }

    /// Computes the metric value without emitting it.
    pub fn float_value(&self, value: &Scalar) -> Result<f64, HandlerError> {
        match self {
            Self::Value(_) => Ok(coerce::float_value(value)?),
            Self::BitVector(h) => bits::extracted_float(value, h.extract_bit),
        }
    }

    /// Computes the metric value and sets the gauge. The gauge is left untouched on error.
    pub fn handle(&self, value: &Scalar) -> Result<(), HandlerError> {
        let float_val = self.float_value(value)?;
        if let Self::BitVector(h) = self {
            tracing::debug!(
                target: "dispatch",
                metric = h.gauge.name(),
                bit = h.extract_bit,
                value = float_val,
                "Extracted bit"
            );
        }
        self.gauge().set(float_val);
        Ok(())
    }

    /// The name of the gauge this handler emits to.
    pub fn metric_name(&self) -> &str {
        self.gauge().name()
    }

    fn gauge(&self) -> &Arc<dyn GaugeSink> {
        match self {
            Self::Value(h) => &h.gauge,
            Self::BitVector(h) => &h.gauge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaugebridge_types::error::{CoercionError, RangeError};
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    struct RecordingGauge {
        values: Mutex<Vec<f64>>,
    }

    impl GaugeSink for RecordingGauge {
        fn set(&self, value: f64) {
            self.values.lock().push(value);
        }
        fn name(&self) -> &str {
            "bar"
        }
    }

    fn handler(extract_bit: Option<i64>) -> (Handler, Arc<RecordingGauge>) {
        let gauge = Arc::new(RecordingGauge::default());
        let mut binding = ChannelBinding::new("foo", "bar");
        binding.extract_bit = extract_bit;
        (Handler::for_binding(&binding, gauge.clone()), gauge)
    }

    #[test]
    fn test_variant_follows_binding() {
        assert!(matches!(handler(None).0, Handler::Value(_)));
        assert!(matches!(handler(Some(0)).0, Handler::BitVector(_)));
    }

    #[test]
    fn test_value_handler_sets_gauge() {
        let (h, gauge) = handler(None);
        h.handle(&Scalar::Int32(-7)).unwrap();
        h.handle(&Scalar::Bool(true)).unwrap();
        assert_eq!(*gauge.values.lock(), vec![-7.0, 1.0]);
        assert_eq!(h.metric_name(), "bar");
    }

    #[test]
    fn test_bit_handler_sets_gauge() {
        let (h, gauge) = handler(Some(20));
        h.handle(&Scalar::UInt32(0x0010_0098)).unwrap();
        assert_eq!(h.float_value(&Scalar::UInt32(0x0010_0098)).unwrap(), 1.0);
        assert_eq!(*gauge.values.lock(), vec![1.0]);
    }

    #[test]
    fn test_failure_leaves_gauge_untouched() {
        let (h, gauge) = handler(None);
        assert_eq!(
            h.handle(&Scalar::Null),
            Err(HandlerError::Coercion(CoercionError::NullValue))
        );
        let (bit_h, bit_gauge) = handler(Some(22));
        assert!(matches!(
            bit_h.handle(&Scalar::UInt16(32768)),
            Err(HandlerError::Range(RangeError::OutOfRange { .. }))
        ));
        assert!(gauge.values.lock().is_empty());
        assert!(bit_gauge.values.lock().is_empty());
    }
}
