// Path: crates/core/src/coerce.rs
//! Conversion of feed scalars to the `f64` every gauge holds.

use gaugebridge_types::error::CoercionError;
use gaugebridge_types::Scalar;

/// Converts a scalar to a 64-bit float.
///
/// Booleans map to `1.0`/`0.0`. Integer and float kinds are widened with a
/// plain numeric conversion, so `f32` inputs carry their representation error
/// over unchanged and 64-bit integers beyond 2^53 round to the nearest float.
pub fn float_value(value: &Scalar) -> Result<f64, CoercionError> {
    match value {
        Scalar::Null => Err(CoercionError::NullValue),
        Scalar::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Scalar::Int8(v) => Ok(f64::from(*v)),
        Scalar::Int16(v) => Ok(f64::from(*v)),
        Scalar::Int32(v) => Ok(f64::from(*v)),
        Scalar::Int64(v) => Ok(*v as f64),
        Scalar::UInt8(v) => Ok(f64::from(*v)),
        Scalar::UInt16(v) => Ok(f64::from(*v)),
        Scalar::UInt32(v) => Ok(f64::from(*v)),
        Scalar::UInt64(v) => Ok(*v as f64),
        Scalar::Float(v) => Ok(f64::from(*v)),
        Scalar::Double(v) => Ok(*v),
        Scalar::Text(_) | Scalar::Bytes(_) => Err(CoercionError::UnsupportedType(value.kind())),
    }
}
