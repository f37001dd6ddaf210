// Path: crates/core/src/bits.rs
//! Single-bit extraction from integer scalars.
//!
//! Bit indexing starts at zero, which is the least significant bit. For the
//! 32-bit value `0xF0F10F0F`, bit 16 is the one in parentheses:
//!
//! ```text
//! 11110000 1111000(1) 00001111 00001111
//! ```
//!
//! Signed and unsigned integers are both accepted; signed values contribute
//! their two's complement bytes.

use gaugebridge_types::error::{HandlerError, RangeError, SerializationError};
use gaugebridge_types::Scalar;

/// Serializes an integer scalar to little-endian bytes sized to its declared width.
pub fn serialize(value: &Scalar) -> Result<Vec<u8>, SerializationError> {
    let bytes = match value {
        Scalar::Int8(v) => v.to_le_bytes().to_vec(),
        Scalar::Int16(v) => v.to_le_bytes().to_vec(),
        Scalar::Int32(v) => v.to_le_bytes().to_vec(),
        Scalar::Int64(v) => v.to_le_bytes().to_vec(),
        Scalar::UInt8(v) => v.to_le_bytes().to_vec(),
        Scalar::UInt16(v) => v.to_le_bytes().to_vec(),
        Scalar::UInt32(v) => v.to_le_bytes().to_vec(),
        Scalar::UInt64(v) => v.to_le_bytes().to_vec(),
        other => return Err(SerializationError::NotAnInteger(other.kind())),
    };
    Ok(bytes)
}

/// Returns bit `bit` of a little-endian byte string as `0` or `1`.
pub fn extract_bit(bytes: &[u8], bit: i64) -> Result<u8, RangeError> {
    if bit < 0 {
        return Err(RangeError::NegativeIndex(bit));
    }

    // decompose bit number into a byte index and a bit index within that byte
    let out_of_range = || RangeError::OutOfRange {
        bit,
        width_bytes: bytes.len(),
    };
    let byte_idx = usize::try_from(bit / 8).map_err(|_| out_of_range())?;
    let bit_idx = bit % 8;
    let byte = bytes.get(byte_idx).ok_or_else(out_of_range)?;
    Ok((*byte >> bit_idx) & 0x01)
}

/// Serializes `value` and returns the requested bit as `0.0` or `1.0`.
pub fn extracted_float(value: &Scalar, bit: i64) -> Result<f64, HandlerError> {
    let bytes = serialize(value)?;
    let bit_value = extract_bit(&bytes, bit)?;
    Ok(f64::from(bit_value))
}
