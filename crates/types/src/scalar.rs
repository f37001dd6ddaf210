// Path: crates/types/src/scalar.rs
//! The closed union of runtime-typed values carried by feed updates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A loosely-typed value received from the feed.
///
/// Numeric and boolean kinds are the ones a handler can turn into a metric.
/// `Text`, `Bytes` and `Null` exist so a feed can still hand them over; the
/// handlers reject them with a typed error instead of guessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Scalar {
    /// An explicit null.
    Null,
    /// A boolean.
    Bool(bool),
    /// An 8-bit signed integer.
    Int8(i8),
    /// A 16-bit signed integer.
    Int16(i16),
    /// A 32-bit signed integer.
    Int32(i32),
    /// A 64-bit signed integer.
    Int64(i64),
    /// An 8-bit unsigned integer.
    #[serde(rename = "uint8")]
    UInt8(u8),
    /// A 16-bit unsigned integer.
    #[serde(rename = "uint16")]
    UInt16(u16),
    /// A 32-bit unsigned integer.
    #[serde(rename = "uint32")]
    UInt32(u32),
    /// A 64-bit unsigned integer.
    #[serde(rename = "uint64")]
    UInt64(u64),
    /// A 32-bit float.
    Float(f32),
    /// A 64-bit float.
    Double(f64),
    /// A text value.
    #[serde(rename = "string")]
    Text(String),
    /// An opaque byte string.
    Bytes(Vec<u8>),
}

/// The declared kind of a [`Scalar`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// See [`Scalar::Null`].
    Null,
    /// See [`Scalar::Bool`].
    Bool,
    /// See [`Scalar::Int8`].
    Int8,
    /// See [`Scalar::Int16`].
    Int16,
    /// See [`Scalar::Int32`].
    Int32,
    /// See [`Scalar::Int64`].
    Int64,
    /// See [`Scalar::UInt8`].
    UInt8,
    /// See [`Scalar::UInt16`].
    UInt16,
    /// See [`Scalar::UInt32`].
    UInt32,
    /// See [`Scalar::UInt64`].
    UInt64,
    /// See [`Scalar::Float`].
    Float,
    /// See [`Scalar::Double`].
    Double,
    /// See [`Scalar::Text`].
    Text,
    /// See [`Scalar::Bytes`].
    Bytes,
}

impl Scalar {
    /// Returns the declared kind of this value.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Null => ScalarKind::Null,
            Self::Bool(_) => ScalarKind::Bool,
            Self::Int8(_) => ScalarKind::Int8,
            Self::Int16(_) => ScalarKind::Int16,
            Self::Int32(_) => ScalarKind::Int32,
            Self::Int64(_) => ScalarKind::Int64,
            Self::UInt8(_) => ScalarKind::UInt8,
            Self::UInt16(_) => ScalarKind::UInt16,
            Self::UInt32(_) => ScalarKind::UInt32,
            Self::UInt64(_) => ScalarKind::UInt64,
            Self::Float(_) => ScalarKind::Float,
            Self::Double(_) => ScalarKind::Double,
            Self::Text(_) => ScalarKind::Text,
            Self::Bytes(_) => ScalarKind::Bytes,
        }
    }
}

impl ScalarKind {
    /// A stable, lowercase name for logs and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float => "float",
            Self::Double => "double",
            Self::Text => "string",
            Self::Bytes => "bytes",
        }
    }

    /// The width in bits of integer kinds, `None` for everything else.
    pub const fn integer_bits(self) -> Option<u32> {
        match self {
            Self::Int8 | Self::UInt8 => Some(8),
            Self::Int16 | Self::UInt16 => Some(16),
            Self::Int32 | Self::UInt32 => Some(32),
            Self::Int64 | Self::UInt64 => Some(64),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt8(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::Bytes(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}
