// Path: crates/types/src/error/mod.rs
//! Core error types for gaugebridge.

use crate::scalar::ScalarKind;
use std::time::Duration;
use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors raised while converting a scalar to a 64-bit float.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    /// The value was null.
    #[error("Can not convert null value to float64")]
    NullValue,
    /// The value's kind has no numeric interpretation.
    #[error("Unfloatable type: {0}")]
    UnsupportedType(ScalarKind),
}

impl ErrorCode for CoercionError {
    fn code(&self) -> &'static str {
        match self {
            Self::NullValue => "COERCE_NULL_VALUE",
            Self::UnsupportedType(_) => "COERCE_UNSUPPORTED_TYPE",
        }
    }
}

/// Errors raised while serializing a scalar to its little-endian bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializationError {
    /// Only integer kinds have a canonical byte representation.
    #[error("Type was {0}, but only integer types can be serialized for bit extraction")]
    NotAnInteger(ScalarKind),
}

impl ErrorCode for SerializationError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotAnInteger(_) => "SERIALIZE_NOT_AN_INTEGER",
        }
    }
}

/// Errors raised when a bit index does not address a bit of the value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// Bit indices start at zero.
    #[error("Bit number must be positive. Got {0}")]
    NegativeIndex(i64),
    /// The index lies beyond the serialized width.
    #[error("Bit {bit} out of range for {width_bytes}-byte value")]
    OutOfRange {
        /// The requested bit index.
        bit: i64,
        /// The length of the serialized value in bytes.
        width_bytes: usize,
    },
}

impl ErrorCode for RangeError {
    fn code(&self) -> &'static str {
        match self {
            Self::NegativeIndex(_) => "RANGE_NEGATIVE_INDEX",
            Self::OutOfRange { .. } => "RANGE_OUT_OF_RANGE",
        }
    }
}

/// Any failure of a single handler invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// See [`CoercionError`].
    #[error("Coercion error: {0}")]
    Coercion(#[from] CoercionError),
    /// See [`SerializationError`].
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),
    /// See [`RangeError`].
    #[error("Range error: {0}")]
    Range(#[from] RangeError),
}

impl ErrorCode for HandlerError {
    fn code(&self) -> &'static str {
        match self {
            Self::Coercion(e) => e.code(),
            Self::Serialization(e) => e.code(),
            Self::Range(e) => e.code(),
        }
    }
}

/// Errors that end the consumer loop.
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// The feed itself failed and can not deliver further updates.
    #[error("Upstream feed error: {0}")]
    Upstream(String),
    /// No update arrived within the configured budget of read timeouts.
    #[error("Max timeouts ({count}) exceeded waiting {timeout:?} each for updates")]
    ConsecutiveTimeoutExceeded {
        /// The number of consecutive timeouts observed.
        count: u32,
        /// The per-read timeout.
        timeout: Duration,
    },
}

impl ErrorCode for ConsumerError {
    fn code(&self) -> &'static str {
        match self {
            Self::Upstream(_) => "CONSUMER_UPSTREAM_ERROR",
            Self::ConsecutiveTimeoutExceeded { .. } => "CONSUMER_TIMEOUTS_EXCEEDED",
        }
    }
}

/// Errors related to loading or validating the binding configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither a config file nor an inline config was supplied.
    #[error("Requires a config file or a base64-encoded config")]
    Missing,
    /// The config file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The inline config was not valid base64.
    #[error("Invalid base64 config: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The config was not valid JSON for a list of bindings.
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The config parsed but describes no bindings.
    #[error("Config contains no channel bindings")]
    Empty,
    /// A binding is structurally invalid.
    #[error("Invalid binding #{index}: {reason}")]
    InvalidBinding {
        /// Zero-based position of the binding in the config.
        index: usize,
        /// Why it was rejected.
        reason: String,
    },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::Missing => "CONFIG_MISSING",
            Self::Io(_) => "CONFIG_IO",
            Self::Base64(_) => "CONFIG_BASE64",
            Self::Json(_) => "CONFIG_JSON",
            Self::Empty => "CONFIG_EMPTY",
            Self::InvalidBinding { .. } => "CONFIG_INVALID_BINDING",
        }
    }
}

/// Errors raised while building the handler registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The metrics backend refused to create or register a gauge.
    #[error("Failed to create gauge '{metric}' for channel '{channel}': {reason}")]
    Gauge {
        /// The channel the binding belongs to.
        channel: String,
        /// The fully prefixed metric name.
        metric: String,
        /// The backend's error message.
        reason: String,
    },
    /// A channel does not hold one handler record per binding naming it.
    #[error("Channel {channel} has {built} handlers for {expected} bindings")]
    FanOutMismatch {
        /// The channel whose handler list is off.
        channel: String,
        /// The number of bindings naming the channel.
        expected: usize,
        /// The number of handler records held for the channel.
        built: usize,
    },
}

impl ErrorCode for RegistryError {
    fn code(&self) -> &'static str {
        match self {
            Self::Gauge { .. } => "REGISTRY_GAUGE_FAILED",
            Self::FanOutMismatch { .. } => "REGISTRY_FAN_OUT_MISMATCH",
        }
    }
}

/// Errors related to the event summary counter lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    /// `start` was called on a counter that is running or already stopped.
    #[error("Summary counter can only be started once")]
    AlreadyStarted,
}

impl ErrorCode for SummaryError {
    fn code(&self) -> &'static str {
        match self {
            Self::AlreadyStarted => "SUMMARY_ALREADY_STARTED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error_code_delegates() {
        let err: HandlerError = RangeError::NegativeIndex(-3).into();
        assert_eq!(err.code(), "RANGE_NEGATIVE_INDEX");
        let err: HandlerError = CoercionError::UnsupportedType(ScalarKind::Text).into();
        assert_eq!(err.code(), "COERCE_UNSUPPORTED_TYPE");
        assert_eq!(err.to_string(), "Coercion error: Unfloatable type: string");
    }
}
