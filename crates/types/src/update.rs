// Path: crates/types/src/update.rs
//! The event type produced by an upstream subscription.

use crate::scalar::Scalar;
use std::time::SystemTime;

/// One change notification for a single channel.
///
/// Updates are processed once by the dispatcher and then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// The external identifier of the channel that changed.
    pub channel_id: String,
    /// The new value, absent when the feed delivered no payload.
    pub value: Option<Scalar>,
    /// An error reported by the feed for this channel.
    pub error: Option<String>,
    /// When the source produced the value.
    pub timestamp: SystemTime,
}

impl Update {
    /// Creates a successful update stamped with the current time.
    pub fn value(channel_id: impl Into<String>, value: Scalar) -> Self {
        Self {
            channel_id: channel_id.into(),
            value: Some(value),
            error: None,
            timestamp: SystemTime::now(),
        }
    }

    /// Creates an update carrying a feed-reported error.
    pub fn error(channel_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            value: None,
            error: Some(error.into()),
            timestamp: SystemTime::now(),
        }
    }

    /// Creates an update without a payload.
    pub fn empty(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            value: None,
            error: None,
            timestamp: SystemTime::now(),
        }
    }
}
