// Path: crates/types/src/config/mod.rs

//! Channel binding configuration and its loaders.
//!
//! The config document is a JSON array of binding objects:
//!
//! ```json
//! [
//!   { "channelId": "ns=1;s=[PLC]Pump.Speed", "metricName": "pump_speed" },
//!   { "channelId": "ns=1;s=[PLC]Pump.Status", "metricName": "pump_running", "extractBit": 3 }
//! ]
//! ```

use crate::error::ConfigError;
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One configured association of a channel, a metric and an optional bit selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelBinding {
    /// The external channel identifier.
    pub channel_id: String,
    /// The metric name to emit under, before any prefix is applied.
    pub metric_name: String,
    /// When present, emit only this bit of the value as 0.0 or 1.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract_bit: Option<i64>,
}

impl ChannelBinding {
    /// Creates a plain-value binding.
    pub fn new(channel_id: impl Into<String>, metric_name: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            metric_name: metric_name.into(),
            extract_bit: None,
        }
    }

    /// Turns this binding into a bit-extraction binding.
    pub fn with_extract_bit(mut self, bit: i64) -> Self {
        self.extract_bit = Some(bit);
        self
    }
}

// The on-disk shape. Key aliases cover the historical PascalCase and `nodeName` spellings.
#[derive(Debug, Deserialize)]
struct RawBinding {
    #[serde(rename = "channelId", alias = "nodeName", alias = "NodeName", alias = "ChannelId")]
    channel_id: String,
    #[serde(default, rename = "metricName", alias = "MetricName")]
    metric_name: Option<String>,
    #[serde(default, rename = "extractBit", alias = "ExtractBit")]
    extract_bit: Option<i64>,
}

/// The full, validated set of bindings, in config order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BridgeConfig {
    /// Bindings in the order they appear in the config.
    pub bindings: Vec<ChannelBinding>,
}

impl BridgeConfig {
    /// Loads the config from an inline base64 document, falling back to a file.
    ///
    /// The inline document wins when both are given.
    pub fn load(file: Option<&Path>, base64_doc: Option<&str>) -> Result<Self, ConfigError> {
        match (base64_doc, file) {
            (Some(encoded), _) if !encoded.is_empty() => Self::from_base64(encoded),
            (_, Some(path)) => Self::from_file(path),
            _ => Err(ConfigError::Missing),
        }
    }

    /// Reads and parses a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Decodes a standard-alphabet base64 document and parses the JSON inside.
    pub fn from_base64(encoded: &str) -> Result<Self, ConfigError> {
        let decoded = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
        let content = String::from_utf8_lossy(&decoded);
        Self::from_json(&content)
    }

    /// Parses and validates a JSON array of bindings.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let raw: Vec<RawBinding> = serde_json::from_str(content)?;
        if raw.is_empty() {
            return Err(ConfigError::Empty);
        }
        let bindings = raw
            .into_iter()
            .enumerate()
            .map(|(index, raw)| validate_binding(index, raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { bindings })
    }

    /// The distinct channel ids in first-appearance order.
    pub fn channel_ids(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.bindings
            .iter()
            .map(|b| b.channel_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

fn validate_binding(index: usize, raw: RawBinding) -> Result<ChannelBinding, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBinding { index, reason };

    let channel_id = raw.channel_id.trim().to_string();
    if channel_id.is_empty() {
        return Err(invalid("channelId is empty".to_string()));
    }
    if let Some(bit) = raw.extract_bit {
        if bit < 0 {
            return Err(invalid(format!("extractBit must be non-negative, got {bit}")));
        }
    }
    let metric_name = match raw.metric_name.filter(|m| !m.trim().is_empty()) {
        Some(name) => name.trim().to_string(),
        None => channel_to_metric_name(&channel_id).ok_or_else(|| {
            invalid(format!(
                "no metricName given and none can be derived from '{channel_id}'"
            ))
        })?,
    };

    Ok(ChannelBinding {
        channel_id,
        metric_name,
        extract_bit: raw.extract_bit,
    })
}

// Matches the string identifier part of `ns=1;s=[Device]Tag.Path`.
static CHANNEL_NAME_MATCHER: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"s=\[([^\]]+)\]([^;]+)").ok());

/// Derives a metric name from an OPC-UA style string node id.
///
/// `ns=1;s=[L2S2_TMCP]Lift_Station.Alarms[0]` becomes `L2S2_TMCP_Lift_Station_Alarms_0`.
pub fn channel_to_metric_name(channel_id: &str) -> Option<String> {
    let captures = CHANNEL_NAME_MATCHER.as_ref()?.captures(channel_id)?;
    let joined = format!("{}_{}", captures.get(1)?.as_str(), captures.get(2)?.as_str());
    let replaced: String = joined
        .chars()
        .map(|c| if matches!(c, '[' | ']' | '.') { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches('_');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
