// Path: crates/core/src/feed.rs
//! A newline-delimited JSON update feed.
//!
//! Each line is one [`FeedRecord`]:
//!
//! ```text
//! {"channelId": "ns=1;s=[PLC]Pump.Speed", "value": {"type": "uint16", "value": 1200}}
//! {"channelId": "ns=1;s=[PLC]Pump.Speed", "error": "BadNodeIdUnknown"}
//! ```

use gaugebridge_types::error::ConsumerError;
use gaugebridge_types::{Scalar, Update};
use serde::Deserialize;
use std::io::{self, BufRead};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Buffer size of the channel between a feed and the consumer loop.
pub const FEED_CAPACITY: usize = 16;

/// Creates the bounded channel a feed writes into.
pub fn feed_channel() -> (mpsc::Sender<Update>, mpsc::Receiver<Update>) {
    mpsc::channel(FEED_CAPACITY)
}

/// One line of the JSON feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRecord {
    #[serde(alias = "nodeId")]
    pub channel_id: String,
    #[serde(default)]
    pub value: Option<Scalar>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
}

impl From<FeedRecord> for Update {
    fn from(record: FeedRecord) -> Self {
        let timestamp = record
            .timestamp_ms
            .and_then(|ms| UNIX_EPOCH.checked_add(Duration::from_millis(ms)))
            .unwrap_or_else(SystemTime::now);
        Update {
            channel_id: record.channel_id,
            value: record.value,
            error: record.error,
            timestamp,
        }
    }
}

/// Delivery statistics of a feed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeedStats {
    /// Updates handed to the consumer.
    pub delivered: u64,
    /// Lines that could not be parsed.
    pub dropped: u64,
}

/// Where feed lines come from.
///
/// A tokio stdin read in flight holds up runtime shutdown until the next line
/// or EOF, so stdin goes through [`FeedLines::from_blocking`] instead.
pub enum FeedLines {
    /// Lines of an async reader such as a file.
    Reader(Lines<Box<dyn AsyncBufRead + Unpin + Send>>),
    /// Lines forwarded by a reader thread.
    Forwarded(mpsc::Receiver<io::Result<String>>),
}

impl std::fmt::Debug for FeedLines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reader(_) => f.write_str("FeedLines::Reader"),
            Self::Forwarded(_) => f.write_str("FeedLines::Forwarded"),
        }
    }
}

impl FeedLines {
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let boxed: Box<dyn AsyncBufRead + Unpin + Send> = Box::new(reader);
        Self::Reader(boxed.lines())
    }

    /// Reads `source` on a named thread that is never joined.
    ///
    /// The thread stops after the first read error, at EOF, or once the
    /// receiving side is dropped and another line arrives.
    pub fn from_blocking<B>(source: B) -> io::Result<Self>
    where
        B: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        std::thread::Builder::new()
            .name("feed-reader".into())
            .spawn(move || {
                for line in source.lines() {
                    let failed = line.is_err();
                    if tx.blocking_send(line).is_err() || failed {
                        break;
                    }
                }
            })?;
        Ok(Self::Forwarded(rx))
    }

    /// Process stdin, see [`FeedLines::from_blocking`].
    pub fn stdin() -> io::Result<Self> {
        Self::from_blocking(io::BufReader::new(io::stdin()))
    }

    async fn next_line(&mut self) -> io::Result<Option<String>> {
        match self {
            Self::Reader(lines) => lines.next_line().await,
            Self::Forwarded(rx) => rx.recv().await.transpose(),
        }
    }
}

/// Reads `lines` on a background task, see [`pump_json_lines`].
pub fn spawn_json_lines_feed(
    lines: FeedLines,
    sender: mpsc::Sender<Update>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<Result<FeedStats, ConsumerError>> {
    tokio::spawn(pump_json_lines(lines, sender, shutdown))
}

/// Parses each line into an update and forwards it until EOF, shutdown, or the consumer going away.
///
/// Unparseable lines are logged and counted as dropped. A read error ends
/// the feed with [`ConsumerError::Upstream`].
pub async fn pump_json_lines(
    mut lines: FeedLines,
    sender: mpsc::Sender<Update>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<FeedStats, ConsumerError> {
    let mut stats = FeedStats::default();

    let result = loop {
        if *shutdown.borrow() {
            break Ok(());
        }
        let line = tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                continue;
            }
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break Ok(()),
            Err(e) => break Err(ConsumerError::Upstream(e.to_string())),
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<FeedRecord>(&line) {
            Ok(record) => {
                if sender.send(record.into()).await.is_err() {
                    break Ok(());
                }
                stats.delivered += 1;
            }
            Err(e) => {
                stats.dropped += 1;
                tracing::warn!(target: "feed", error = %e, "Dropping malformed feed line");
            }
        }
    };

    tracing::info!(
        target: "feed",
        delivered = stats.delivered,
        dropped = stats.dropped,
        "stats: delivered={} dropped={}",
        stats.delivered,
        stats.dropped
    );
    result.map(|()| stats)
}
