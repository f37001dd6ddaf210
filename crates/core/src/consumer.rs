// Path: crates/core/src/consumer.rs
//! The loop that drains the update feed into the dispatcher.

use crate::dispatcher::Dispatcher;
use gaugebridge_types::error::ConsumerError;
use gaugebridge_types::Update;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time;

/// Read-timeout policy for the consumer loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerOptions {
    /// How long to wait for the next update before counting a timeout.
    pub read_timeout: Duration,
    /// Consecutive timeouts tolerated before giving up. `0` disables the limit.
    pub max_timeouts: u32,
}

impl Default for ConsumerOptions {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(5),
            max_timeouts: 30,
        }
    }
}

/// Why the consumer loop returned without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerExit {
    /// The shutdown signal was raised.
    Shutdown,
    /// Every feed sender was dropped.
    FeedClosed,
}

/// Dispatches updates in feed order until shutdown, feed closure, or timeout exhaustion.
pub async fn run_consumer(
    feed: &mut mpsc::Receiver<Update>,
    dispatcher: &Dispatcher,
    options: ConsumerOptions,
    mut shutdown: watch::Receiver<bool>,
) -> Result<ConsumerExit, ConsumerError> {
    tracing::info!(
        target: "consumer",
        channels = dispatcher.registry().channel_ids().len(),
        handlers = dispatcher.registry().len(),
        read_timeout = ?options.read_timeout,
        max_timeouts = options.max_timeouts,
        "Consumer loop started"
    );
    let mut timeout_count: u32 = 0;

    loop {
        dispatcher.metrics().refresh_uptime();
        if *shutdown.borrow() {
            return Ok(ConsumerExit::Shutdown);
        }

        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::info!(target: "consumer", "Shutdown requested, leaving consumer loop");
                    return Ok(ConsumerExit::Shutdown);
                }
            }

            msg = feed.recv() => match msg {
                Some(update) => {
                    timeout_count = 0;
                    dispatcher.dispatch(&update);
                }
                None => {
                    tracing::warn!(target: "consumer", "Update feed closed");
                    return Ok(ConsumerExit::FeedClosed);
                }
            },

            _ = time::sleep(options.read_timeout) => {
                timeout_count = timeout_count.saturating_add(1);
                dispatcher.metrics().inc_read_timeouts();
                tracing::warn!(
                    target: "consumer",
                    count = timeout_count,
                    "Timeout {} waiting for subscription messages",
                    timeout_count
                );
                if options.max_timeouts > 0 && timeout_count >= options.max_timeouts {
                    let err = ConsumerError::ConsecutiveTimeoutExceeded {
                        count: timeout_count,
                        timeout: options.read_timeout,
                    };
                    tracing::error!(target: "consumer", error = %err, "Max timeouts exceeded. Quitting.");
                    return Err(err);
                }
            }
        }
    }
}
