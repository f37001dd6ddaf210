// Path: crates/core/src/summary.rs
//! Periodic, lock-protected summary of update volume per channel.
//!
//! Logging every update is too noisy for a busy feed, so the dispatcher only
//! counts them here and a timer task logs the totals once per interval, then
//! clears them. The counts are for operational visibility only.

use gaugebridge_types::error::SummaryError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Lifecycle of the counter's timer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryPhase {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug)]
struct SummaryState {
    counts: HashMap<String, u64>,
    total: u64,
    phase: SummaryPhase,
}

/// Counts per channel and in total, as of one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarySnapshot {
    pub counts: HashMap<String, u64>,
    pub total: u64,
    pub interval: Duration,
}

impl SummarySnapshot {
    pub fn distinct_channels(&self) -> usize {
        self.counts.len()
    }

    /// Events per second for `channel` over the interval.
    pub fn rate(&self, channel: &str) -> Option<f64> {
        let count = *self.counts.get(channel)?;
        let secs = self.interval.as_secs_f64();
        (secs > 0.0).then(|| count as f64 / secs)
    }
}

/// Thread-safe per-channel event counter that logs and resets itself every interval.
#[derive(Debug)]
pub struct EventSummaryCounter {
    interval: Duration,
    state: Mutex<SummaryState>,
}

impl EventSummaryCounter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: Mutex::new(SummaryState {
                counts: HashMap::new(),
                total: 0,
                phase: SummaryPhase::Idle,
            }),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn phase(&self) -> SummaryPhase {
        self.state.lock().phase
    }

    /// Adds one to the counter for `channel` and to the total.
    pub fn inc(&self, channel: &str) {
        let mut state = self.state.lock();
        match state.counts.get_mut(channel) {
            Some(count) => *count += 1,
            None => {
                state.counts.insert(channel.to_string(), 1);
            }
        }
        state.total += 1;
    }

    /// Clears all counts and the total.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.counts = HashMap::new();
        state.total = 0;
    }

    pub fn snapshot(&self) -> SummarySnapshot {
        let state = self.state.lock();
        SummarySnapshot {
            counts: state.counts.clone(),
            total: state.total,
            interval: self.interval,
        }
    }

    /// Takes the current counts and resets them under a single lock acquisition.
    pub fn take(&self) -> SummarySnapshot {
        let mut state = self.state.lock();
        let snapshot = SummarySnapshot {
            counts: std::mem::take(&mut state.counts),
            total: state.total,
            interval: self.interval,
        };
        state.total = 0;
        snapshot
    }

    /// Spawns the timer task. It runs until `shutdown` becomes `true` or its sender is dropped.
    pub fn start(
        self: &Arc<Self>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<JoinHandle<()>, SummaryError> {
        {
            let mut state = self.state.lock();
            if state.phase != SummaryPhase::Idle {
                return Err(SummaryError::AlreadyStarted);
            }
            state.phase = SummaryPhase::Running;
        }
        let counter = Arc::clone(self);
        Ok(tokio::spawn(async move { counter.run(shutdown).await }))
    }

    async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(target: "summary", interval = ?self.interval, "Starting summary timer");
        self.reset();

        if self.interval.is_zero() {
            tracing::info!(target: "summary", "Summary timer disabled (interval=0).");
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        } else {
            let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            while !*shutdown.borrow() {
                tokio::select! {
                    _ = ticker.tick() => {
                        log_summary(&self.take());
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }

        self.state.lock().phase = SummaryPhase::Stopped;
        tracing::info!(target: "summary", "Exiting summary printing loop");
    }
}

fn log_summary(snapshot: &SummarySnapshot) {
    tracing::info!(
        target: "summary",
        total = snapshot.total,
        channels = snapshot.distinct_channels(),
        interval = ?snapshot.interval,
        "Received {} events on {} channels in the last {:?}",
        snapshot.total,
        snapshot.distinct_channels(),
        snapshot.interval
    );
    let mut channels: Vec<_> = snapshot.counts.iter().collect();
    channels.sort();
    for (channel, count) in channels {
        let rate = snapshot.rate(channel).unwrap_or_default();
        tracing::info!(
            target: "summary",
            channel = %channel,
            events = count,
            "CHANNEL: {}\tEVENTS: {} ({:.3} per second)",
            channel,
            count,
            rate
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_summary() {
        let duration = Duration::from_millis(4);
        let esc = EventSummaryCounter::new(duration);
        esc.inc("foo");
        esc.inc("foo");
        esc.inc("foo");
        esc.inc("bar");

        let snap = esc.snapshot();
        assert_eq!(snap.counts["foo"], 3);
        assert_eq!(snap.counts["bar"], 1);
        assert_eq!(snap.total, 4);
        assert_eq!(esc.interval(), duration);
        assert_eq!(snap.rate("foo"), Some(750.0));
        assert_eq!(snap.rate("missing"), None);

        esc.reset();
        let snap = esc.snapshot();
        assert!(snap.counts.is_empty());
        assert_eq!(snap.total, 0);
    }

    #[test]
    fn test_take_resets() {
        let esc = EventSummaryCounter::new(Duration::from_secs(1));
        esc.inc("a");
        esc.inc("b");
        let taken = esc.take();
        assert_eq!(taken.total, 2);
        assert_eq!(taken.distinct_channels(), 2);
        assert_eq!(esc.snapshot().total, 0);
        assert!(esc.snapshot().counts.is_empty());
    }

    #[test]
    fn test_total_matches_sum_under_contention() {
        let esc = Arc::new(EventSummaryCounter::new(Duration::from_secs(1)));
        let workers: Vec<_> = (0..8)
            .map(|i| {
                let esc = Arc::clone(&esc);
                std::thread::spawn(move || {
                    for n in 0..1000 {
                        esc.inc(&format!("chan-{}", (i + n) % 5));
                        if n % 250 == 0 && i == 0 {
                            esc.reset();
                        }
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
        let snap = esc.snapshot();
        assert_eq!(snap.total, snap.counts.values().sum::<u64>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_flushes_and_stops() {
        let esc = Arc::new(EventSummaryCounter::new(Duration::from_secs(10)));
        let (tx, rx) = watch::channel(false);
        let handle = esc.start(rx).unwrap();
        assert_eq!(esc.phase(), SummaryPhase::Running);
        assert!(matches!(
            esc.start(tx.subscribe()),
            Err(SummaryError::AlreadyStarted)
        ));

        // Let the task run its startup reset before counting.
        tokio::task::yield_now().await;
        esc.inc("foo");
        esc.inc("foo");
        assert_eq!(esc.snapshot().total, 2);

        time::sleep(Duration::from_secs(11)).await;
        assert_eq!(esc.snapshot().total, 0);

        tx.send(true).unwrap();
        handle.await.unwrap();
        assert_eq!(esc.phase(), SummaryPhase::Stopped);

        // Counting stays safe after the timer is gone.
        esc.inc("late");
        assert_eq!(esc.snapshot().total, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_waits_for_shutdown() {
        let esc = Arc::new(EventSummaryCounter::new(Duration::ZERO));
        let (tx, rx) = watch::channel(false);
        let handle = esc.start(rx).unwrap();
        esc.inc("foo");
        drop(tx);
        handle.await.unwrap();
        assert_eq!(esc.phase(), SummaryPhase::Stopped);
    }
}
