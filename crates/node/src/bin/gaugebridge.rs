// Path: crates/node/src/bin/gaugebridge.rs
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use gaugebridge_core::feed::{feed_channel, spawn_json_lines_feed, FeedLines, FeedStats};
use gaugebridge_core::{
    run_consumer, ConsumerExit, ConsumerOptions, Dispatcher, EventSummaryCounter, HandlerRegistry,
};
use gaugebridge_telemetry::http::{run_server, MetricsEndpoint};
use gaugebridge_telemetry::prometheus::PrometheusSink;
use gaugebridge_types::error::{ConsumerError, ErrorCode};
use gaugebridge_types::BridgeConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Parser, Debug)]
#[clap(name = "gaugebridge", about = "Exposes channel updates as Prometheus gauges")]
struct BridgeOpts {
    /// Port of the `/metrics` endpoint.
    #[clap(long, env = "GAUGEBRIDGE_PORT", default_value_t = 9686)]
    port: u16,
    /// Prefix prepended to every configured metric name.
    #[clap(long, env = "GAUGEBRIDGE_PROM_PREFIX", default_value = "")]
    prom_prefix: String,
    /// Path to the JSON channel binding file.
    #[clap(long, env = "GAUGEBRIDGE_CONFIG")]
    config: Option<PathBuf>,
    /// Base64-encoded binding document. Overrides `--config`.
    #[clap(long, env = "GAUGEBRIDGE_CONFIG_B64")]
    config_b64: Option<String>,
    /// Update feed: a JSON-lines file, or `-` for stdin.
    #[clap(long, env = "GAUGEBRIDGE_FEED", default_value = "-")]
    feed: String,
    #[clap(long, env = "GAUGEBRIDGE_DEBUG")]
    debug: bool,
    #[clap(long, env = "GAUGEBRIDGE_READ_TIMEOUT_SECS", default_value_t = 5)]
    read_timeout_secs: u64,
    /// Consecutive read timeouts before giving up, 0 to wait forever.
    #[clap(long, env = "GAUGEBRIDGE_MAX_TIMEOUTS", default_value_t = 30)]
    max_timeouts: u32,
    /// Seconds between event summaries, 0 to disable them.
    #[clap(long, env = "GAUGEBRIDGE_SUMMARY_INTERVAL_SECS", default_value_t = 60)]
    summary_interval_secs: u64,
}

async fn open_feed(feed: &str) -> Result<FeedLines> {
    if feed == "-" {
        return FeedLines::stdin().context("starting stdin reader thread");
    }
    let file = tokio::fs::File::open(feed)
        .await
        .with_context(|| format!("opening update feed {feed}"))?;
    Ok(FeedLines::from_reader(BufReader::new(file)))
}

async fn join_task<T>(name: &str, handle: JoinHandle<T>) -> Option<T> {
    match handle.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(target: "gaugebridge", task = name, error = %e, "Task failed to join");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = BridgeOpts::parse();

    // 1. Initialize tracing FIRST
    gaugebridge_telemetry::init::init_tracing(opts.debug)?;
    tracing::info!(
        target: "gaugebridge",
        event = "startup",
        port = opts.port,
        prefix = %opts.prom_prefix,
        feed = %opts.feed
    );

    // 2. Bindings, gauges and handlers
    let config = BridgeConfig::load(opts.config.as_deref(), opts.config_b64.as_deref())
        .map_err(|e| anyhow!("[{}] {e}", e.code()))?;
    let sink = Arc::new(PrometheusSink::install()?);
    let registry = HandlerRegistry::build(&config.bindings, sink.as_ref(), &opts.prom_prefix)
        .map_err(|e| anyhow!("[{}] {e}", e.code()))?;

    // 3. Metrics endpoint, summary timer
    let addr = SocketAddr::from(([0, 0, 0, 0], opts.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding metrics endpoint on {addr}"))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let endpoint = MetricsEndpoint::new(sink.registry().clone());
    let server_handle = tokio::spawn(run_server(listener, endpoint.clone(), shutdown_rx.clone()));

    let summary = Arc::new(EventSummaryCounter::new(Duration::from_secs(
        opts.summary_interval_secs,
    )));
    let summary_handle = summary.start(shutdown_rx.clone())?;

    // 4. Feed
    let (feed_tx, mut feed_rx) = feed_channel();
    let lines = open_feed(&opts.feed).await?;
    let feed_handle = spawn_json_lines_feed(lines, feed_tx, shutdown_rx.clone());

    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(target: "gaugebridge", "Interrupt received, shutting down");
            let _ = ctrl_c_tx.send(true);
        }
    });

    // 5. Consume until shutdown, feed closure or timeout exhaustion
    let dispatcher = Dispatcher::new(registry, summary.clone(), sink.clone());
    endpoint.set_ready(true);
    let options = ConsumerOptions {
        read_timeout: Duration::from_secs(opts.read_timeout_secs),
        max_timeouts: opts.max_timeouts,
    };
    let outcome = run_consumer(&mut feed_rx, &dispatcher, options, shutdown_rx).await;

    endpoint.set_ready(false);
    let _ = shutdown_tx.send(true);
    // Unblocks a feed still waiting to hand over an update.
    drop(feed_rx);

    let feed_result = join_task("feed", feed_handle).await;
    join_task("summary", summary_handle).await;
    join_task("metrics-server", server_handle).await;

    if let Some(Err(e)) = &feed_result {
        tracing::error!(target: "gaugebridge", code = e.code(), error = %e, "Update feed failed");
    }

    match outcome {
        Ok(ConsumerExit::Shutdown) => {
            tracing::info!(target: "gaugebridge", "Shut down cleanly");
            Ok(())
        }
        Ok(ConsumerExit::FeedClosed) => match feed_result {
            Some(Err(ConsumerError::Upstream(reason))) => {
                Err(anyhow!("update feed failed: {reason}"))
            }
            Some(Ok(FeedStats { delivered, dropped })) => {
                tracing::info!(target: "gaugebridge", delivered, dropped, "Update feed ended");
                Ok(())
            }
            _ => Ok(()),
        },
        Err(e) => {
            tracing::error!(target: "gaugebridge", code = e.code(), error = %e, "Consumer stopped");
            Err(e.into())
        }
    }
}
