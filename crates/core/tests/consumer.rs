// Path: crates/core/tests/consumer.rs
mod common;

use common::harness;
use gaugebridge_core::feed::feed_channel;
use gaugebridge_core::{run_consumer, ConsumerExit, ConsumerOptions};
use gaugebridge_types::error::ConsumerError;
use gaugebridge_types::{ChannelBinding, Scalar, Update};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time;

fn options(max_timeouts: u32) -> ConsumerOptions {
    ConsumerOptions {
        read_timeout: Duration::from_secs(5),
        max_timeouts,
    }
}

#[tokio::test(start_paused = true)]
async fn test_consecutive_timeouts_are_fatal() {
    let h = harness(&[ChannelBinding::new("a", "a_value")]);
    let (_tx, mut rx) = feed_channel();
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let err = run_consumer(&mut rx, &h.dispatcher, options(3), shutdown_rx)
        .await
        .unwrap_err();
    match err {
        ConsumerError::ConsecutiveTimeoutExceeded { count, timeout } => {
            assert_eq!(count, 3);
            assert_eq!(timeout, Duration::from_secs(5));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_update_resets_timeout_budget() {
    let h = harness(&[ChannelBinding::new("a", "a_value")]);
    let (tx, mut rx) = feed_channel();
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    // Two timeouts, one update, two more timeouts, then close: never three in a row.
    let producer = tokio::spawn(async move {
        time::sleep(Duration::from_secs(12)).await;
        tx.send(Update::value("a", Scalar::Int32(9))).await.unwrap();
        time::sleep(Duration::from_secs(12)).await;
        drop(tx);
    });

    let exit = run_consumer(&mut rx, &h.dispatcher, options(3), shutdown_rx)
        .await
        .unwrap();
    assert_eq!(exit, ConsumerExit::FeedClosed);
    assert_eq!(h.factory.values("a_value"), vec![9.0]);
    producer.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_zero_budget_never_gives_up() {
    let h = harness(&[ChannelBinding::new("a", "a_value")]);
    let (_tx, mut rx) = feed_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        time::sleep(Duration::from_secs(3600)).await;
        shutdown_tx.send(true).unwrap();
    });

    let exit = run_consumer(&mut rx, &h.dispatcher, options(0), shutdown_rx)
        .await
        .unwrap();
    assert_eq!(exit, ConsumerExit::Shutdown);
}

#[tokio::test]
async fn test_drains_in_feed_order_until_closed() {
    let h = harness(&[
        ChannelBinding::new("a", "a_value"),
        ChannelBinding::new("b", "b_flag").with_extract_bit(1),
    ]);
    let (tx, mut rx) = feed_channel();
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    tx.send(Update::value("a", Scalar::Int64(1))).await.unwrap();
    tx.send(Update::value("b", Scalar::UInt8(0b10))).await.unwrap();
    tx.send(Update::error("b", "Bad")).await.unwrap();
    tx.send(Update::value("a", Scalar::Int64(2))).await.unwrap();
    drop(tx);

    let exit = run_consumer(&mut rx, &h.dispatcher, ConsumerOptions::default(), shutdown_rx)
        .await
        .unwrap();
    assert_eq!(exit, ConsumerExit::FeedClosed);
    assert_eq!(h.factory.values("a_value"), vec![1.0, 2.0]);
    assert_eq!(h.factory.values("b_flag"), vec![1.0]);
    assert_eq!(h.summary.snapshot().total, 4);
}

#[tokio::test]
async fn test_raised_shutdown_exits_before_reading() {
    let h = harness(&[ChannelBinding::new("a", "a_value")]);
    let (tx, mut rx) = feed_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tx.send(Update::value("a", Scalar::Int64(1))).await.unwrap();
    shutdown_tx.send(true).unwrap();

    let exit = run_consumer(&mut rx, &h.dispatcher, ConsumerOptions::default(), shutdown_rx)
        .await
        .unwrap();
    assert_eq!(exit, ConsumerExit::Shutdown);
    assert!(h.factory.values("a_value").is_empty());
}
