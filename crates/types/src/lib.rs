// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo
    )
)]

//! # gaugebridge Types
//!
//! Foundational data structures shared by every gaugebridge crate: the closed
//! `Scalar` union carried by feed updates, the `Update` event itself, channel
//! binding configuration, and the error taxonomy.
//!
//! ## Architectural Role
//!
//! This crate has no knowledge of metrics backends or async runtimes. The
//! telemetry, core and node crates all depend on it, which keeps the
//! canonical definitions of `Scalar`, `ChannelBinding` and the error enums in
//! one place.

/// Channel binding configuration and its loaders.
pub mod config;
/// A unified set of all error types used across the bridge.
pub mod error;
/// The closed set of scalar kinds a feed may deliver.
pub mod scalar;
/// The ephemeral update event delivered by an upstream feed.
pub mod update;

pub use config::{BridgeConfig, ChannelBinding};
pub use scalar::{Scalar, ScalarKind};
pub use update::Update;
