// Path: crates/core/src/lib.rs
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

//! # gaugebridge Core
//!
//! Turns a stream of loosely-typed channel updates into gauge values.
//!
//! ## Data flow
//!
//! A [`registry::HandlerRegistry`] is built once from the channel bindings,
//! creating one gauge and one [`handler::Handler`] per binding. The
//! [`consumer::run_consumer`] loop drains the feed and hands each update to
//! the [`dispatcher::Dispatcher`], which counts it in the
//! [`summary::EventSummaryCounter`] and runs every handler bound to the
//! update's channel. Handlers coerce the value ([`coerce`]) or extract one
//! bit of it ([`bits`]) and set their gauge.

/// Single-bit extraction from integer scalars.
pub mod bits;
/// Scalar to `f64` conversion.
pub mod coerce;
/// The feed-draining loop with read-timeout budget.
pub mod consumer;
/// Per-update routing to bound handlers.
pub mod dispatcher;
/// Newline-delimited JSON update feed.
pub mod feed;
/// Plain-value and bit-vector handlers.
pub mod handler;
/// Channel id to handler lookup.
pub mod registry;
/// Periodic per-channel event volume summary.
pub mod summary;

pub use consumer::{run_consumer, ConsumerExit, ConsumerOptions};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use handler::Handler;
pub use registry::{HandlerRecord, HandlerRegistry};
pub use summary::EventSummaryCounter;
