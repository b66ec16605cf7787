//! telemetry/mod.rs
//! Per-stage counters and immutable chain snapshots.
//!
//! Counters live next to each node in the chain and are updated by
//! `pull`/`put`/`flush`. A snapshot copies them out for reporting.

pub mod counters;
pub mod snapshot;

pub use counters::*;
pub use snapshot::*;
