//! telemetry/counters.rs
//! Mutable counters used while data flows through a chain.
use serde::{Deserialize, Serialize};

/// Deterministic counters collected for one stage
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounters {
    /// `pull`/`put` calls served by this stage.
    pub calls: u64,
    /// Bytes handed to the stage (put) or returned by its upstream (pull).
    pub bytes_in: u64,
    /// Bytes this stage returned (pull) or had accepted downstream (put).
    pub bytes_out: u64,
    pub flushes: u64,
    /// Cipher blocks or RLE lines produced.
    pub blocks: u64,
    /// Emitted bytes the downstream did not accept.
    pub shortfall: u64,
}

impl StageCounters {
    pub fn record(&mut self, bytes_in: usize, bytes_out: usize) {
        self.calls += 1;
        self.bytes_in += bytes_in as u64;
        self.bytes_out += bytes_out as u64;
    }

    pub fn record_flush(&mut self, bytes_out: usize) {
        self.flushes += 1;
        self.bytes_out += bytes_out as u64;
    }

    pub fn record_blocks(&mut self, n: u64) {
        self.blocks += n;
    }

    pub fn record_shortfall(&mut self, missing: usize) {
        self.shortfall += missing as u64;
    }

    pub fn merge(&mut self, other: &StageCounters) {
        self.calls += other.calls;
        self.bytes_in += other.bytes_in;
        self.bytes_out += other.bytes_out;
        self.flushes += other.flushes;
        self.blocks += other.blocks;
        self.shortfall += other.shortfall;
    }
}
