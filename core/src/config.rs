//! config.rs
//! Chain-wide tunables.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CACHE_SIZE, MAX_CHUNK_SIZE, MAX_LINE_LEN};
use crate::types::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Read-ahead block size of `CacheStraw::from_config`; also the pull
    /// size of `StrawChain::read_to_end`.
    pub cache_size: usize,

    /// Max decoded bytes per line emitted by RLE compress stages.
    pub rle_line_len: usize,

    /// Whether per-stage counters are collected.
    /// - `true` (default) → counters visible in `Chain::snapshot`.
    /// - `false` → counters stay at zero.
    pub telemetry: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            rle_line_len: MAX_LINE_LEN,
            telemetry: true,
        }
    }
}

impl ChainConfig {
    pub fn new(cache_size: Option<usize>, rle_line_len: Option<usize>) -> Self {
        Self {
            cache_size: cache_size.unwrap_or(DEFAULT_CACHE_SIZE),
            rle_line_len: rle_line_len.unwrap_or(MAX_LINE_LEN),
            telemetry: true,
        }
    }

    pub fn without_telemetry() -> Self {
        Self { telemetry: false, ..Self::default() }
    }

    /// Parse from JSON; missing fields fall back to defaults.
    pub fn from_json(raw: &str) -> Result<Self, PipelineError> {
        let config: ChainConfig =
            serde_json::from_str(raw).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.cache_size == 0 || self.cache_size > MAX_CHUNK_SIZE {
            return Err(PipelineError::Config(format!(
                "cache_size must be in 1..={MAX_CHUNK_SIZE}, got {}",
                self.cache_size
            )));
        }
        if self.rle_line_len == 0 || self.rle_line_len > MAX_LINE_LEN {
            return Err(PipelineError::Config(format!(
                "rle_line_len must be in 1..={MAX_LINE_LEN}, got {}",
                self.rle_line_len
            )));
        }
        Ok(())
    }
}
