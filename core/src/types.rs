use std::io;
use thiserror::Error;

use crate::{
    chain::ChainError,
    compression::CodecError,
    crypto::CryptoError,
};

/// Unified pipeline error covering I/O, chain wiring, crypto, codec and config.
/// - `#[from]` impls enable `?` across stage boundaries.
/// - End of stream is never an error; it shows up as a short count.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// I/O error raised by a reader/writer terminal stage.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Link graph error (unknown stage, self link, cycle).
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    /// Cipher/key error.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Compression/decompression error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Rejected configuration value.
    #[error("config error: {0}")]
    Config(String),
}
