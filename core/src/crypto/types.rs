use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Direction of a cipher stage, fixed at construction.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive, Serialize, Deserialize)]
pub enum CipherMode {
    Encrypt = 0x01,
    Decrypt = 0x02,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Key material rejected by the engine.
    #[error("invalid key length: expected {min}..={max}, actual={actual}")]
    InvalidKeyLen { min: usize, max: usize, actual: usize },

    /// Engine block size does not match the stage buffer.
    #[error("invalid block length: expected={expected}, actual={actual}")]
    InvalidBlockLen { expected: usize, actual: usize },

    /// Unknown digest algorithm id.
    #[error("unknown digest algorithm: 0x{0:04x}")]
    UnknownAlgorithm(u16),
}
