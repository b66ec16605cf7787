//! compression/types.rs
//! Codec ids, errors and the per-chunk codec traits.
use std::io;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compression::constants::codec_ids;

#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive)]
pub enum CompressionCodec {
    Raw = codec_ids::RAW,
    Rle = codec_ids::RLE,
}

impl CompressionCodec {
    pub fn verify(raw: u16) -> Result<Self, CodecError> {
        Self::try_from_primitive(raw).map_err(|_| CodecError::UnsupportedCodec { raw })
    }
}

/// Direction of an RLE stage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodecMode {
    Compress,
    Decompress,
}

#[derive(Debug, Error)]
pub enum CodecError {
    /// Input ended in the middle of a marker pair, header or line.
    #[error("truncated input at offset {offset}")]
    Truncated { offset: usize },

    /// `0x00 0x00` never comes out of the encoder.
    #[error("zero-length run at offset {offset}")]
    ZeroRun { offset: usize },

    #[error("output too small: need {need}, have {have}")]
    OutputTooSmall { need: usize, have: usize },

    #[error("line too long: {len} > {max}")]
    LineTooLong { len: usize, max: usize },

    #[error("length mismatch: expected {expected}, actual {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("frame payload too large: {len} > {max}")]
    FrameTooLarge { len: usize, max: usize },

    #[error("checksum mismatch ({codec}): expected 0x{expected:08x}, actual 0x{actual:08x}")]
    ChecksumMismatch { codec: &'static str, expected: u32, actual: u32 },

    #[error("unsupported compression codec: 0x{raw:04x}")]
    UnsupportedCodec { raw: u16 },

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

// Require Send so trait objects can cross thread boundaries.
pub trait Compressor: Send {
    /// Compress a single chunk into out buffer.
    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError>;
    /// Flush any pending state.
    fn finish(&mut self, out: &mut Vec<u8>) -> Result<(), CodecError>;
}

pub trait Decompressor: Send {
    /// Decompress a single framed chunk into out buffer.
    fn decompress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError>;
}
