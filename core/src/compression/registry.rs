//! compression/registry.rs
//! Codec registry and factory functions.

use crate::compression::codecs::{raw, rle};
use crate::compression::constants::codec_ids;
use crate::compression::types::{CodecError, CompressionCodec, Compressor, Decompressor};
use crate::constants::MAX_LINE_LEN;
use crate::utils::enum_name_or_hex;

pub struct CodecInfo {
    pub name: &'static str,
    /// Worst-case payload growth factor.
    pub max_expansion: usize,
}

pub fn resolve(codec_id: u16) -> Result<CodecInfo, CodecError> {
    match codec_id {
        x if x == codec_ids::RAW => Ok(CodecInfo { name: "raw", max_expansion: 1 }),
        x if x == codec_ids::RLE => Ok(CodecInfo { name: "rle", max_expansion: 2 }),
        other => Err(CodecError::UnsupportedCodec { raw: other }),
    }
}

pub fn create_compressor(codec_id: u16, line_len: Option<usize>)
    -> Result<Box<dyn Compressor + Send>, CodecError>
{
    log::debug!("registry: compressor for {}", enum_name_or_hex::<CompressionCodec>(codec_id));
    match codec_id {
        x if x == codec_ids::RAW => Ok(Box::new(raw::RawCompressor::new())),
        x if x == codec_ids::RLE => Ok(Box::new(rle::RleCompressor::new(line_len.unwrap_or(MAX_LINE_LEN))?)),
        other => Err(CodecError::UnsupportedCodec { raw: other }),
    }
}

pub fn create_decompressor(codec_id: u16)
    -> Result<Box<dyn Decompressor + Send>, CodecError>
{
    log::debug!("registry: decompressor for {}", enum_name_or_hex::<CompressionCodec>(codec_id));
    match codec_id {
        x if x == codec_ids::RAW => Ok(Box::new(raw::RawDecompressor::new())),
        x if x == codec_ids::RLE => Ok(Box::new(rle::RleDecompressor::new())),
        other => Err(CodecError::UnsupportedCodec { raw: other }),
    }
}
