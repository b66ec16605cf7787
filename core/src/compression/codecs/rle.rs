//! codecs/rle.rs
//! Framed zero-run codec. The payload is a sequence of RLE lines.

use crate::compression::codecs::{read_frame, verify_frame, write_frame};
use crate::compression::rle;
use crate::compression::types::{CodecError, Compressor, Decompressor};
use crate::constants::MAX_LINE_LEN;

#[derive(Debug)]
pub struct RleCompressor {
    line_len: usize,
}

impl RleCompressor {
    pub fn new(line_len: usize) -> Result<Self, CodecError> {
        if line_len == 0 || line_len > MAX_LINE_LEN {
            return Err(CodecError::LineTooLong { len: line_len, max: MAX_LINE_LEN });
        }
        Ok(Self { line_len })
    }
}

impl Default for RleCompressor {
    fn default() -> Self {
        Self { line_len: MAX_LINE_LEN }
    }
}

impl Compressor for RleCompressor {
    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError> {
        let line_len = self.line_len;
        write_frame(input, out, |input, out| {
            for row in input.chunks(line_len) {
                rle::compress_line(row, out)?;
            }
            Ok(())
        })
    }

    fn finish(&mut self, _out: &mut Vec<u8>) -> Result<(), CodecError> {
        // No-op: every frame is finalized independently
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RleDecompressor;

impl RleDecompressor {
    pub fn new() -> Self { Self }
}

impl Decompressor for RleDecompressor {
    fn decompress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError> {
        let frame = read_frame(input)?;

        let mut decoded = Vec::with_capacity(frame.orig_len);
        let mut rest = frame.payload;
        while !rest.is_empty() {
            let line = rle::decompress_line(rest, &mut decoded)?;
            rest = &rest[line.consumed..];
        }

        verify_frame(&frame, &decoded, "rle")?;
        out.extend_from_slice(&decoded);
        Ok(())
    }
}
