//! codecs/raw.rs
//! Pass-through codec.

use crate::compression::codecs::{read_frame, verify_frame, write_frame};
use crate::compression::types::{CodecError, Compressor, Decompressor};

#[derive(Debug, Default)]
pub struct RawCompressor;
#[derive(Debug, Default)]
pub struct RawDecompressor;

impl RawCompressor {
    pub fn new() -> Self { Self }
}
impl RawDecompressor {
    pub fn new() -> Self { Self }
}

impl Compressor for RawCompressor {
    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError> {
        write_frame(input, out, |input, out| {
            out.extend_from_slice(input);
            Ok(())
        })
    }

    fn finish(&mut self, _out: &mut Vec<u8>) -> Result<(), CodecError> {
        Ok(())
    }
}

impl Decompressor for RawDecompressor {
    fn decompress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError> {
        let frame = read_frame(input)?;
        verify_frame(&frame, frame.payload, "raw")?;
        out.extend_from_slice(frame.payload);
        Ok(())
    }
}
