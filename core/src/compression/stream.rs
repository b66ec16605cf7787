//! compression/stream.rs
//! Streaming helpers that respect chunk_size discipline.
use std::io::Read;

use crate::compression::codecs::frame_len;
use crate::compression::types::{CodecError, Compressor, Decompressor};
use crate::constants::{FRAME_PREFIX_LEN, MAX_CHUNK_SIZE};
use crate::utils::read_full;

/// Summary: Compress data read from R in chunk_size blocks, yielding one frame per chunk.
/// - Respects MAX_CHUNK_SIZE sanity.
/// - Calls compressor.finish() after EOF to flush pending state.
/// - Stops after the first error.
pub fn compress_stream<R: Read>(
    mut r: R,
    chunk_size: usize,
    mut compressor: Box<dyn Compressor>
) -> impl Iterator<Item = Result<Vec<u8>, CodecError>> {
    assert!(chunk_size > 0 && chunk_size <= MAX_CHUNK_SIZE);
    let mut buf = vec![0u8; chunk_size];
    let mut done = false;

    std::iter::from_fn(move || {
        if done {
            return None;
        }

        match read_full(&mut r, &mut buf) {
            Ok(0) => {
                // Flush and end stream (once).
                done = true;
                let mut out = Vec::new();
                if let Err(e) = compressor.finish(&mut out) {
                    return Some(Err(e));
                }
                if out.is_empty() { None } else { Some(Ok(out)) }
            }
            Ok(n) => {
                let mut out = Vec::new();
                match compressor.compress_chunk(&buf[..n], &mut out) {
                    Ok(()) => Some(Ok(out)),
                    Err(e) => {
                        done = true;
                        Some(Err(e))
                    }
                }
            }
            Err(e) => {
                done = true;
                Some(Err(CodecError::Io(e)))
            }
        }
    })
}

/// Summary: Decompress frames read from R, yielding one decoded chunk per frame.
/// - Frame boundaries come from the frame prefix, not from read sizes.
/// - A stream ending inside a frame yields `Truncated`.
pub fn decompress_stream<R: Read>(
    mut r: R,
    mut decompressor: Box<dyn Decompressor>
) -> impl Iterator<Item = Result<Vec<u8>, CodecError>> {
    let mut done = false;
    let mut consumed = 0usize;

    std::iter::from_fn(move || {
        if done {
            return None;
        }

        let result = (|| -> Result<Option<Vec<u8>>, CodecError> {
            let mut prefix = [0u8; FRAME_PREFIX_LEN];
            let n = read_full(&mut r, &mut prefix)?;
            if n == 0 {
                return Ok(None);
            }
            if n < FRAME_PREFIX_LEN {
                return Err(CodecError::Truncated { offset: consumed + n });
            }

            let total = frame_len(&prefix)?;
            let mut frame = vec![0u8; total];
            frame[..FRAME_PREFIX_LEN].copy_from_slice(&prefix);
            let body = read_full(&mut r, &mut frame[FRAME_PREFIX_LEN..])?;
            if FRAME_PREFIX_LEN + body < total {
                return Err(CodecError::Truncated { offset: consumed + FRAME_PREFIX_LEN + body });
            }
            consumed += total;

            let mut out = Vec::new();
            decompressor.decompress_chunk(&frame, &mut out)?;
            Ok(Some(out))
        })();

        match result {
            Ok(Some(out)) => Some(Ok(out)),
            Ok(None) => {
                done = true;
                None
            }
            Err(e) => {
                done = true;
                Some(Err(e))
            }
        }
    })
}
