//! compression/codecs/mod.rs
//! Framed per-chunk codecs.
//!
//! Every chunk is written as one self-contained frame:
//!
//! ```text
//! [ orig_len: u32 LE ][ payload_len: u32 LE ][ payload ][ crc32(orig): u32 LE ]
//! ```

pub mod raw;
pub mod rle;

pub use raw::*;
pub use rle::*;

use byteorder::{ByteOrder, LittleEndian};

use crate::compression::constants::MAX_FRAME_PAYLOAD;
use crate::compression::types::CodecError;
use crate::constants::{FRAME_CHECKSUM_LEN, FRAME_PREFIX_LEN};
use crate::crypto::crc32;

/// Borrowed view of one decoded frame.
#[derive(Debug)]
pub struct Frame<'a> {
    pub orig_len: usize,
    pub payload: &'a [u8],
    pub checksum: u32,
}

/// Append a frame around whatever `encode` writes as payload.
pub(crate) fn write_frame<F>(input: &[u8], out: &mut Vec<u8>, encode: F) -> Result<(), CodecError>
where
    F: FnOnce(&[u8], &mut Vec<u8>) -> Result<(), CodecError>,
{
    let at = out.len();
    out.extend_from_slice(&[0u8; FRAME_PREFIX_LEN]);
    encode(input, out)?;

    let payload_len = out.len() - at - FRAME_PREFIX_LEN;
    LittleEndian::write_u32(&mut out[at..at + 4], input.len() as u32);
    LittleEndian::write_u32(&mut out[at + 4..at + 8], payload_len as u32);

    let mut checksum = [0u8; FRAME_CHECKSUM_LEN];
    LittleEndian::write_u32(&mut checksum, crc32::checksum(input));
    out.extend_from_slice(&checksum);
    Ok(())
}

/// Total frame length announced by an 8-byte prefix.
pub fn frame_len(prefix: &[u8; FRAME_PREFIX_LEN]) -> Result<usize, CodecError> {
    let payload_len = LittleEndian::read_u32(&prefix[4..8]) as usize;
    if payload_len > MAX_FRAME_PAYLOAD {
        return Err(CodecError::FrameTooLarge { len: payload_len, max: MAX_FRAME_PAYLOAD });
    }
    Ok(FRAME_PREFIX_LEN + payload_len + FRAME_CHECKSUM_LEN)
}

pub fn read_frame(input: &[u8]) -> Result<Frame<'_>, CodecError> {
    if input.len() < FRAME_PREFIX_LEN + FRAME_CHECKSUM_LEN {
        return Err(CodecError::Truncated { offset: input.len() });
    }
    let mut prefix = [0u8; FRAME_PREFIX_LEN];
    prefix.copy_from_slice(&input[..FRAME_PREFIX_LEN]);
    let total = frame_len(&prefix)?;
    if input.len() != total {
        return Err(CodecError::LengthMismatch { expected: total, actual: input.len() });
    }

    Ok(Frame {
        orig_len: LittleEndian::read_u32(&input[0..4]) as usize,
        payload: &input[FRAME_PREFIX_LEN..total - FRAME_CHECKSUM_LEN],
        checksum: LittleEndian::read_u32(&input[total - FRAME_CHECKSUM_LEN..]),
    })
}

/// Check the decoded size and checksum of a frame.
pub(crate) fn verify_frame(frame: &Frame<'_>, decoded: &[u8], codec: &'static str) -> Result<(), CodecError> {
    if decoded.len() != frame.orig_len {
        return Err(CodecError::LengthMismatch { expected: frame.orig_len, actual: decoded.len() });
    }
    let actual = crc32::checksum(decoded);
    if actual != frame.checksum {
        return Err(CodecError::ChecksumMismatch { codec, expected: frame.checksum, actual });
    }
    Ok(())
}
