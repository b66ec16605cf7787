//! compression/stage.rs
//! Incremental RLE stage for push chains.
//!
//! Compress: input is cut into lines of `line_len` decoded bytes; the final
//! short line is emitted by `finish`.
//! Decompress: bytes are buffered until a whole line is present, then decoded.
//! A corrupt line desynchronizes the stream: lines decoded before it are
//! kept in `out`, everything still buffered is dropped, and decoding starts
//! over at the next byte handed in.

use crate::compression::rle::{self, LineScanner};
use crate::compression::types::{CodecError, CodecMode};
use crate::constants::MAX_LINE_LEN;

#[derive(Debug)]
pub struct RleStage {
    mode: CodecMode,
    line_len: usize,
    pending: Vec<u8>,
    scanner: LineScanner,
    lines: u64,
}

impl RleStage {
    pub fn new(mode: CodecMode) -> Self {
        Self { mode, line_len: MAX_LINE_LEN, pending: Vec::new(), scanner: LineScanner::new(), lines: 0 }
    }

    pub fn with_line_len(mode: CodecMode, line_len: usize) -> Result<Self, CodecError> {
        if line_len == 0 || line_len > MAX_LINE_LEN {
            return Err(CodecError::LineTooLong { len: line_len, max: MAX_LINE_LEN });
        }
        Ok(Self { mode, line_len, pending: Vec::new(), scanner: LineScanner::new(), lines: 0 })
    }

    pub fn mode(&self) -> CodecMode {
        self.mode
    }

    /// Bytes held back waiting for a full line.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Lines emitted (compress) or decoded (decompress) so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Absorb `data`, appending any completed output to `out`.
    /// Returns input bytes consumed (all of them on success).
    pub fn process(&mut self, data: &[u8], out: &mut Vec<u8>) -> Result<usize, CodecError> {
        self.pending.extend_from_slice(data);

        let result = match self.mode {
            CodecMode::Compress => self.encode_ready(out),
            CodecMode::Decompress => self.decode_ready(out),
        };
        if let Err(e) = result {
            log::warn!("rle stage: dropping {} buffered bytes after {e}", self.pending.len());
            self.pending.clear();
            self.scanner.reset();
            return Err(e);
        }
        Ok(data.len())
    }

    fn encode_ready(&mut self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let mut start = 0;
        let mut result = Ok(());
        while self.pending.len() - start >= self.line_len {
            if let Err(e) = rle::compress_line(&self.pending[start..start + self.line_len], out) {
                result = Err(e);
                break;
            }
            start += self.line_len;
            self.lines += 1;
        }
        self.pending.drain(..start);
        result
    }

    /// Decode every complete line; consumed lines leave `pending` even when
    /// a later one fails.
    fn decode_ready(&mut self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let mut start = 0;
        let result = loop {
            match self.scanner.scan(&self.pending[start..]) {
                Ok(Some(n)) => {
                    if let Err(e) = rle::decompress_line(&self.pending[start..start + n], out) {
                        break Err(e);
                    }
                    start += n;
                    self.lines += 1;
                }
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        self.pending.drain(..start);
        result
    }

    /// Emit the trailing short line (compress). In decompress mode leftover
    /// bytes are an incomplete line and are reported as truncated.
    pub fn finish(&mut self, out: &mut Vec<u8>) -> Result<usize, CodecError> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        let tail = std::mem::take(&mut self.pending);
        self.scanner.reset();

        match self.mode {
            CodecMode::Compress => {
                self.lines += 1;
                rle::compress_line(&tail, out)
            }
            CodecMode::Decompress => Err(CodecError::Truncated { offset: tail.len() }),
        }
    }
}
