//! encoding.rs
//! Streaming base64 for both chain kinds.
//!
//! Input arrives in arbitrary pieces, so a partial quantum is carried until
//! the next piece (at most 2 bytes when encoding, 3 symbols when decoding).
//! `finish` emits the padded final quantum. ASCII whitespace is skipped on
//! decode so wrapped text (INI values, PEM-style blocks) decodes as is.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::compression::CodecError;

/// Standard alphabet, padded output; padding optional on input so an
/// unpadded tail still decodes at `finish`.
const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const RAW_QUANTUM: usize = 3;
const TEXT_QUANTUM: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Base64Mode {
    Encode,
    Decode,
}

#[derive(Debug, Clone)]
pub struct Base64Stage {
    mode: Base64Mode,
    carry: Vec<u8>,
}

impl Base64Stage {
    pub fn new(mode: Base64Mode) -> Self {
        Self { mode, carry: Vec::with_capacity(TEXT_QUANTUM) }
    }

    pub fn encoder() -> Self {
        Self::new(Base64Mode::Encode)
    }

    pub fn decoder() -> Self {
        Self::new(Base64Mode::Decode)
    }

    pub fn mode(&self) -> Base64Mode {
        self.mode
    }

    /// Bytes (encode) or symbols (decode) held back for the next quantum.
    pub fn pending(&self) -> usize {
        self.carry.len()
    }

    /// Transform every whole quantum of `carry ++ data` into `out`.
    /// Returns input bytes consumed, always `data.len()` on success.
    pub fn process(&mut self, data: &[u8], out: &mut Vec<u8>) -> Result<usize, CodecError> {
        match self.mode {
            Base64Mode::Encode => self.carry.extend_from_slice(data),
            Base64Mode::Decode => self
                .carry
                .extend(data.iter().copied().filter(|b| !b.is_ascii_whitespace())),
        }

        let quantum = match self.mode {
            Base64Mode::Encode => RAW_QUANTUM,
            Base64Mode::Decode => TEXT_QUANTUM,
        };
        let whole = self.carry.len() - self.carry.len() % quantum;
        if whole == 0 {
            return Ok(data.len());
        }

        let result = self.convert(whole, out);
        self.carry.drain(..whole);
        result.map(|()| data.len())
    }

    /// Emit the final (padded) quantum. Returns bytes appended.
    pub fn finish(&mut self, out: &mut Vec<u8>) -> Result<usize, CodecError> {
        if self.carry.is_empty() {
            return Ok(0);
        }
        let start = out.len();
        let result = self.convert(self.carry.len(), out);
        self.carry.clear();
        result.map(|()| out.len() - start)
    }

    fn convert(&self, len: usize, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let src = &self.carry[..len];
        match self.mode {
            Base64Mode::Encode => {
                out.extend_from_slice(ENGINE.encode(src).as_bytes());
                Ok(())
            }
            Base64Mode::Decode => {
                let start = out.len();
                ENGINE.decode_vec(src, out).map_err(|e| {
                    // decode_vec leaves its scratch space behind on error.
                    out.truncate(start);
                    CodecError::from(e)
                })
            }
        }
    }
}

/// Pull-side wrapper: converted bytes wait in `ready` until the consumer
/// asks for them.
#[derive(Debug, Clone)]
pub struct Base64Straw {
    stage: Base64Stage,
    ready: Vec<u8>,
    index: usize,
    finished: bool,
}

impl Base64Straw {
    pub fn new(mode: Base64Mode) -> Self {
        Self { stage: Base64Stage::new(mode), ready: Vec::new(), index: 0, finished: false }
    }

    pub fn mode(&self) -> Base64Mode {
        self.stage.mode()
    }

    /// Upstream reported end of stream and the final quantum was emitted.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn drain(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.ready.len() - self.index);
        buf[..n].copy_from_slice(&self.ready[self.index..self.index + n]);
        self.index += n;
        if self.index == self.ready.len() {
            self.ready.clear();
            self.index = 0;
        }
        n
    }

    /// Upstream bytes worth pulling to produce about `want` output bytes.
    pub fn upstream_request(&self, want: usize) -> usize {
        match self.stage.mode() {
            Base64Mode::Encode => want.div_ceil(TEXT_QUANTUM).max(1) * RAW_QUANTUM,
            Base64Mode::Decode => want.div_ceil(RAW_QUANTUM).max(1) * TEXT_QUANTUM,
        }
    }

    /// Feed bytes pulled from upstream; an empty slice means end of stream.
    pub fn absorb(&mut self, data: &[u8]) -> Result<(), CodecError> {
        if data.is_empty() {
            self.finished = true;
            self.stage.finish(&mut self.ready)?;
        } else {
            self.stage.process(data, &mut self.ready)?;
        }
        Ok(())
    }
}
