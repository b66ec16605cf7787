//! crypto/block.rs
//! Block cipher stage (the Blowfish pipe).
//!
//! States: `NO_KEY` (no engine) and `KEYED`. Block buffering behaves the same
//! in both; without a key the blocks are forwarded untransformed.
//!
//! Invariant: `counter < block_len` between calls. A block that fills is
//! transformed and emitted before the call returns.

use log::{debug, warn};

use crate::constants::{BLOWFISH_BLOCK_LEN, MAX_BLOCK_LEN};
use crate::crypto::engine::{blowfish_engine, BlockCipherEngine, EngineFactory};
use crate::crypto::types::{CipherMode, CryptoError};

pub struct BlockCipherStage {
    mode: CipherMode,
    factory: EngineFactory,
    engine: Option<Box<dyn BlockCipherEngine>>,
    block: Vec<u8>,
    counter: usize,
    blocks: u64,
}

impl BlockCipherStage {
    /// Blowfish stage, no key yet.
    pub fn new(mode: CipherMode) -> Self {
        Self::with_factory(mode, BLOWFISH_BLOCK_LEN, blowfish_engine)
    }

    /// Stage for a pluggable engine. `block_len` must be in `1..=MAX_BLOCK_LEN`.
    pub fn with_factory(mode: CipherMode, block_len: usize, factory: EngineFactory) -> Self {
        assert!(
            block_len > 0 && block_len <= MAX_BLOCK_LEN,
            "block length {block_len} out of range"
        );
        Self {
            mode,
            factory,
            engine: None,
            block: vec![0u8; block_len],
            counter: 0,
            blocks: 0,
        }
    }

    /// Key the stage, replacing any previous engine.
    ///
    /// Bytes already buffered are NOT flushed: they are transformed with the
    /// new key when their block completes. Flush first to close a block under
    /// the old key.
    pub fn submit_key(&mut self, key: &[u8]) -> Result<(), CryptoError> {
        let engine = (self.factory)(key)?;
        self.set_engine(engine)
    }

    /// Install an already keyed engine.
    pub fn set_engine(&mut self, engine: Box<dyn BlockCipherEngine>) -> Result<(), CryptoError> {
        if engine.block_len() != self.block.len() {
            return Err(CryptoError::InvalidBlockLen {
                expected: self.block.len(),
                actual: engine.block_len(),
            });
        }
        if self.counter > 0 {
            warn!(
                "re-key of {:?} stage with {} buffered bytes; they will use the new key",
                self.mode, self.counter
            );
        }
        debug!("{:?} stage keyed (replaced={})", self.mode, self.engine.is_some());
        self.engine = Some(engine);
        Ok(())
    }

    /// Drop the engine; the stage becomes pass-through.
    pub fn clear_key(&mut self) {
        self.engine = None;
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    pub fn is_keyed(&self) -> bool {
        self.engine.is_some()
    }

    pub fn block_len(&self) -> usize {
        self.block.len()
    }

    /// Bytes waiting for their block to complete.
    pub fn pending(&self) -> usize {
        self.counter
    }

    pub fn blocks_processed(&self) -> u64 {
        self.blocks
    }

    /// Absorb `data`, appending every completed (transformed) block to `out`.
    /// Returns the number of input bytes consumed, always `data.len()`.
    pub fn process(&mut self, data: &[u8], out: &mut Vec<u8>) -> usize {
        let block_len = self.block.len();
        let mut input = data;

        if self.counter > 0 {
            let take = (block_len - self.counter).min(input.len());
            self.block[self.counter..self.counter + take].copy_from_slice(&input[..take]);
            self.counter += take;
            input = &input[take..];

            if self.counter == block_len {
                self.emit_block(out);
            }
        }

        let mut chunks = input.chunks_exact(block_len);
        for chunk in &mut chunks {
            self.block.copy_from_slice(chunk);
            self.emit_block(out);
        }

        let rest = chunks.remainder();
        self.block[..rest.len()].copy_from_slice(rest);
        self.counter = rest.len();

        data.len()
    }

    /// Zero-pad and emit a trailing partial block. Returns bytes appended.
    pub fn finish(&mut self, out: &mut Vec<u8>) -> usize {
        if self.counter == 0 {
            return 0;
        }
        self.block[self.counter..].fill(0);
        self.emit_block(out);
        self.block.len()
    }

    fn emit_block(&mut self, out: &mut Vec<u8>) {
        if let Some(engine) = &self.engine {
            match self.mode {
                CipherMode::Encrypt => engine.encrypt_block(&mut self.block),
                CipherMode::Decrypt => engine.decrypt_block(&mut self.block),
            }
        }
        out.extend_from_slice(&self.block);
        self.counter = 0;
        self.blocks += 1;
    }
}

impl std::fmt::Debug for BlockCipherStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockCipherStage")
            .field("mode", &self.mode)
            .field("keyed", &self.is_keyed())
            .field("block_len", &self.block.len())
            .field("pending", &self.counter)
            .finish()
    }
}
