//! chain/pipe.rs
//! Push chains. A producer calls `put` on the head; each stage transforms
//! and forwards to its downstream. `flush` forces buffered partial state out
//! and then flushes the downstream.
//!
//! A stage with no downstream is a bit bucket: `put` reports everything
//! accepted. A transform stage whose downstream refuses part of its output
//! reports a short count: the input length less the refused bytes.

use crate::chain::graph::{Chain, ChainError, StageId, StageKind};
use crate::compression::{CodecError, CodecMode, RleStage};
use crate::config::ChainConfig;
use crate::crypto::{BlockCipherStage, CipherMode, CrcAccumulator, DigestStage};
use crate::encoding::{Base64Mode, Base64Stage};
use crate::io::{BufferPipe, VecPipe, WriterPipe};
use crate::types::PipelineError;

#[derive(Debug)]
pub enum PipeStage {
    /// Forwards and returns the downstream's count.
    Pass,
    Buffer(BufferPipe),
    Vec(VecPipe),
    Writer(WriterPipe),
    Crc(CrcAccumulator),
    Digest(DigestStage),
    Cipher(BlockCipherStage),
    Rle(RleStage),
    Base64(Base64Stage),
}

impl StageKind for PipeStage {
    fn kind(&self) -> &'static str {
        match self {
            PipeStage::Pass => "pass",
            PipeStage::Buffer(_) => "buffer",
            PipeStage::Vec(_) => "vec",
            PipeStage::Writer(_) => "writer",
            PipeStage::Crc(_) => "crc",
            PipeStage::Digest(_) => "digest",
            PipeStage::Cipher(_) => "cipher",
            PipeStage::Rle(_) => "rle",
            PipeStage::Base64(_) => "base64",
        }
    }
}

/// What a stage did with the bytes handed to it.
enum Step {
    /// Terminal sink stored this many bytes.
    Stored(usize),
    /// Observed unchanged; pass the same slice on.
    Forward,
    /// Transformed; pass these bytes on. Input was fully consumed. `failed`
    /// is raised after `out` (the output produced before the error) is sent.
    Emit { out: Vec<u8>, blocks: u64, failed: Option<CodecError> },
}

#[derive(Debug, Default)]
pub struct PipeChain {
    chain: Chain<PipeStage>,
}

impl PipeChain {
    pub fn new(config: ChainConfig) -> Self {
        Self { chain: Chain::new(config) }
    }

    pub fn add(&mut self, stage: PipeStage) -> StageId {
        self.chain.add(stage)
    }

    /// RLE stage using the configured line length.
    pub fn add_rle(&mut self, mode: CodecMode) -> Result<StageId, PipelineError> {
        let stage = RleStage::with_line_len(mode, self.chain.config().rle_line_len)?;
        Ok(self.chain.add(PipeStage::Rle(stage)))
    }

    /// Blowfish stage keyed with `key`.
    pub fn add_cipher(&mut self, mode: CipherMode, key: &[u8]) -> Result<StageId, PipelineError> {
        let mut stage = BlockCipherStage::new(mode);
        stage.submit_key(key)?;
        Ok(self.chain.add(PipeStage::Cipher(stage)))
    }

    pub fn add_base64(&mut self, mode: Base64Mode) -> StageId {
        self.chain.add(PipeStage::Base64(Base64Stage::new(mode)))
    }

    pub fn graph(&self) -> &Chain<PipeStage> {
        &self.chain
    }

    pub fn stage(&self, id: StageId) -> Result<&PipeStage, ChainError> {
        self.chain.stage(id)
    }

    pub fn stage_mut(&mut self, id: StageId) -> Result<&mut PipeStage, ChainError> {
        self.chain.stage_mut(id)
    }

    pub fn downstream(&self, id: StageId) -> Result<Option<StageId>, ChainError> {
        self.chain.next(id)
    }

    /// Make `sink` the stage `id` writes to (`None` detaches). A replaced
    /// downstream is flushed before the new one takes over.
    pub fn attach_downstream(
        &mut self,
        id: StageId,
        sink: Option<StageId>,
    ) -> Result<Option<StageId>, PipelineError> {
        if let Some(s) = sink {
            self.chain.check_link(id, s)?;
        }
        if let Some(old) = self.chain.next(id)? {
            if Some(old) != sink {
                self.flush(old)?;
            }
        }
        let replaced = match sink {
            Some(s) => self.chain.link(id, s)?,
            None => self.chain.unlink(id)?,
        };
        Ok(replaced)
    }

    pub fn remove(&mut self, id: StageId) -> Result<PipeStage, ChainError> {
        self.chain.remove(id)
    }

    /// Push `data` into stage `id`. Returns the bytes accepted.
    pub fn put(&mut self, id: StageId, data: &[u8]) -> Result<usize, PipelineError> {
        let downstream = self.chain.next(id)?;

        let step = match self.chain.stage_mut(id)? {
            PipeStage::Buffer(p) => Step::Stored(p.consume(data)),
            PipeStage::Vec(p) => Step::Stored(p.consume(data)),
            PipeStage::Writer(p) => Step::Stored(p.consume(data)?),
            PipeStage::Pass => Step::Forward,
            PipeStage::Crc(acc) => {
                acc.submit_buffer(data);
                Step::Forward
            }
            PipeStage::Digest(d) => {
                d.observe(data);
                Step::Forward
            }
            PipeStage::Cipher(c) => {
                let before = c.blocks_processed();
                let mut out = Vec::with_capacity(data.len() + c.block_len());
                c.process(data, &mut out);
                Step::Emit { out, blocks: c.blocks_processed() - before, failed: None }
            }
            PipeStage::Rle(r) => {
                let before = r.lines();
                let mut out = Vec::new();
                let failed = r.process(data, &mut out).err();
                Step::Emit { out, blocks: r.lines() - before, failed }
            }
            PipeStage::Base64(b) => {
                let mut out = Vec::new();
                let failed = b.process(data, &mut out).err();
                Step::Emit { out, blocks: 0, failed }
            }
        };

        let accepted = match step {
            Step::Stored(n) => {
                self.chain.record(id, |c| c.record(data.len(), n));
                n
            }
            Step::Forward => {
                let n = self.forward(downstream, data)?;
                self.chain.record(id, |c| c.record(data.len(), n));
                n
            }
            Step::Emit { out, blocks, failed } => {
                let sent = self.emit(id, downstream, &out)?;
                self.chain.record(id, |c| {
                    c.record(data.len(), sent);
                    c.record_blocks(blocks);
                });
                if let Some(e) = failed {
                    return Err(e.into());
                }
                data.len().saturating_sub(out.len() - sent)
            }
        };
        Ok(accepted)
    }

    fn forward(&mut self, downstream: Option<StageId>, data: &[u8]) -> Result<usize, PipelineError> {
        match downstream {
            Some(d) if !data.is_empty() => self.put(d, data),
            Some(_) => Ok(0),
            None => Ok(data.len()),
        }
    }

    /// Forward transformed bytes, logging and counting any shortfall.
    fn emit(&mut self, id: StageId, downstream: Option<StageId>, out: &[u8]) -> Result<usize, PipelineError> {
        let sent = self.forward(downstream, out)?;
        if sent < out.len() {
            let missing = out.len() - sent;
            log::warn!("pipe {id}: downstream accepted {sent} of {} bytes", out.len());
            self.chain.record(id, |c| c.record_shortfall(missing));
        }
        Ok(sent)
    }

    /// Emit buffered partial state of `id`, then flush its downstream.
    /// Returns the bytes `id` itself emitted. Flushing twice emits nothing
    /// the second time.
    pub fn flush(&mut self, id: StageId) -> Result<usize, PipelineError> {
        let downstream = self.chain.next(id)?;

        let mut out = Vec::new();
        let mut blocks = 0;
        match self.chain.stage_mut(id)? {
            PipeStage::Cipher(c) => {
                let before = c.blocks_processed();
                c.finish(&mut out);
                blocks = c.blocks_processed() - before;
            }
            PipeStage::Rle(r) => {
                let before = r.lines();
                r.finish(&mut out)?;
                blocks = r.lines() - before;
            }
            PipeStage::Base64(b) => {
                b.finish(&mut out)?;
            }
            PipeStage::Writer(w) => w.flush()?,
            _ => {}
        }

        let sent = if out.is_empty() { 0 } else { self.emit(id, downstream, &out)? };
        if let Some(d) = downstream {
            self.flush(d)?;
        }

        self.chain.record(id, |c| {
            c.record_flush(sent);
            c.record_blocks(blocks);
        });
        Ok(sent)
    }

    /// End of input for this stage.
    pub fn end(&mut self, id: StageId) -> Result<usize, PipelineError> {
        self.flush(id)
    }

    /// `put` the whole of `data` and then `end` the stage.
    pub fn write_all(&mut self, id: StageId, data: &[u8]) -> Result<usize, PipelineError> {
        let n = self.put(id, data)?;
        self.end(id)?;
        Ok(n)
    }
}
