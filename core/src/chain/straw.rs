//! chain/straw.rs
//! Pull chains. A consumer calls `pull` on the head; each stage pulls from
//! its upstream first and then observes or transforms what came back.
//!
//! Result counts are short only at end of stream. A stage with no upstream
//! that is not a source returns 0.

use crate::chain::graph::{Chain, ChainError, StageId, StageKind};
use crate::config::ChainConfig;
use crate::crypto::{CrcAccumulator, DigestStage};
use crate::encoding::{Base64Mode, Base64Straw};
use crate::io::{BufferStraw, CacheStraw, ReaderStraw};
use crate::types::PipelineError;

#[derive(Debug)]
pub enum StrawStage {
    /// Forwards the upstream result unchanged.
    Pass,
    Buffer(BufferStraw),
    Reader(ReaderStraw),
    Cache(CacheStraw),
    Crc(CrcAccumulator),
    Digest(DigestStage),
    Base64(Base64Straw),
}

impl StageKind for StrawStage {
    fn kind(&self) -> &'static str {
        match self {
            StrawStage::Pass => "pass",
            StrawStage::Buffer(_) => "buffer",
            StrawStage::Reader(_) => "reader",
            StrawStage::Cache(_) => "cache",
            StrawStage::Crc(_) => "crc",
            StrawStage::Digest(_) => "digest",
            StrawStage::Base64(_) => "base64",
        }
    }
}

impl StrawStage {
    fn is_source(&self) -> bool {
        matches!(self, StrawStage::Buffer(_) | StrawStage::Reader(_))
    }
}

#[derive(Debug, Default)]
pub struct StrawChain {
    chain: Chain<StrawStage>,
}

impl StrawChain {
    pub fn new(config: ChainConfig) -> Self {
        Self { chain: Chain::new(config) }
    }

    pub fn add(&mut self, stage: StrawStage) -> StageId {
        self.chain.add(stage)
    }

    /// Cache stage sized from the chain config.
    pub fn add_cache(&mut self) -> StageId {
        let cache = CacheStraw::from_config(self.chain.config());
        self.chain.add(StrawStage::Cache(cache))
    }

    pub fn add_base64(&mut self, mode: Base64Mode) -> StageId {
        self.chain.add(StrawStage::Base64(Base64Straw::new(mode)))
    }

    pub fn graph(&self) -> &Chain<StrawStage> {
        &self.chain
    }

    pub fn stage(&self, id: StageId) -> Result<&StrawStage, ChainError> {
        self.chain.stage(id)
    }

    pub fn stage_mut(&mut self, id: StageId) -> Result<&mut StrawStage, ChainError> {
        self.chain.stage_mut(id)
    }

    pub fn upstream(&self, id: StageId) -> Result<Option<StageId>, ChainError> {
        self.chain.next(id)
    }

    /// Make `upstream` the source `id` pulls from (`None` detaches).
    /// Returns the upstream it replaced.
    pub fn attach_upstream(
        &mut self,
        id: StageId,
        upstream: Option<StageId>,
    ) -> Result<Option<StageId>, ChainError> {
        match upstream {
            Some(up) => self.chain.link(id, up),
            None => self.chain.unlink(id),
        }
    }

    pub fn remove(&mut self, id: StageId) -> Result<StrawStage, ChainError> {
        self.chain.remove(id)
    }

    /// Fill `buf` from stage `id`. Returns the bytes delivered.
    pub fn pull(&mut self, id: StageId, buf: &mut [u8]) -> Result<usize, PipelineError> {
        let upstream = self.chain.next(id)?;

        let n = if self.chain.stage(id)?.is_source() {
            match self.chain.stage_mut(id)? {
                StrawStage::Buffer(s) => s.produce(buf),
                StrawStage::Reader(s) => s.produce(buf)?,
                _ => 0,
            }
        } else if matches!(self.chain.stage(id)?, StrawStage::Cache(_)) {
            self.pull_cached(id, upstream, buf)?
        } else if matches!(self.chain.stage(id)?, StrawStage::Base64(_)) {
            self.pull_base64(id, upstream, buf)?
        } else {
            let n = match upstream {
                Some(up) => self.pull(up, buf)?,
                None => 0,
            };
            let got = &buf[..n];
            match self.chain.stage_mut(id)? {
                StrawStage::Crc(acc) => {
                    acc.submit_buffer(got);
                }
                StrawStage::Digest(d) => d.observe(got),
                _ => {}
            }
            n
        };

        self.chain.record(id, |c| c.record(n, n));
        Ok(n)
    }

    fn cache_mut(&mut self, id: StageId) -> Result<&mut CacheStraw, ChainError> {
        match self.chain.stage_mut(id)? {
            StrawStage::Cache(c) => Ok(c),
            other => Err(ChainError::WrongStageKind { id, kind: other.kind(), expected: "cache" }),
        }
    }

    fn pull_cached(
        &mut self,
        id: StageId,
        upstream: Option<StageId>,
        buf: &mut [u8],
    ) -> Result<usize, PipelineError> {
        let mut off = self.cache_mut(id)?.drain(buf);

        while off < buf.len() {
            let Some(up) = upstream else { break };

            let mut block = self.cache_mut(id)?.take_block();
            let got = match self.pull(up, &mut block) {
                Ok(got) => got,
                Err(e) => {
                    self.cache_mut(id)?.refill(block, 0);
                    return Err(e);
                }
            };
            log::trace!("cache {id}: refilled {got}/{} bytes", block.len());

            let cache = self.cache_mut(id)?;
            cache.refill(block, got);
            if got == 0 {
                break;
            }
            off += cache.drain(&mut buf[off..]);
        }

        Ok(off)
    }

    fn base64_mut(&mut self, id: StageId) -> Result<&mut Base64Straw, ChainError> {
        match self.chain.stage_mut(id)? {
            StrawStage::Base64(b) => Ok(b),
            other => Err(ChainError::WrongStageKind { id, kind: other.kind(), expected: "base64" }),
        }
    }

    /// Serve converted bytes, pulling whole quanta from upstream as needed.
    /// An empty upstream pull finishes the stream (final padded quantum).
    fn pull_base64(
        &mut self,
        id: StageId,
        upstream: Option<StageId>,
        buf: &mut [u8],
    ) -> Result<usize, PipelineError> {
        let mut off = self.base64_mut(id)?.drain(buf);

        while off < buf.len() {
            let Some(up) = upstream else { break };

            let mut block = vec![0u8; self.base64_mut(id)?.upstream_request(buf.len() - off)];
            let got = self.pull(up, &mut block)?;

            let b = self.base64_mut(id)?;
            b.absorb(&block[..got])?;
            off += b.drain(&mut buf[off..]);
            if got == 0 {
                break;
            }
        }

        Ok(off)
    }

    /// Pull until the chain reports end of stream.
    pub fn read_to_end(&mut self, id: StageId, out: &mut Vec<u8>) -> Result<usize, PipelineError> {
        let mut buf = vec![0u8; self.chain.config().cache_size];
        let mut total = 0;
        loop {
            let n = self.pull(id, &mut buf)?;
            if n == 0 {
                return Ok(total);
            }
            out.extend_from_slice(&buf[..n]);
            total += n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unattached_pass_returns_zero() {
        let mut c = StrawChain::default();
        let head = c.add(StrawStage::Pass);
        let mut buf = [0u8; 4];
        assert_eq!(c.pull(head, &mut buf).unwrap(), 0);
    }

    #[test]
    fn cache_serves_small_reads_from_one_refill() {
        let mut c = StrawChain::new(ChainConfig::new(Some(16), None));
        let src = c.add(StrawStage::Buffer(BufferStraw::new((0u8..40).collect::<Vec<_>>())));
        let cache = c.add_cache();
        c.attach_upstream(cache, Some(src)).unwrap();

        let mut buf = [0u8; 5];
        assert_eq!(c.pull(cache, &mut buf).unwrap(), 5);
        assert_eq!(buf, [0, 1, 2, 3, 4]);
        assert_eq!(c.pull(cache, &mut buf).unwrap(), 5);
        assert_eq!(buf, [5, 6, 7, 8, 9]);
        match c.stage(cache).unwrap() {
            StrawStage::Cache(cs) => assert_eq!(cs.refills(), 1),
            other => panic!("unexpected stage {other:?}"),
        }

        let mut rest = Vec::new();
        c.read_to_end(cache, &mut rest).unwrap();
        assert_eq!(rest, (10u8..40).collect::<Vec<_>>());
    }

    #[test]
    fn base64_straw_pads_at_end_of_stream() {
        let mut c = StrawChain::default();
        let src = c.add(StrawStage::Buffer(BufferStraw::new(&b"hello"[..])));
        let enc = c.add_base64(Base64Mode::Encode);
        c.attach_upstream(enc, Some(src)).unwrap();

        let mut buf = [0u8; 3];
        assert_eq!(c.pull(enc, &mut buf).unwrap(), 3);
        assert_eq!(&buf, b"aGV");

        let mut rest = Vec::new();
        c.read_to_end(enc, &mut rest).unwrap();
        assert_eq!(rest, b"sbG8=");
        match c.stage(enc).unwrap() {
            StrawStage::Base64(b) => assert!(b.is_finished()),
            other => panic!("unexpected stage {other:?}"),
        }
    }
}
