//! io.rs
//! Terminal stages: where a pull chain gets its bytes and a push chain
//! leaves them.
//!
//! Sources (pull side): `BufferStraw`, `ReaderStraw`, `CacheStraw`.
//! Sinks (push side): `BufferPipe`, `VecPipe`, `WriterPipe`.
//!
//! A `CacheStraw` is not a source by itself; it serves reads out of a block
//! it refills from its upstream through the owning chain.

use std::io::{Read, Write};

use crate::config::ChainConfig;
use crate::constants::DEFAULT_CACHE_SIZE;
use crate::utils::read_full;

/// Serves bytes out of an owned buffer, then reports end of stream.
#[derive(Debug, Clone, Default)]
pub struct BufferStraw {
    data: Vec<u8>,
    index: usize,
}

impl BufferStraw {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into(), index: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.index
    }

    /// Start serving from the beginning again.
    pub fn rewind(&mut self) {
        self.index = 0;
    }

    pub fn produce(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.index..self.index + n]);
        self.index += n;
        n
    }
}

/// Adapts any `std::io::Read` as a chain source.
pub struct ReaderStraw {
    inner: Box<dyn Read + Send>,
}

impl ReaderStraw {
    pub fn new<R: Read + Send + 'static>(reader: R) -> Self {
        Self { inner: Box::new(reader) }
    }

    pub fn from_boxed(inner: Box<dyn Read + Send>) -> Self {
        Self { inner }
    }

    /// Fills `buf` unless the reader hits end of stream first.
    pub fn produce(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        read_full(&mut *self.inner, buf)
    }
}

impl std::fmt::Debug for ReaderStraw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ReaderStraw")
    }
}

/// Block-buffered read-ahead. The chain refills the block with a single
/// upstream pull of `capacity` bytes whenever it runs dry.
#[derive(Debug, Clone)]
pub struct CacheStraw {
    buffer: Vec<u8>,
    index: usize,
    length: usize,
    refills: u64,
}

impl CacheStraw {
    /// `size` is clamped to at least one byte.
    pub fn new(size: usize) -> Self {
        Self { buffer: vec![0u8; size.max(1)], index: 0, length: 0, refills: 0 }
    }

    pub fn from_config(config: &ChainConfig) -> Self {
        Self::new(config.cache_size)
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes cached but not yet handed out.
    pub fn available(&self) -> usize {
        self.length - self.index
    }

    pub fn refills(&self) -> u64 {
        self.refills
    }

    /// Copy cached bytes into `buf`; returns how many were copied.
    pub fn drain(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.available());
        buf[..n].copy_from_slice(&self.buffer[self.index..self.index + n]);
        self.index += n;
        n
    }

    /// Hand out the (empty) block so the chain can pull into it.
    pub(crate) fn take_block(&mut self) -> Vec<u8> {
        self.index = 0;
        self.length = 0;
        std::mem::take(&mut self.buffer)
    }

    /// Return the block with `filled` valid bytes at its front.
    pub(crate) fn refill(&mut self, block: Vec<u8>, filled: usize) {
        self.length = filled.min(block.len());
        self.index = 0;
        self.buffer = block;
        self.refills += 1;
    }
}

impl Default for CacheStraw {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

/// Fixed-capacity sink. Accepts bytes until full and reports only what it stored.
#[derive(Debug, Clone)]
pub struct BufferPipe {
    data: Vec<u8>,
    capacity: usize,
}

impl BufferPipe {
    pub fn new(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity), capacity }
    }

    pub fn consume(&mut self, data: &[u8]) -> usize {
        let n = data.len().min(self.capacity - self.data.len());
        self.data.extend_from_slice(&data[..n]);
        n
    }

    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.data.len() == self.capacity
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

/// Growable sink, never short.
#[derive(Debug, Clone, Default)]
pub struct VecPipe {
    data: Vec<u8>,
}

impl VecPipe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consume(&mut self, data: &[u8]) -> usize {
        self.data.extend_from_slice(data);
        data.len()
    }

    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }
}

/// Adapts any `std::io::Write` as a chain sink.
pub struct WriterPipe {
    inner: Box<dyn Write + Send>,
    written: u64,
}

impl WriterPipe {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self { inner: Box::new(writer), written: 0 }
    }

    pub fn from_boxed(inner: Box<dyn Write + Send>) -> Self {
        Self { inner, written: 0 }
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn consume(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.inner.write_all(data)?;
        self.written += data.len() as u64;
        Ok(data.len())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl std::fmt::Debug for WriterPipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterPipe").field("written", &self.written).finish()
    }
}
