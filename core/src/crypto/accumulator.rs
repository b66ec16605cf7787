//! crypto/accumulator.rs
//! Fast non-cryptographic running checksum.
//!
//! Bytes are staged into a 4-byte word. When the word fills it is folded in:
//!
//! ```text
//! acc = rotl(acc, 1) + word      (wrapping, word read little-endian)
//! ```
//!
//! Reading the value with a partially filled word folds a zero-extended copy
//! of it without touching the real accumulator.

use byteorder::{ByteOrder, LittleEndian};

use crate::constants::WORD_LEN;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CrcAccumulator {
    crc: u32,
    staging: [u8; WORD_LEN],
    index: usize,
}

impl CrcAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a caller-provided accumulator value.
    pub fn with_initial(initial: u32) -> Self {
        Self { crc: initial, ..Self::default() }
    }

    /// Stage one byte. Returns the raw accumulator (not the peek-folded value).
    #[inline]
    pub fn submit_byte(&mut self, datum: u8) -> u32 {
        self.staging[self.index] = datum;
        self.index += 1;
        if self.index == WORD_LEN {
            self.fold();
        }
        self.crc
    }

    /// Submit every byte in order and return [`CrcAccumulator::value`].
    pub fn submit_buffer(&mut self, data: &[u8]) -> u32 {
        let mut rest = data;

        // Top up a partial word first so whole words can be folded directly.
        while self.index != 0 && !rest.is_empty() {
            self.submit_byte(rest[0]);
            rest = &rest[1..];
        }

        let mut words = rest.chunks_exact(WORD_LEN);
        for word in &mut words {
            self.crc = self.crc.rotate_left(1).wrapping_add(LittleEndian::read_u32(word));
        }

        for &b in words.remainder() {
            self.submit_byte(b);
        }

        self.value()
    }

    /// Digest value; a partial word is folded into a copy of the accumulator.
    #[inline]
    pub fn value(&self) -> u32 {
        if self.index == 0 {
            self.crc
        } else {
            self.crc.rotate_left(1).wrapping_add(LittleEndian::read_u32(&self.staging))
        }
    }

    /// Bytes currently staged (always < 4).
    pub fn staged(&self) -> usize {
        self.index
    }

    fn fold(&mut self) {
        self.crc = self.value();
        self.staging = [0; WORD_LEN];
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_word_folds_little_endian() {
        let mut acc = CrcAccumulator::new();
        assert_eq!(acc.submit_buffer(&[1, 2, 3, 4]), 0x0403_0201);
        assert_eq!(acc.staged(), 0);
    }

    #[test]
    fn partial_word_is_peek_folded() {
        let mut acc = CrcAccumulator::new();
        acc.submit_buffer(&[1, 2, 3, 4, 5]);
        // rotl(0x04030201, 1) + 5
        assert_eq!(acc.value(), 0x0806_0407);
        assert_eq!(acc.value(), 0x0806_0407);
        assert_eq!(acc.staged(), 1);
    }

    #[test]
    fn submit_byte_returns_raw_accumulator() {
        let mut acc = CrcAccumulator::new();
        for b in [1u8, 2, 3] {
            assert_eq!(acc.submit_byte(b), 0);
        }
        assert_eq!(acc.submit_byte(4), 0x0403_0201);
    }

    #[test]
    fn rotation_wraps_high_bit() {
        let mut acc = CrcAccumulator::with_initial(0x8000_0000);
        assert_eq!(acc.submit_buffer(&[0, 0, 0, 0]), 0x0000_0001);
    }
}
