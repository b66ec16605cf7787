//! crypto/crc32.rs
//! Standard CRC-32 (IEEE, reflected polynomial 0xEDB88320) over `crc32fast`.
//!
//! `crc32fast` keeps its lookup tables in constant data, so they are
//! immutable and shared by every thread without synchronization.

use crc32fast::Hasher;

/// Continue a CRC over `data`. `update(checksum(a), b) == checksum(a ++ b)`.
pub fn update(crc: u32, data: &[u8]) -> u32 {
    let mut hasher = Hasher::new_with_initial(crc);
    hasher.update(data);
    hasher.finalize()
}

pub fn checksum(data: &[u8]) -> u32 {
    update(0, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_value() {
        assert_eq!(checksum(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn update_chains() {
        let whole = checksum(b"hello world");
        let split = update(checksum(b"hello "), b"world");
        assert_eq!(whole, split);
    }

    #[test]
    fn update_continues_across_many_pieces() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let crc = data.chunks(7).fold(0, update);
        assert_eq!(crc, checksum(&data));
    }
}
