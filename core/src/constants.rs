/// Block length of the reference cipher (Blowfish), in bytes.
pub const BLOWFISH_BLOCK_LEN: usize = 8;

/// Blowfish accepts keys from 32 to 448 bits.
pub const BLOWFISH_MIN_KEY_LEN: usize = 4;
pub const BLOWFISH_MAX_KEY_LEN: usize = 56;

/// Upper bound for pluggable block ciphers (256-bit blocks).
pub const MAX_BLOCK_LEN: usize = 32;

/// Width of the CRC accumulator word. The staging buffer is read little-endian.
pub const WORD_LEN: usize = 4;

/// Defaults when Option<T> is None
pub const DEFAULT_CACHE_SIZE: usize = 4 * 1024; // 4 KiB read-ahead

/// Largest decoded length a single RLE line can describe (u16 header).
pub const MAX_LINE_LEN: usize = u16::MAX as usize;

/// Run-length grammar: `0x00 <count>` expands to `count` zero bytes.
pub const RLE_MARKER: u8 = 0x00;
pub const RLE_MAX_RUN: usize = u8::MAX as usize;

/// Frame prefix written by the registry codecs:
/// [ orig_len: u32 LE ][ payload_len: u32 LE ]
pub const FRAME_PREFIX_LEN: usize = 8;
/// Trailing CRC-32 of the original bytes.
pub const FRAME_CHECKSUM_LEN: usize = 4;

/// Max chunk size sanity bound (32 MiB).
pub const MAX_CHUNK_SIZE: usize = 32 * 1024 * 1024;
