//! crypto/mod.rs
//! Accumulators, digests and the block cipher stage.
//!
//! Primitives are pluggable:
//! - `HashPrimitive`: feed bytes, read a fixed-length digest on demand.
//! - `BlockCipherEngine`: encrypt/decrypt one fixed-size block in place.

pub mod types;
pub mod accumulator;
pub mod crc32;
pub mod digest;
pub mod engine;
pub mod block;

pub use types::*;
pub use accumulator::*;
pub use digest::*;
pub use engine::*;
pub use block::*;
