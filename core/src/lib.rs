//! strawpipe-core
//!
//! Composable streaming filter chains.
//! Pull chains (straws) and push chains (pipes) with hashing, block cipher,
//! zero-run RLE and base64 stages.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod config;

// Chains and their stages
pub mod chain;
pub mod io;
pub mod crypto;
pub mod compression;
pub mod encoding;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::chain::{PipeChain, PipeStage, StageId, StrawChain, StrawStage};
    pub use crate::compression::CodecMode;
    pub use crate::config::ChainConfig;
    pub use crate::encoding::{Base64Mode, Base64Stage};
    pub use crate::crypto::{BlockCipherStage, CipherMode, CrcAccumulator, DigestAlg, DigestStage};
    pub use crate::io::{BufferPipe, BufferStraw, CacheStraw, ReaderStraw, VecPipe, WriterPipe};
    pub use crate::types::PipelineError;
}
