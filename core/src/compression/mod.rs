//! compression/mod.rs
//! Zero-run RLE for sparse (sprite-style) data.
//!
//! Layers:
//! - `rle`: stateless codec, plain and self-describing "line" forms.
//! - `codecs` + `registry`: framed per-chunk codecs resolved by id.
//! - `stream`: chunked compression over `std::io::Read`.
//! - `stage`: incremental RLE stage for push chains.

pub mod constants;
pub mod types;
pub mod rle;
pub mod codecs;
pub mod registry;
pub mod stream;
pub mod stage;

pub use constants::*;
pub use types::*;
pub use registry::*;
pub use stage::*;
