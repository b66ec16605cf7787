//! chain/mod.rs
//! Pull (straw) and push (pipe) chains over one index-based link graph.
//!
//! Both chain kinds are synchronous: `pull`/`put` recurse through the links
//! on the caller's thread. Neither is safe for concurrent access without
//! external synchronization.

pub mod graph;
pub mod straw;
pub mod pipe;

pub use graph::*;
pub use straw::*;
pub use pipe::*;
