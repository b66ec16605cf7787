/// Stable codec IDs (u16) for registry lookup.
pub mod codec_ids {
    pub const RAW: u16 = 0x0000;
    pub const RLE: u16 = 0x0001;
}

/// Frames larger than this are rejected before allocation.
pub const MAX_FRAME_PAYLOAD: usize = 2 * crate::constants::MAX_CHUNK_SIZE + 2 * 1024;
