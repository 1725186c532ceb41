//! Default values for refinement settings which are shared between the command-line and library
//! interfaces
//!

pub const FLANK_QUALITY: f64 = 0.95;
pub const MIN_FLANK_SIZE: u32 = 13;
pub const MIN_CLIP_QUALITY: u8 = 20;
pub const MAX_CONSENSUS_INDEL_SIZE: u32 = 5;
pub const MIN_SV_GAP_SIZE: u32 = 15;
pub const MAX_CONSENSUS_SIZE: usize = 50_000;
pub const SOFT_CLIP_WINDOW: i64 = 50;
