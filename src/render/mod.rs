//! Word-grid rendering on the CPU.
//!
//! Frames are straight-alpha RGBA8 and placement overwrites, so no blending happens here.

/// Grid compositing and strip combining.
pub mod composite;
/// Nearest-neighbour scaling and grid item construction.
pub mod scale;
