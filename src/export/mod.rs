//! Export orchestration and packaging.
//!
//! An export run composites or splits the grid, encodes every animation, then hands the blobs
//! to a [`sink::PackagingSink`]: one blob is saved as-is, several are zipped first.

/// Export options, naming and the orchestrator.
pub mod pipeline;
/// Packaging sinks (directory, in-memory) and zip building.
pub mod sink;
