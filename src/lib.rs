//! smtx turns spritesheets into animated word art.
//!
//! The pipeline is:
//!
//! - Load spritesheets into a [`SpriteRegistry`] (each key cut into three animation frames)
//! - Resolve words to sprites and place them on a grid as [`GridItem`]s
//! - Export the grid with an [`Exporter`] as animated GIF or WebP into a [`PackagingSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Animation encoders.
pub mod encode;
/// Export orchestration and packaging sinks.
pub mod export;
/// Word layout files.
pub mod layout;
/// Spritesheet registry.
pub mod registry;
/// Grid compositing and scaling.
pub mod render;
/// Spritesheet descriptors, surfaces and sprite extraction.
pub mod sheet;

pub use crate::foundation::core::{
    FRAME_COUNT, FRAME_DURATION_MS, FrameRGBA, GridDims, MAIN_SPRITESHEET_HEIGHT,
    MAIN_SPRITESHEET_WIDTH, MAX_EXPORT_SCALE, MIN_EXPORT_SCALE, OBJECT_SPRITESHEET_HEIGHT,
    OBJECT_SPRITESHEET_WIDTH, SPRITESHEET_CELL_SIZE, clamp_scale, next_frame_index, rgba_len,
};
pub use crate::foundation::error::{SmtxError, SmtxResult};

pub use crate::encode::gif::GifFrameEncoder;
pub use crate::encode::webp::{LosslessStillCodec, StillCodec, WebPFrameEncoder};
pub use crate::encode::{AnimationEncoder, EncoderSettings, ExportFormat};
pub use crate::export::pipeline::{
    ExportGeometry, ExportOptions, ExportOutcome, Exporter, MAX_EXPORT_PIXELS, NamingScheme,
    export_word_data, scaled_geometry,
};
pub use crate::export::sink::{DirectorySink, InMemorySink, PackagingSink};
pub use crate::layout::{LayoutCell, WordLayout};
pub use crate::registry::store::{LoadState, ReloadReason, SpriteRegistry};
pub use crate::render::composite::{GridItem, combine_horizontal, composite_frame};
pub use crate::sheet::descriptor::{SpritesheetDescriptor, SpritesheetRegion};
pub use crate::sheet::extract::{cut_spritesheet, extract};
pub use crate::sheet::sprite::{AnimatedSprite, Sprite, Spritesheet, SpritesheetSource};
pub use crate::sheet::surface::{Surface, decode_surface};
