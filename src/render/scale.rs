use image::{RgbaImage, imageops::FilterType};

use crate::{
    foundation::{
        core::{FrameRGBA, SPRITESHEET_CELL_SIZE},
        error::{SmtxError, SmtxResult},
    },
    render::composite::GridItem,
    sheet::sprite::AnimatedSprite,
};

/// Resize a frame with nearest-neighbour sampling so pixel art stays crisp.
pub fn scale_frame_nearest(frame: &FrameRGBA, width: u32, height: u32) -> SmtxResult<FrameRGBA> {
    if frame.width == width && frame.height == height {
        return Ok(frame.clone());
    }
    if width == 0 || height == 0 {
        return Err(SmtxError::validation(format!(
            "cannot scale frame to {width}x{height}"
        )));
    }
    let img = RgbaImage::from_raw(frame.width, frame.height, frame.data.clone()).ok_or_else(
        || SmtxError::validation("frame buffer does not match its declared size"),
    )?;
    let scaled = image::imageops::resize(&img, width, height, FilterType::Nearest);
    FrameRGBA::new(width, height, scaled.into_raw())
}

impl GridItem {
    /// Build a grid item from a sprite, scaling each frame to one cell at `scale`.
    pub fn from_animated_sprite(
        x: u32,
        y: u32,
        sprite: &AnimatedSprite,
        scale: u32,
    ) -> SmtxResult<Self> {
        let cell = SPRITESHEET_CELL_SIZE.saturating_mul(scale);
        let frames = sprite
            .frames()
            .iter()
            .map(|s| scale_frame_nearest(&s.frame, cell, cell))
            .collect::<SmtxResult<Vec<_>>>()?;
        Ok(Self { x, y, frames })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scale.rs"]
mod tests;
