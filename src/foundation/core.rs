use crate::foundation::error::{SmtxError, SmtxResult};

/// Number of animation frames every sprite carries.
pub const FRAME_COUNT: usize = 3;

/// Edge length of one spritesheet cell (and of one word-grid cell at scale 1), in pixels.
pub const SPRITESHEET_CELL_SIZE: u32 = 24;

/// Display duration of one animation frame.
pub const FRAME_DURATION_MS: u32 = 225;

/// Natural size of the bundled main spritesheet.
pub const MAIN_SPRITESHEET_WIDTH: u32 = 648;
/// Natural size of the bundled main spritesheet.
pub const MAIN_SPRITESHEET_HEIGHT: u32 = 216;
/// Natural size of the bundled object spritesheet.
pub const OBJECT_SPRITESHEET_WIDTH: u32 = 144;
/// Natural size of the bundled object spritesheet.
pub const OBJECT_SPRITESHEET_HEIGHT: u32 = 144;

/// Smallest accepted export scale.
pub const MIN_EXPORT_SCALE: u32 = 1;
/// Largest accepted export scale.
pub const MAX_EXPORT_SCALE: u32 = 5;

/// Two-axis size, used both for grid cell counts and for pixel dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GridDims {
    /// Horizontal extent.
    pub x: u32,
    /// Vertical extent.
    pub y: u32,
}

impl GridDims {
    /// Build a [`GridDims`] value.
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Multiply both axes by `factor`.
    pub fn scaled(self, factor: u32) -> Self {
        Self {
            x: self.x.saturating_mul(factor),
            y: self.y.saturating_mul(factor),
        }
    }
}

/// A frame as straight-alpha RGBA8 pixels.
///
/// Bytes are never premultiplied: they match the source spritesheet exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Wrap raw RGBA8 bytes, checking that the buffer matches `width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> SmtxResult<Self> {
        let frame = Self {
            width,
            height,
            data,
        };
        frame.validate()?;
        Ok(frame)
    }

    /// Fully transparent frame.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; rgba_len(width, height)],
        }
    }

    /// Check the buffer length against the declared size.
    pub fn validate(&self) -> SmtxResult<()> {
        if self.data.len() != rgba_len(self.width, self.height) {
            return Err(SmtxError::validation(format!(
                "frame data is {} bytes, expected {} for {}x{} rgba8",
                self.data.len(),
                rgba_len(self.width, self.height),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// Whether the frame has no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// RGBA value at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Byte length of a tightly packed RGBA8 buffer.
pub fn rgba_len(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize) * 4
}

/// Advance an animation frame index, wrapping after the last frame.
pub fn next_frame_index(index: usize) -> usize {
    let next = index + 1;
    if next >= FRAME_COUNT { 0 } else { next }
}

/// Clamp a requested export scale into `[MIN_EXPORT_SCALE, MAX_EXPORT_SCALE]`.
pub fn clamp_scale(scale: u32) -> u32 {
    scale.clamp(MIN_EXPORT_SCALE, MAX_EXPORT_SCALE)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
