use std::sync::Arc;

use crate::foundation::{
    core::rgba_len,
    error::{SmtxError, SmtxResult},
};

/// Decoded spritesheet bitmap available for pixel sampling.
///
/// Pixels are straight-alpha RGBA8 exactly as stored in the source image: decoding never
/// resamples or smooths, so every sampled byte matches the asset.
#[derive(Clone, Debug)]
pub struct Surface {
    width: u32,
    height: u32,
    rgba8: Arc<Vec<u8>>,
}

impl Surface {
    /// Wrap raw RGBA8 bytes as a surface.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> SmtxResult<Self> {
        if width == 0 || height == 0 {
            return Err(SmtxError::surface_init(format!(
                "surface must have non-zero size, got {width}x{height}"
            )));
        }
        if rgba8.len() != rgba_len(width, height) {
            return Err(SmtxError::surface_init(format!(
                "surface buffer is {} bytes, expected {} for {width}x{height}",
                rgba8.len(),
                rgba_len(width, height)
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8: Arc::new(rgba8),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major straight RGBA8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.rgba8
    }
}

/// Decode an encoded image (PNG, GIF, WebP, ...) into a [`Surface`].
pub async fn decode_surface(bytes: &[u8]) -> SmtxResult<Surface> {
    decode_surface_now(bytes)
}

fn decode_surface_now(bytes: &[u8]) -> SmtxResult<Surface> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| SmtxError::surface_init(format!("decode spritesheet image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    tracing::debug!(width, height, "decoded spritesheet surface");
    Surface::from_rgba8(width, height, rgba.into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/sheet/surface.rs"]
mod tests;
