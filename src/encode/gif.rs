//! Animated GIF encoding.
//!
//! Each frame is quantized on its own. Frame 0's palette becomes the global color table and
//! later frames carry local tables; index 0 of every table is transparent.

use std::borrow::Cow;

use crate::{
    encode::{
        AnimationEncoder, EncoderSettings,
        quantize::{MAX_PALETTE_COLORS, apply_palette, quantize},
        validate_frames,
    },
    foundation::{
        core::FrameRGBA,
        error::{SmtxError, SmtxResult},
    },
};

/// Palette-quantizing GIF encoder. Output is byte-identical for identical input.
#[derive(Clone, Debug, Default)]
pub struct GifFrameEncoder {
    settings: EncoderSettings,
}

impl GifFrameEncoder {
    /// Encoder with explicit timing settings.
    pub fn new(settings: EncoderSettings) -> SmtxResult<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Settings in use.
    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }

    /// Encode without suspending. The async trait method delegates here.
    #[tracing::instrument(skip(self, frames), fields(frames = frames.len()))]
    pub fn encode_now(&self, frames: &[FrameRGBA], width: u32, height: u32) -> SmtxResult<Vec<u8>> {
        validate_frames(frames, width, height)?;
        let (w, h) = match (u16::try_from(width), u16::try_from(height)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(SmtxError::encoding(format!(
                    "gif dimensions are limited to 65535, got {width}x{height}"
                )));
            }
        };
        let delay = centiseconds(self.settings.frame_delay_ms);

        let palettes: Vec<_> = frames
            .iter()
            .map(|f| quantize(&f.data, MAX_PALETTE_COLORS))
            .collect();
        let global = palettes[0].rgb_bytes();

        let mut out = Vec::new();
        {
            let mut encoder = ::gif::Encoder::new(&mut out, w, h, &global).map_err(gif_err)?;
            let repeat = match self.settings.loop_count {
                0 => ::gif::Repeat::Infinite,
                n => ::gif::Repeat::Finite(n),
            };
            encoder.set_repeat(repeat).map_err(gif_err)?;

            for (idx, (frame, palette)) in frames.iter().zip(&palettes).enumerate() {
                let indices = apply_palette(&frame.data, palette);
                let gif_frame = ::gif::Frame {
                    width: w,
                    height: h,
                    delay,
                    dispose: ::gif::DisposalMethod::Background,
                    transparent: Some(palette.transparent_index()),
                    palette: (idx > 0).then(|| palette.rgb_bytes()),
                    buffer: Cow::Owned(indices),
                    ..::gif::Frame::default()
                };
                encoder.write_frame(&gif_frame).map_err(gif_err)?;
            }
            // Dropping the encoder writes the trailer.
        }

        tracing::debug!(bytes = out.len(), "gif encoded");
        Ok(out)
    }
}

impl AnimationEncoder for GifFrameEncoder {
    async fn encode(
        &mut self,
        frames: &[FrameRGBA],
        width: u32,
        height: u32,
    ) -> SmtxResult<Vec<u8>> {
        self.encode_now(frames, width, height)
    }
}

/// GIF delays are in hundredths of a second; round to nearest.
fn centiseconds(ms: u32) -> u16 {
    u16::try_from(ms.saturating_add(5) / 10).unwrap_or(u16::MAX)
}

fn gif_err(e: ::gif::EncodingError) -> SmtxError {
    SmtxError::encoding(format!("gif: {e}"))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
