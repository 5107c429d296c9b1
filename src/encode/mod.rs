//! Animation encoders.
//!
//! Both encoders take the same input: an ordered list of equally sized straight-alpha frames.

use crate::foundation::{
    core::{FRAME_DURATION_MS, FrameRGBA, rgba_len},
    error::{SmtxError, SmtxResult},
};

/// Palette-quantized animated GIF encoder.
pub mod gif;
/// Deterministic rgba4444 palette quantizer.
pub mod quantize;
/// Lossless animated WebP encoder and container muxer.
pub mod webp;

/// Animated output formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Palette-quantized animated GIF.
    #[default]
    Gif,
    /// Lossless animated WebP.
    Webp,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    /// MIME type of encoded output.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }
}

/// Timing and looping shared by both encoders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncoderSettings {
    /// Delay between frames in milliseconds.
    pub frame_delay_ms: u32,
    /// Number of loops; `0` loops forever.
    pub loop_count: u16,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            frame_delay_ms: FRAME_DURATION_MS,
            loop_count: 0,
        }
    }
}

impl EncoderSettings {
    /// Reject settings no encoder can represent.
    pub fn validate(&self) -> SmtxResult<()> {
        if self.frame_delay_ms == 0 {
            return Err(SmtxError::validation("frame delay must be non-zero"));
        }
        if self.frame_delay_ms > 0x00FF_FFFF {
            return Err(SmtxError::validation(
                "frame delay must fit in 24 bits (webp frame duration)",
            ));
        }
        Ok(())
    }
}

/// Turns an ordered sequence of same-size frames into one animated image.
///
/// Frames are consumed in slice order; index 0 is the first displayed frame. Implementations
/// may suspend (codec setup, per-frame still encoding), so the operation is always async.
#[allow(async_fn_in_trait)]
pub trait AnimationEncoder {
    /// Encode `frames`, each exactly `width x height`, into one binary buffer.
    async fn encode(
        &mut self,
        frames: &[FrameRGBA],
        width: u32,
        height: u32,
    ) -> SmtxResult<Vec<u8>>;
}

/// Check the encoder input contract: at least one frame, every frame `width x height`.
pub fn validate_frames(frames: &[FrameRGBA], width: u32, height: u32) -> SmtxResult<()> {
    if frames.is_empty() {
        return Err(SmtxError::encoding("no frames to encode"));
    }
    if width == 0 || height == 0 {
        return Err(SmtxError::encoding(format!(
            "output size must be non-zero, got {width}x{height}"
        )));
    }
    for (idx, frame) in frames.iter().enumerate() {
        if frame.width != width || frame.height != height {
            return Err(SmtxError::encoding(format!(
                "frame {idx} size mismatch: got {}x{}, expected {width}x{height}",
                frame.width, frame.height
            )));
        }
        if frame.data.len() != rgba_len(width, height) {
            return Err(SmtxError::encoding(format!(
                "frame {idx} data size mismatch with width*height*4"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/contract.rs"]
mod tests;
