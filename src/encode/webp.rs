//! Animated WebP encoding.
//!
//! Frames are encoded one by one as lossless stills, then the image chunks of each still are
//! muxed into a single extended-format container:
//!
//! ```text
//! RIFF <size> WEBP
//!   VP8X  flags=alpha|animation, canvas w-1, h-1
//!   ANIM  background=transparent, loop count
//!   ANMF  x=0 y=0 w-1 h-1 duration no-blend dispose-none <ALPH?> <VP8 |VP8L>
//!   ...
//! ```

use crate::{
    encode::{AnimationEncoder, EncoderSettings, validate_frames},
    foundation::{
        core::FrameRGBA,
        error::{SmtxError, SmtxResult},
    },
};

const VP8X_FLAG_ALPHA: u8 = 0x10;
const VP8X_FLAG_ANIMATION: u8 = 0x02;
const ANMF_FLAG_NO_BLEND: u8 = 0x02;
const MAX_CANVAS_EDGE: u32 = 1 << 24;

/// Still-image codec used per frame.
///
/// `initialize` may be slow or fail (loading a native codec, probing support). The animation
/// encoder calls it lazily and only remembers success, so a failed setup is retried on the next
/// export attempt.
#[allow(async_fn_in_trait)]
pub trait StillCodec {
    /// Prepare the codec for use.
    async fn initialize(&mut self) -> SmtxResult<()>;

    /// Encode one frame as a complete single-image WebP file.
    async fn encode_still(&self, frame: &FrameRGBA) -> SmtxResult<Vec<u8>>;
}

/// Lossless VP8L still codec backed by the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct LosslessStillCodec;

impl LosslessStillCodec {
    fn encode_sync(frame: &FrameRGBA) -> image::ImageResult<Vec<u8>> {
        let mut out = Vec::new();
        image::codecs::webp::WebPEncoder::new_lossless(&mut out).encode(
            &frame.data,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(out)
    }
}

impl StillCodec for LosslessStillCodec {
    async fn initialize(&mut self) -> SmtxResult<()> {
        let probe = FrameRGBA::blank(1, 1);
        let bytes = Self::encode_sync(&probe)
            .map_err(|e| SmtxError::codec_init(format!("webp probe encode failed: {e}")))?;
        if !is_webp_file(&bytes) {
            return Err(SmtxError::codec_init("webp probe produced no RIFF/WEBP file"));
        }
        tracing::debug!("webp still codec ready");
        Ok(())
    }

    async fn encode_still(&self, frame: &FrameRGBA) -> SmtxResult<Vec<u8>> {
        Self::encode_sync(frame).map_err(|e| SmtxError::encoding(format!("webp still: {e}")))
    }
}

/// Animated WebP encoder over a pluggable still codec.
#[derive(Debug, Default)]
pub struct WebPFrameEncoder<C: StillCodec = LosslessStillCodec> {
    codec: C,
    runtime_ready: bool,
    settings: EncoderSettings,
}

impl WebPFrameEncoder<LosslessStillCodec> {
    /// Encoder using the built-in lossless codec.
    pub fn new(settings: EncoderSettings) -> SmtxResult<Self> {
        Self::with_codec(LosslessStillCodec, settings)
    }
}

impl<C: StillCodec> WebPFrameEncoder<C> {
    /// Encoder using a custom still codec.
    pub fn with_codec(codec: C, settings: EncoderSettings) -> SmtxResult<Self> {
        settings.validate()?;
        Ok(Self {
            codec,
            runtime_ready: false,
            settings,
        })
    }

    /// Whether the codec has been initialized successfully.
    pub fn is_runtime_ready(&self) -> bool {
        self.runtime_ready
    }

    /// Initialize the codec once. Failures are not memoized.
    pub async fn ensure_runtime(&mut self) -> SmtxResult<()> {
        if self.runtime_ready {
            return Ok(());
        }
        self.codec.initialize().await.inspect_err(|e| {
            tracing::warn!(error = %e, "webp codec initialization failed");
        })?;
        self.runtime_ready = true;
        Ok(())
    }
}

impl<C: StillCodec> AnimationEncoder for WebPFrameEncoder<C> {
    #[tracing::instrument(skip(self, frames), fields(frames = frames.len()))]
    async fn encode(
        &mut self,
        frames: &[FrameRGBA],
        width: u32,
        height: u32,
    ) -> SmtxResult<Vec<u8>> {
        validate_frames(frames, width, height)?;
        if width > MAX_CANVAS_EDGE || height > MAX_CANVAS_EDGE {
            return Err(SmtxError::encoding(format!(
                "webp canvas is limited to 16777216 per edge, got {width}x{height}"
            )));
        }
        self.ensure_runtime().await?;

        let mut files = Vec::with_capacity(frames.len());
        for frame in frames {
            files.push(self.codec.encode_still(frame).await?);
        }
        let stills = files
            .iter()
            .map(|file| image_chunks(file))
            .collect::<SmtxResult<Vec<_>>>()?;

        let out = mux_animation(&stills, width, height, &self.settings);
        tracing::debug!(bytes = out.len(), "webp encoded");
        Ok(out)
    }
}

/// One RIFF chunk borrowed from an encoded file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RiffChunk<'a> {
    /// Four-character chunk id.
    pub fourcc: [u8; 4],
    /// Chunk payload without padding.
    pub payload: &'a [u8],
}

fn is_webp_file(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP"
}

/// Split a WebP file into its top-level chunks.
pub fn riff_chunks(file: &[u8]) -> SmtxResult<Vec<RiffChunk<'_>>> {
    if !is_webp_file(file) {
        return Err(SmtxError::encoding("still is not a RIFF/WEBP file"));
    }
    let mut chunks = Vec::new();
    let mut rest = &file[12..];
    while !rest.is_empty() {
        if rest.len() < 8 {
            return Err(SmtxError::encoding("truncated webp chunk header"));
        }
        let fourcc = [rest[0], rest[1], rest[2], rest[3]];
        let size = u32::from_le_bytes([rest[4], rest[5], rest[6], rest[7]]) as usize;
        let body = &rest[8..];
        if body.len() < size {
            return Err(SmtxError::encoding(format!(
                "webp chunk {} overruns file",
                String::from_utf8_lossy(&fourcc)
            )));
        }
        chunks.push(RiffChunk {
            fourcc,
            payload: &body[..size],
        });
        let padded = (size + (size & 1)).min(body.len());
        rest = &body[padded..];
    }
    Ok(chunks)
}

// Keep only the chunks that belong inside an ANMF frame.
fn image_chunks(file: &[u8]) -> SmtxResult<Vec<RiffChunk<'_>>> {
    let chunks: Vec<_> = riff_chunks(file)?
        .into_iter()
        .filter(|c| matches!(&c.fourcc, b"ALPH" | b"VP8 " | b"VP8L"))
        .collect();
    if !chunks.iter().any(|c| &c.fourcc != b"ALPH") {
        return Err(SmtxError::encoding("webp still has no image data chunk"));
    }
    Ok(chunks)
}

fn push_u24(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes()[..3]);
}

fn push_chunk(out: &mut Vec<u8>, fourcc: &[u8; 4], payload: &[u8]) {
    out.extend_from_slice(fourcc);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        out.push(0);
    }
}

fn mux_animation(
    stills: &[Vec<RiffChunk<'_>>],
    width: u32,
    height: u32,
    settings: &EncoderSettings,
) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(b"WEBP");

    let mut vp8x = vec![VP8X_FLAG_ALPHA | VP8X_FLAG_ANIMATION, 0, 0, 0];
    push_u24(&mut vp8x, width - 1);
    push_u24(&mut vp8x, height - 1);
    push_chunk(&mut body, b"VP8X", &vp8x);

    let mut anim = vec![0u8, 0, 0, 0];
    anim.extend_from_slice(&settings.loop_count.to_le_bytes());
    push_chunk(&mut body, b"ANIM", &anim);

    for chunks in stills {
        let mut anmf = Vec::new();
        push_u24(&mut anmf, 0);
        push_u24(&mut anmf, 0);
        push_u24(&mut anmf, width - 1);
        push_u24(&mut anmf, height - 1);
        push_u24(&mut anmf, settings.frame_delay_ms);
        anmf.push(ANMF_FLAG_NO_BLEND);
        for chunk in chunks {
            push_chunk(&mut anmf, &chunk.fourcc, chunk.payload);
        }
        push_chunk(&mut body, b"ANMF", &anmf);
    }

    let mut out = Vec::with_capacity(body.len() + 8);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/encode/webp.rs"]
mod tests;
