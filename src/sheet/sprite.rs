use std::fmt;

use crate::{
    foundation::core::{FRAME_COUNT, FrameRGBA},
    sheet::descriptor::{SpritesheetDescriptor, SpritesheetRegion},
};

/// Which spritesheet a sprite or region originated from.
///
/// Declaration order is registration order at startup: `Main`, then `ObjectDefault`, then the
/// optional `ObjectUsermade`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum SpritesheetSource {
    /// Letters and property words.
    #[serde(rename = "main")]
    Main,
    /// Bundled object sprites.
    #[serde(rename = "object-default")]
    ObjectDefault,
    /// User-supplied object sprites that may override the bundled ones.
    #[serde(rename = "object-usermade")]
    ObjectUsermade,
}

impl SpritesheetSource {
    /// All source tags in registration order.
    pub const ALL: [SpritesheetSource; 3] = [Self::Main, Self::ObjectDefault, Self::ObjectUsermade];

    /// Stable tag string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::ObjectDefault => "object-default",
            Self::ObjectUsermade => "object-usermade",
        }
    }
}

impl fmt::Display for SpritesheetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted frame: the region it came from plus its sampled pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sprite {
    /// Source rectangle on the spritesheet.
    pub region: SpritesheetRegion,
    /// Pixels sampled from `region`, byte-exact.
    pub frame: FrameRGBA,
}

/// A named three-frame animation bound to the spritesheet it was cut from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimatedSprite {
    key: String,
    source: SpritesheetSource,
    frames: [Sprite; FRAME_COUNT],
}

impl AnimatedSprite {
    /// Build an animated sprite.
    pub fn new(
        key: impl Into<String>,
        source: SpritesheetSource,
        frames: [Sprite; FRAME_COUNT],
    ) -> Self {
        Self {
            key: key.into(),
            source,
            frames,
        }
    }

    /// Sprite key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Spritesheet the frames were cut from.
    pub fn source(&self) -> SpritesheetSource {
        self.source
    }

    /// The three frames in animation order.
    pub fn frames(&self) -> &[Sprite; FRAME_COUNT] {
        &self.frames
    }

    /// Pixels of frame `index` (wrapping modulo [`FRAME_COUNT`]).
    pub fn frame(&self, index: usize) -> &FrameRGBA {
        &self.frames[index % FRAME_COUNT].frame
    }
}

/// Metadata for one loaded spritesheet surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spritesheet {
    /// Decoded width in pixels.
    pub width: u32,
    /// Decoded height in pixels.
    pub height: u32,
    /// Source tag.
    pub source: SpritesheetSource,
    /// Descriptor the sheet was cut with.
    pub descriptor: SpritesheetDescriptor,
}

#[cfg(test)]
#[path = "../../tests/unit/sheet/sprite.rs"]
mod tests;
