use std::{collections::BTreeMap, path::Path};

use anyhow::Context;

use crate::foundation::{
    core::SPRITESHEET_CELL_SIZE,
    error::{SmtxError, SmtxResult},
};

/// Integer pixel rectangle on a spritesheet surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SpritesheetRegion {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels (always > 0).
    pub w: u32,
    /// Height in pixels (always > 0).
    pub h: u32,
}

impl SpritesheetRegion {
    /// Build a region; `w` and `h` must be non-zero.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> SmtxResult<Self> {
        if w == 0 || h == 0 {
            return Err(SmtxError::validation(format!(
                "region at ({x}, {y}) must have non-zero size, got {w}x{h}"
            )));
        }
        Ok(Self { x, y, w, h })
    }

    /// Whether the region lies entirely within a `width x height` surface.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        u64::from(self.x) + u64::from(self.w) <= u64::from(width)
            && u64::from(self.y) + u64::from(self.h) <= u64::from(height)
    }
}

/// Validated spritesheet descriptor: word aliases plus per-key frame regions.
///
/// Produced once at load time by [`SpritesheetDescriptor::from_json_str`]; downstream code never
/// re-checks the shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SpritesheetDescriptor {
    /// Raw word -> canonical object key.
    pub wordmap: BTreeMap<String, String>,
    /// Sprite key -> declared regions in frame order (possibly fewer than three).
    pub regions: BTreeMap<String, Vec<SpritesheetRegion>>,
}

// Loose boundary shape: unknown fields are ignored, coordinates arrive as JSON numbers.
#[derive(serde::Deserialize)]
struct RawDescriptor {
    wordmap: BTreeMap<String, String>,
    regions: BTreeMap<String, Vec<RawRegion>>,
}

#[derive(serde::Deserialize)]
struct RawRegion {
    x: f64,
    y: f64,
    #[serde(default)]
    w: Option<f64>,
    #[serde(default)]
    h: Option<f64>,
}

impl SpritesheetDescriptor {
    /// Parse and validate descriptor JSON.
    pub fn from_json_str(json: &str) -> SmtxResult<Self> {
        let raw: RawDescriptor = serde_json::from_str(json)
            .map_err(|e| SmtxError::serde(format!("spritesheet descriptor: {e}")))?;
        Self::from_raw(raw)
    }

    /// Parse and validate descriptor JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> SmtxResult<Self> {
        let raw: RawDescriptor = serde_json::from_slice(bytes)
            .map_err(|e| SmtxError::serde(format!("spritesheet descriptor: {e}")))?;
        Self::from_raw(raw)
    }

    /// Read, parse and validate a descriptor file.
    pub fn from_path(path: &Path) -> SmtxResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read spritesheet descriptor '{}'", path.display()))?;
        Self::from_json_slice(&bytes)
    }

    fn from_raw(raw: RawDescriptor) -> SmtxResult<Self> {
        let mut regions = BTreeMap::new();
        for (key, entries) in raw.regions {
            let mut out = Vec::with_capacity(entries.len());
            for (idx, entry) in entries.iter().enumerate() {
                out.push(validate_region(&key, idx, entry)?);
            }
            regions.insert(key, out);
        }
        Ok(Self {
            wordmap: raw.wordmap,
            regions,
        })
    }

    /// Declared regions for `key`, if the key exists.
    pub fn declared(&self, key: &str) -> Option<&[SpritesheetRegion]> {
        self.regions.get(key).map(Vec::as_slice)
    }
}

fn validate_region(key: &str, idx: usize, raw: &RawRegion) -> SmtxResult<SpritesheetRegion> {
    let field = |name: &str, v: f64, min: u32| -> SmtxResult<u32> {
        if !v.is_finite() || v.fract() != 0.0 {
            return Err(SmtxError::validation(format!(
                "regions.{key}[{idx}].{name} must be an integer, got {v}"
            )));
        }
        if v < f64::from(min) || v > f64::from(u32::MAX) {
            return Err(SmtxError::validation(format!(
                "regions.{key}[{idx}].{name} must be >= {min}, got {v}"
            )));
        }
        Ok(v as u32)
    };

    let cell = f64::from(SPRITESHEET_CELL_SIZE);
    Ok(SpritesheetRegion {
        x: field("x", raw.x, 0)?,
        y: field("y", raw.y, 0)?,
        w: field("w", raw.w.unwrap_or(cell), 1)?,
        h: field("h", raw.h.unwrap_or(cell), 1)?,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/sheet/descriptor.rs"]
mod tests;
