use crate::{
    encode::{
        AnimationEncoder, EncoderSettings, ExportFormat,
        gif::GifFrameEncoder,
        webp::{LosslessStillCodec, StillCodec, WebPFrameEncoder},
    },
    export::sink::PackagingSink,
    foundation::{
        core::{FrameRGBA, GridDims, SPRITESHEET_CELL_SIZE, clamp_scale},
        error::{SmtxError, SmtxResult},
    },
    render::composite::{GridItem, composite_sequence},
};

/// Largest combined canvas, in pixels, an export will composite.
pub const MAX_EXPORT_PIXELS: u64 = 1 << 26;

/// Options for one export run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Output scale, clamped to `1..=5`.
    pub scale: u32,
    /// Output format.
    pub format: ExportFormat,
    /// One animation of the whole grid (`true`) or one animation per word (`false`).
    pub combined_only: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            scale: 1,
            format: ExportFormat::Gif,
            combined_only: true,
        }
    }
}

/// Output filenames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamingScheme {
    /// Stem of a single-file export and of the archive.
    pub combined_stem: String,
    /// Stem of per-word archive entries; the entry index is appended.
    pub entry_stem: String,
}

impl Default for NamingScheme {
    fn default() -> Self {
        Self {
            combined_stem: "sitemaketext-words".to_string(),
            entry_stem: "sitemaketext-word".to_string(),
        }
    }
}

impl NamingScheme {
    /// Filename of a single saved blob.
    pub fn single(&self, format: ExportFormat) -> String {
        format!("{}.{}", self.combined_stem, format.extension())
    }

    /// Filename of archive entry `index`.
    pub fn entry(&self, index: usize, format: ExportFormat) -> String {
        format!("{}-{index}.{}", self.entry_stem, format.extension())
    }

    /// Filename of the archive.
    pub fn archive(&self) -> String {
        format!("{}.zip", self.combined_stem)
    }
}

/// Pixel geometry of an export at a given scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportGeometry {
    /// Scale after clamping.
    pub scale: u32,
    /// Edge of one output cell in pixels.
    pub cell_size: u32,
    /// Size of the whole grid in pixels.
    pub grid_px: GridDims,
}

/// Clamp `scale` and derive cell and grid pixel sizes for a grid of `grid` cells.
pub fn scaled_geometry(grid: GridDims, scale: u32) -> ExportGeometry {
    let scale = clamp_scale(scale);
    let cell_size = SPRITESHEET_CELL_SIZE * scale;
    ExportGeometry {
        scale,
        cell_size,
        grid_px: grid.scaled(cell_size),
    }
}

fn check_canvas(grid: GridDims, geom: ExportGeometry) -> SmtxResult<()> {
    let width = u64::from(grid.x) * u64::from(geom.cell_size);
    let height = u64::from(grid.y) * u64::from(geom.cell_size);
    if width.saturating_mul(height) > MAX_EXPORT_PIXELS {
        return Err(SmtxError::validation(format!(
            "grid of {}x{} cells is {width}x{height} px at scale {}, over the {MAX_EXPORT_PIXELS} px limit",
            grid.x, grid.y, geom.scale
        )));
    }
    Ok(())
}

/// What an export run saved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Exactly one blob, saved as-is.
    Single {
        /// Saved filename.
        filename: String,
    },
    /// Several blobs bundled into one archive.
    Archive {
        /// Saved archive filename.
        filename: String,
        /// Entry names, in grid order.
        entries: Vec<String>,
    },
}

/// Drives compositing, encoding and packaging for word grids.
///
/// Every run creates its own encoders, so runs share no codec state.
#[derive(Clone, Debug)]
pub struct Exporter<C: StillCodec + Clone = LosslessStillCodec> {
    options: ExportOptions,
    settings: EncoderSettings,
    naming: NamingScheme,
    webp_codec: C,
}

impl Exporter<LosslessStillCodec> {
    /// Exporter with default timing, naming and the built-in WebP codec.
    pub fn new(options: ExportOptions) -> SmtxResult<Self> {
        Self::with_codec(options, EncoderSettings::default(), LosslessStillCodec)
    }
}

impl<C: StillCodec + Clone> Exporter<C> {
    /// Exporter with explicit timing and WebP still codec.
    pub fn with_codec(
        options: ExportOptions,
        settings: EncoderSettings,
        webp_codec: C,
    ) -> SmtxResult<Self> {
        settings.validate()?;
        Ok(Self {
            options,
            settings,
            naming: NamingScheme::default(),
            webp_codec,
        })
    }

    /// Replace the output naming.
    pub fn with_naming(mut self, naming: NamingScheme) -> Self {
        self.naming = naming;
        self
    }

    /// Options in use.
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Encode `items` on a grid of `grid` cells into finished blobs, in grid order.
    ///
    /// Item frames must already be one scaled cell each. Combined mode always gives one blob;
    /// separate mode gives one per non-empty item.
    #[tracing::instrument(skip(self, items), fields(items = items.len(), format = ?self.options.format))]
    pub async fn encode_blobs(&self, grid: GridDims, items: &[GridItem]) -> SmtxResult<Vec<Vec<u8>>> {
        let geom = scaled_geometry(grid, self.options.scale);
        let mut encoder = RunEncoder::new(self.options.format, &self.settings, &self.webp_codec)?;

        if self.options.combined_only {
            check_canvas(grid, geom)?;
            tracing::debug!(
                width = geom.grid_px.x,
                height = geom.grid_px.y,
                "compositing grid"
            );
            let frames = composite_sequence(items, geom.grid_px, geom.cell_size);
            let blob = encoder
                .encode(&frames, geom.grid_px.x, geom.grid_px.y)
                .await?;
            return Ok(vec![blob]);
        }

        let mut blobs = Vec::new();
        for item in items.iter().filter(|item| !item.is_empty()) {
            let blob = encoder
                .encode(&item.frames, geom.cell_size, geom.cell_size)
                .await?;
            blobs.push(blob);
        }
        Ok(blobs)
    }

    /// Encode and hand the result to `sink`: one blob is saved directly, several are archived.
    ///
    /// Nothing reaches the sink unless every blob encoded successfully.
    #[tracing::instrument(skip(self, items, sink), fields(items = items.len()))]
    pub async fn export<S: PackagingSink>(
        &self,
        grid: GridDims,
        items: &[GridItem],
        sink: &mut S,
    ) -> SmtxResult<ExportOutcome> {
        let mut blobs = self.encode_blobs(grid, items).await?;
        let format = self.options.format;

        match blobs.len() {
            0 => Err(SmtxError::validation(
                "nothing to export: the grid has no words",
            )),
            1 => {
                let filename = self.naming.single(format);
                let blob = blobs.remove(0);
                sink.save(blob, &filename).await?;
                Ok(ExportOutcome::Single { filename })
            }
            _ => {
                let entries: Vec<(String, Vec<u8>)> = blobs
                    .into_iter()
                    .enumerate()
                    .map(|(i, blob)| (self.naming.entry(i, format), blob))
                    .collect();
                let names = entries.iter().map(|(name, _)| name.clone()).collect();
                let archive = sink.archive(entries).await?;
                let filename = self.naming.archive();
                sink.save(archive, &filename).await?;
                Ok(ExportOutcome::Archive {
                    filename,
                    entries: names,
                })
            }
        }
    }
}

/// One-shot export with default timing and naming.
pub async fn export_word_data<S: PackagingSink>(
    grid: GridDims,
    items: &[GridItem],
    options: ExportOptions,
    sink: &mut S,
) -> SmtxResult<ExportOutcome> {
    Exporter::new(options)?.export(grid, items, sink).await
}

// Encoder owned by a single run.
enum RunEncoder<C: StillCodec> {
    Gif(GifFrameEncoder),
    Webp(WebPFrameEncoder<C>),
}

impl<C: StillCodec + Clone> RunEncoder<C> {
    fn new(format: ExportFormat, settings: &EncoderSettings, codec: &C) -> SmtxResult<Self> {
        Ok(match format {
            ExportFormat::Gif => Self::Gif(GifFrameEncoder::new(settings.clone())?),
            ExportFormat::Webp => Self::Webp(WebPFrameEncoder::with_codec(
                codec.clone(),
                settings.clone(),
            )?),
        })
    }

    async fn encode(&mut self, frames: &[FrameRGBA], width: u32, height: u32) -> SmtxResult<Vec<u8>> {
        match self {
            Self::Gif(enc) => enc.encode(frames, width, height).await,
            Self::Webp(enc) => enc.encode(frames, width, height).await,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
