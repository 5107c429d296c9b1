use crate::{
    foundation::core::{FRAME_COUNT, FrameRGBA},
    foundation::error::{SmtxError, SmtxResult},
    sheet::{
        catalog::{RegionCatalog, RegionSet},
        descriptor::{SpritesheetDescriptor, SpritesheetRegion},
        sprite::{AnimatedSprite, Sprite, SpritesheetSource},
        surface::Surface,
    },
};

/// Copy exactly `region.w * region.h` pixels starting at `(region.x, region.y)`.
pub fn sample_region(surface: &Surface, region: &SpritesheetRegion) -> SmtxResult<FrameRGBA> {
    if region.w == 0 || region.h == 0 || !region.fits_within(surface.width(), surface.height()) {
        return Err(SmtxError::OutOfBounds {
            x: region.x,
            y: region.y,
            w: region.w,
            h: region.h,
            surface_width: surface.width(),
            surface_height: surface.height(),
        });
    }

    let src = surface.as_bytes();
    let src_stride = surface.width() as usize * 4;
    let row_len = region.w as usize * 4;
    let mut data = Vec::with_capacity(row_len * region.h as usize);
    for row in 0..region.h as usize {
        let start = (region.y as usize + row) * src_stride + region.x as usize * 4;
        data.extend_from_slice(&src[start..start + row_len]);
    }

    Ok(FrameRGBA {
        width: region.w,
        height: region.h,
        data,
    })
}

/// Extract the three frames described by `regions`.
pub fn extract(surface: &Surface, regions: &RegionSet) -> SmtxResult<[Sprite; FRAME_COUNT]> {
    let [a, b, c] = regions.map(|region| {
        sample_region(surface, &region).map(|frame| Sprite { region, frame })
    });
    Ok([a?, b?, c?])
}

/// Cut every sprite declared by `descriptor` out of `surface`.
///
/// Keys with no declared regions are skipped with a warning. Any out-of-bounds region aborts
/// the whole cut and nothing is returned.
pub fn cut_spritesheet(
    source: SpritesheetSource,
    surface: &Surface,
    descriptor: &SpritesheetDescriptor,
) -> SmtxResult<Vec<AnimatedSprite>> {
    let catalog = RegionCatalog::new(descriptor);
    let mut out = Vec::with_capacity(catalog.len());
    for key in catalog.keys() {
        let regions = match catalog.resolve(key) {
            Ok(regions) => regions,
            Err(SmtxError::MissingRegion { .. }) => {
                tracing::warn!(%source, key, "skipping sprite without regions");
                continue;
            }
            Err(e) => return Err(e),
        };
        let frames = extract(surface, &regions).inspect_err(|e| {
            tracing::error!(%source, key, error = %e, "sprite extraction failed");
        })?;
        out.push(AnimatedSprite::new(key, source, frames));
    }

    tracing::debug!(%source, sprites = out.len(), "cut spritesheet");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/sheet/extract.rs"]
mod tests;
