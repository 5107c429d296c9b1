use crate::foundation::core::{FRAME_COUNT, FrameRGBA, GridDims};

/// One occupied grid cell: its cell coordinates plus the animation frames drawn there.
///
/// An item with no frames is a placeholder and is skipped by the compositor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridItem {
    /// Column index.
    pub x: u32,
    /// Row index.
    pub y: u32,
    /// Frames in animation order, each `cell_size x cell_size`.
    pub frames: Vec<FrameRGBA>,
}

impl GridItem {
    /// Whether this item draws anything.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame shown at animation step `index`, wrapping over the item's own frames.
    pub fn frame_at(&self, index: usize) -> Option<&FrameRGBA> {
        if self.frames.is_empty() {
            return None;
        }
        self.frames.get(index % self.frames.len())
    }
}

/// Copy `src` into `dst` at `(dx, dy)`, replacing destination pixels.
///
/// Alpha is copied as-is rather than blended. Parts of `src` outside `dst` are dropped.
pub fn blit_overwrite(dst: &mut FrameRGBA, src: &FrameRGBA, dx: i64, dy: i64) {
    let x0 = dx.max(0);
    let y0 = dy.max(0);
    let x1 = (dx + i64::from(src.width)).min(i64::from(dst.width));
    let y1 = (dy + i64::from(src.height)).min(i64::from(dst.height));
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let row_bytes = ((x1 - x0) as usize) * 4;
    let dst_stride = dst.width as usize * 4;
    let src_stride = src.width as usize * 4;
    for y in y0..y1 {
        let d = (y as usize) * dst_stride + (x0 as usize) * 4;
        let s = ((y - dy) as usize) * src_stride + ((x0 - dx) as usize) * 4;
        dst.data[d..d + row_bytes].copy_from_slice(&src.data[s..s + row_bytes]);
    }
}

/// Render one animation step of a word grid.
///
/// Starts from a fully transparent `grid_px.x x grid_px.y` frame and draws every non-empty
/// item at `(x * cell_size, y * cell_size)` in list order, so later items win on overlap.
pub fn composite_frame(
    items: &[GridItem],
    grid_px: GridDims,
    cell_size: u32,
    frame_index: usize,
) -> FrameRGBA {
    let mut out = FrameRGBA::blank(grid_px.x, grid_px.y);
    for item in items {
        let Some(frame) = item.frame_at(frame_index) else {
            continue;
        };
        let dx = i64::from(item.x) * i64::from(cell_size);
        let dy = i64::from(item.y) * i64::from(cell_size);
        blit_overwrite(&mut out, frame, dx, dy);
    }
    out
}

/// Render all animation steps of a word grid, in order.
pub fn composite_sequence(items: &[GridItem], grid_px: GridDims, cell_size: u32) -> Vec<FrameRGBA> {
    (0..FRAME_COUNT)
        .map(|i| composite_frame(items, grid_px, cell_size, i))
        .collect()
}

/// Lay `frames` side by side on a `width x height` canvas, frame `i` at `x = i * cell_width`.
pub fn combine_horizontal(
    frames: &[FrameRGBA],
    width: u32,
    height: u32,
    cell_width: u32,
) -> FrameRGBA {
    let mut out = FrameRGBA::blank(width, height);
    for (i, frame) in frames.iter().enumerate() {
        let dx = (i as i64) * i64::from(cell_width);
        blit_overwrite(&mut out, frame, dx, 0);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
