//! Word layout files: which word sits in which grid cell.
//!
//! ```json
//! { "width": 2, "height": 1, "cells": [ { "x": 0, "y": 0, "word": "baba" } ] }
//! ```

use std::path::Path;

use anyhow::Context as _;

use crate::{
    foundation::{
        core::{GridDims, clamp_scale},
        error::{SmtxError, SmtxResult},
    },
    registry::store::SpriteRegistry,
    render::composite::GridItem,
};

/// One placed word.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayoutCell {
    /// Column index.
    pub x: u32,
    /// Row index.
    pub y: u32,
    /// Word as typed; resolved through the word map.
    pub word: String,
}

/// A word grid.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WordLayout {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Placed words in draw order.
    #[serde(default)]
    pub cells: Vec<LayoutCell>,
}

impl WordLayout {
    /// Parse and validate layout JSON.
    pub fn from_json_str(s: &str) -> SmtxResult<Self> {
        let layout: Self =
            serde_json::from_str(s).map_err(|e| SmtxError::serde(format!("layout: {e}")))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Read and validate a layout file.
    pub fn from_path(path: &Path) -> SmtxResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read layout '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Grid size in cells.
    pub fn grid(&self) -> GridDims {
        GridDims::new(self.width, self.height)
    }

    /// Reject empty grids and cells outside the grid.
    pub fn validate(&self) -> SmtxResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SmtxError::validation(format!(
                "layout grid must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if let Some(cell) = self
            .cells
            .iter()
            .find(|c| c.x >= self.width || c.y >= self.height)
        {
            return Err(SmtxError::validation(format!(
                "word '{}' at ({}, {}) is outside the {}x{} grid",
                cell.word, cell.x, cell.y, self.width, self.height
            )));
        }
        Ok(())
    }

    /// Turn each cell into a grid item with frames scaled to one output cell.
    ///
    /// `scale` is clamped like the export scale. Words with no sprite become empty items, which
    /// the exporter skips.
    pub fn grid_items(&self, registry: &SpriteRegistry, scale: u32) -> SmtxResult<Vec<GridItem>> {
        let scale = clamp_scale(scale);
        self.cells
            .iter()
            .map(|cell| match registry.resolve_word(&cell.word) {
                Some(sprite) => GridItem::from_animated_sprite(cell.x, cell.y, sprite, scale),
                None => {
                    tracing::warn!(word = %cell.word, "no sprite for word");
                    Ok(GridItem {
                        x: cell.x,
                        y: cell.y,
                        frames: Vec::new(),
                    })
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../tests/unit/layout.rs"]
mod tests;
