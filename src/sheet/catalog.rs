use std::collections::BTreeMap;

use crate::{
    foundation::core::FRAME_COUNT,
    foundation::error::{SmtxError, SmtxResult},
    sheet::descriptor::{SpritesheetDescriptor, SpritesheetRegion},
};

/// The three regions of one sprite, in frame order.
pub type RegionSet = [SpritesheetRegion; FRAME_COUNT];

/// Key -> [`RegionSet`] view over a validated descriptor.
#[derive(Clone, Copy, Debug)]
pub struct RegionCatalog<'a> {
    regions: &'a BTreeMap<String, Vec<SpritesheetRegion>>,
}

impl<'a> RegionCatalog<'a> {
    /// Catalog over the regions declared by `descriptor`.
    pub fn new(descriptor: &'a SpritesheetDescriptor) -> Self {
        Self {
            regions: &descriptor.regions,
        }
    }

    /// Resolve `key` to exactly [`FRAME_COUNT`] regions.
    pub fn resolve(&self, key: &str) -> SmtxResult<RegionSet> {
        let declared = self.regions.get(key).map(Vec::as_slice).unwrap_or(&[]);
        resolve_regions(key, declared)
    }

    /// Declared sprite keys in catalog order.
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.regions.keys().map(String::as_str)
    }

    /// Number of declared keys.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether no keys are declared.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Pad a declared region list to [`FRAME_COUNT`] entries.
///
/// A missing slot repeats the slot before it, so `[A]` becomes `[A, A, A]` and `[A, B]`
/// becomes `[A, B, B]`. Entries past the third are ignored.
pub fn resolve_regions(key: &str, declared: &[SpritesheetRegion]) -> SmtxResult<RegionSet> {
    let Some(first) = declared.first() else {
        return Err(SmtxError::missing_region(key));
    };

    let mut out = [*first; FRAME_COUNT];
    for idx in 1..FRAME_COUNT {
        out[idx] = declared.get(idx).copied().unwrap_or(out[idx - 1]);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/sheet/catalog.rs"]
mod tests;
