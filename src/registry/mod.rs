//! Owned registry of loaded spritesheets and their animated sprites.

/// Registry state, loading and lookups.
pub mod store;
