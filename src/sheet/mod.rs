//! Spritesheet input: descriptors, decoded surfaces, region lookup and sprite extraction.

/// Region catalog: per-key three-frame region sets.
pub mod catalog;
/// Descriptor JSON schema and boundary validation.
pub mod descriptor;
/// Byte-exact region sampling and whole-sheet cutting.
pub mod extract;
/// Sprite, animated sprite and spritesheet records.
pub mod sprite;
/// Decoded surfaces and the image decode service.
pub mod surface;
