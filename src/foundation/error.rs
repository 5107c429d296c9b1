/// Convenience result type used across smtx.
pub type SmtxResult<T> = Result<T, SmtxError>;

/// Top-level error taxonomy used by the extraction, compositing and export APIs.
#[derive(thiserror::Error, Debug)]
pub enum SmtxError {
    /// A sprite key was requested that has no declared regions.
    #[error("missing region: no regions declared for sprite key '{key}'")]
    MissingRegion {
        /// The sprite key that was looked up.
        key: String,
    },

    /// A region does not fit inside the surface it is sampled from.
    #[error(
        "region out of bounds: {w}x{h} at ({x}, {y}) exceeds surface {surface_width}x{surface_height}"
    )]
    OutOfBounds {
        /// Region left edge.
        x: u32,
        /// Region top edge.
        y: u32,
        /// Region width.
        w: u32,
        /// Region height.
        h: u32,
        /// Width of the sampled surface.
        surface_width: u32,
        /// Height of the sampled surface.
        surface_height: u32,
    },

    /// A pixel surface could not be created or decoded.
    #[error("surface init error: {0}")]
    SurfaceInit(String),

    /// Invalid frames were handed to an encoder, or the encoder itself failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The one-time codec setup failed.
    #[error("codec init error: {0}")]
    CodecInit(String),

    /// Invalid user-provided data (descriptors, layouts, options).
    #[error("validation error: {0}")]
    Validation(String),

    /// Illegal registry transition (e.g. loading a startup sheet twice).
    #[error("registry error: {0}")]
    Registry(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SmtxError {
    /// Build a [`SmtxError::MissingRegion`] value.
    pub fn missing_region(key: impl Into<String>) -> Self {
        Self::MissingRegion { key: key.into() }
    }

    /// Build a [`SmtxError::SurfaceInit`] value.
    pub fn surface_init(msg: impl Into<String>) -> Self {
        Self::SurfaceInit(msg.into())
    }

    /// Build a [`SmtxError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`SmtxError::CodecInit`] value.
    pub fn codec_init(msg: impl Into<String>) -> Self {
        Self::CodecInit(msg.into())
    }

    /// Build a [`SmtxError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SmtxError::Registry`] value.
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Build a [`SmtxError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
