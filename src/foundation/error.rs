/// Result alias used by every compositor operation.
pub type ImageResult<T> = Result<T, ImageError>;

/// Layer that an operation needed but the session did not have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prerequisite {
    /// The body photo (background layer).
    Body,
    /// The tattoo design (overlay layer).
    Design,
}

impl std::fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Body => f.write_str("upload a body photo first"),
            Self::Design => f.write_str("upload a tattoo design first"),
        }
    }
}

/// Compositor error.
///
/// Every variant is recoverable: the operation that produced it left the session exactly as it
/// was before the call.
#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    /// The file was rejected before decode (not an image type, or over the size limit).
    #[error("invalid or too large image: {0}")]
    InvalidOrTooLarge(String),

    /// The file passed validation but could not be decoded.
    #[error("decode failure: {0}")]
    DecodeFailure(String),

    /// The operation needs a layer that is not loaded.
    #[error("missing prerequisite: {0}")]
    MissingPrerequisite(Prerequisite),

    /// The undo history is empty.
    #[error("nothing to undo yet")]
    NothingToUndo,

    /// Export was attempted without a body photo.
    #[error("body image missing")]
    MissingBody,

    /// Export-time decode or drawing failed.
    #[error("render failure: {0}")]
    RenderFailure(String),

    /// Configuration values out of range.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped foreign error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImageError {
    /// Build an [`ImageError::InvalidOrTooLarge`] value.
    pub fn invalid_or_too_large(msg: impl Into<String>) -> Self {
        Self::InvalidOrTooLarge(msg.into())
    }

    /// Build an [`ImageError::DecodeFailure`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeFailure(msg.into())
    }

    /// Build an [`ImageError::RenderFailure`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::RenderFailure(msg.into())
    }

    /// Build an [`ImageError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build an [`ImageError::MissingPrerequisite`] value.
    pub fn missing(what: Prerequisite) -> Self {
        Self::MissingPrerequisite(what)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
