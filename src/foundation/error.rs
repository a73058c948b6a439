/// Convenience result type used across the baker.
pub type BakeResult<T> = Result<T, BakeError>;

/// Top-level error taxonomy.
///
/// Only job setup can fail. Once a bake pass starts, bad geometry degrades to
/// texels that receive no value rather than to an error.
#[derive(thiserror::Error, Debug)]
pub enum BakeError {
    /// Inconsistent mesh, grid, image or settings data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Filesystem errors while reading job files or writing images.
    #[error("io error: {0}")]
    Io(String),

    /// Errors when serializing or deserializing job files.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BakeError {
    /// Build a [`BakeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BakeError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Build a [`BakeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
