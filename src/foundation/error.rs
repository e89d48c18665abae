/// Crate-wide result alias.
pub type GifStackResult<T> = Result<T, GifStackError>;

/// Errors surfaced by the builder, the finalize pipeline and the built-in collaborators.
#[derive(thiserror::Error, Debug)]
pub enum GifStackError {
    /// A builder method received an out-of-range or malformed parameter.
    #[error("invalid operation parameter: {0}")]
    InvalidOperationParameter(String),

    /// An animated source could not be read or decoded.
    #[error("source resolution error: {0}")]
    SourceResolution(String),

    /// The rendering backend failed to draw an operation or capture a frame.
    #[error("render error: {0}")]
    Render(String),

    /// The encoder rejected its configuration or a frame.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Structural problems (canvas size, scene files, pipeline misuse).
    #[error("validation error: {0}")]
    Validation(String),

    /// Scene or config (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, usually I/O with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GifStackError {
    /// Build an [`GifStackError::InvalidOperationParameter`].
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Self::InvalidOperationParameter(msg.into())
    }

    /// Build a [`GifStackError::SourceResolution`].
    pub fn source(msg: impl Into<String>) -> Self {
        Self::SourceResolution(msg.into())
    }

    /// Build a [`GifStackError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`GifStackError::Encoding`].
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`GifStackError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GifStackError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
