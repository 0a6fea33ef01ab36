/// Convenience result type used across layerstack.
pub type LayerstackResult<T> = Result<T, LayerstackError>;

/// Top-level error taxonomy used by document APIs.
///
/// Clamping problems during export are not errors: they are collected as
/// [`GeometryIssue`](crate::GeometryIssue) values in the export summary.
#[derive(thiserror::Error, Debug)]
pub enum LayerstackError {
    /// The record stream does not describe a balanced group structure.
    #[error("structure error: {0}")]
    Structure(String),

    /// Invalid user-provided metadata or document data.
    #[error("validation error: {0}")]
    Validation(String),

    /// No encoder or decoder is available for the requested format.
    #[error("codec unavailable: no {format} codec for '{file}'")]
    CodecUnavailable {
        /// File that was being read or written.
        file: String,
        /// Requested format, usually a file extension.
        format: String,
    },

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Underlying read or write failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayerstackError {
    /// Build a [`LayerstackError::Structure`] value.
    pub fn structure(msg: impl Into<String>) -> Self {
        Self::Structure(msg.into())
    }

    /// Build a [`LayerstackError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LayerstackError::CodecUnavailable`] value.
    pub fn codec_unavailable(file: impl Into<String>, format: impl Into<String>) -> Self {
        Self::CodecUnavailable {
            file: file.into(),
            format: format.into(),
        }
    }

    /// Build a [`LayerstackError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
