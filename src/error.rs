//! Error taxonomy shared by the filter library and the batch walker.

use std::path::PathBuf;

/// Convenience result type used across the crate.
pub type EnhanceResult<T> = Result<T, EnhanceError>;

/// Errors surfaced by filters, codecs and the batch walker.
///
/// File-level errors (`Decode`, `Encode`, `Io`) are recoverable: the batch
/// walker logs them and moves on to the next entry. `DirectoryOpen` aborts
/// only the affected subtree.
#[derive(thiserror::Error, Debug)]
pub enum EnhanceError {
    /// A filter or option was constructed with an out-of-range parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Raw pixel data does not match the declared dimensions.
    #[error("invalid buffer: {0}")]
    InvalidBuffer(String),

    /// The codec could not read the file as an image.
    #[error("failed to decode '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The codec could not write the processed image.
    #[error("failed to encode '{}': {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Filesystem failure outside of directory traversal.
    #[error("i/o error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory could not be opened or mirrored.
    #[error("failed to open directory '{}': {source}", path.display())]
    DirectoryOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dedicated worker pool could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

impl EnhanceError {
    /// Build an [`EnhanceError::InvalidParameter`] value.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Build an [`EnhanceError::InvalidBuffer`] value.
    pub fn invalid_buffer(msg: impl Into<String>) -> Self {
        Self::InvalidBuffer(msg.into())
    }

    /// Short stable label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParameter(_) => "invalid-parameter",
            Self::InvalidBuffer(_) => "invalid-buffer",
            Self::Decode { .. } => "decode",
            Self::Encode { .. } => "encode",
            Self::Io { .. } => "io",
            Self::DirectoryOpen { .. } => "directory",
            Self::ThreadPool(_) => "thread-pool",
        }
    }
}
