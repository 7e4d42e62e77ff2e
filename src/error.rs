//! Error types and handling for Imaginer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Imaginer operations
pub type Result<T> = std::result::Result<T, ImaginerError>;

/// Main error type for Imaginer operations
#[derive(Debug, Error)]
pub enum ImaginerError {
    /// Input path does not exist
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// File extension not in the recognized image set
    #[error("Unsupported file type: {extension:?} (file: {file})")]
    UnsupportedType { extension: String, file: PathBuf },

    /// The external caption source failed to produce text
    #[error("Caption generation failed for {file}: {message}")]
    CaptionFailure { message: String, file: PathBuf },

    /// Image decode/encode errors
    #[error("Image codec error: {0}")]
    Codec(#[from] image::ImageError),

    /// I/O related errors (permissions, rename, delete)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Collision probing gave up before finding a free name
    #[error("No free name for {base:?} in {dir} after {limit} attempts")]
    CollisionExhausted {
        dir: PathBuf,
        base: String,
        limit: u32,
    },

    /// PNG optimize pass failed
    #[error("PNG optimization error: {0}")]
    PngOptimize(String),

    /// Invalid operation parameters
    #[error("Invalid parameters: {message}")]
    InvalidParameters { message: String },
}

impl From<oxipng::PngError> for ImaginerError {
    fn from(err: oxipng::PngError) -> Self {
        Self::PngOptimize(err.to_string())
    }
}

impl ImaginerError {
    /// Create a new not-found error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a new unsupported file type error
    pub fn unsupported<S: Into<String>>(extension: S, file: impl Into<PathBuf>) -> Self {
        Self::UnsupportedType {
            extension: extension.into(),
            file: file.into(),
        }
    }

    /// Create a new caption failure error
    pub fn caption<S: Into<String>>(message: S, file: impl Into<PathBuf>) -> Self {
        Self::CaptionFailure {
            message: message.into(),
            file: file.into(),
        }
    }

    /// Create a new invalid parameters error
    pub fn invalid_parameters<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Process exit code for this error when it is the command's result.
    ///
    /// 2 = unsupported file or path not found, 1 = everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } | Self::UnsupportedType { .. } => 2,
            _ => 1,
        }
    }

    /// Get the associated file path if available
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Self::NotFound { path } => Some(path),
            Self::UnsupportedType { file, .. } | Self::CaptionFailure { file, .. } => Some(file),
            Self::CollisionExhausted { dir, .. } => Some(dir),
            _ => None,
        }
    }
}
