//! Image format aliases and extension recognition

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ImaginerError, Result};

/// Formats the convert operation can encode to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Jpeg,
    Jpg,
    Png,
    Webp,
}

impl TargetFormat {
    /// Canonical file extension for this format ("jpg" and "jpeg" both map to "jpeg")
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg | Self::Jpg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// Corresponding image crate format
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg | Self::Jpg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::Webp => image::ImageFormat::WebP,
        }
    }
}

/// Extensions accepted as batch candidates
pub const RECOGNIZED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "bmp", "tiff", "tif", "gif",
];

/// Check whether an extension is in the recognized image set
pub fn is_recognized_extension(extension: &str) -> bool {
    RECOGNIZED_EXTENSIONS
        .iter()
        .any(|&ext| ext.eq_ignore_ascii_case(extension))
}

/// Check whether a path names a recognized image file
pub fn is_image_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(is_recognized_extension)
}

/// Validate a file's extension, returning it lowercased
pub fn recognized_extension(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    if is_recognized_extension(extension) {
        Ok(extension.to_lowercase())
    } else {
        Err(ImaginerError::unsupported(extension, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_format_aliases() {
        assert_eq!(TargetFormat::Jpg.extension(), "jpeg");
        assert_eq!(TargetFormat::Jpeg.extension(), "jpeg");
        assert_eq!(TargetFormat::Webp.extension(), "webp");
        assert_eq!(TargetFormat::Jpg.image_format(), image::ImageFormat::Jpeg);
    }

    #[test]
    fn test_recognized_extensions() {
        assert!(is_recognized_extension("jpg"));
        assert!(is_recognized_extension("PNG"));
        assert!(is_recognized_extension("tif"));
        assert!(!is_recognized_extension("xyz"));
        assert!(!is_recognized_extension(""));
    }

    #[test]
    fn test_extension_validation() {
        assert_eq!(
            recognized_extension(Path::new("photo.JPG")).unwrap(),
            "jpg"
        );
        assert!(recognized_extension(Path::new("notes.txt")).is_err());
        assert!(recognized_extension(Path::new("no_extension")).is_err());
    }
}
