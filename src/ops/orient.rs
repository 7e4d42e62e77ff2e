//! EXIF orientation handling
//!
//! Re-encoding strips metadata, so the embedded orientation is baked into
//! pixel data before any encode. Orientation values follow the EXIF tag
//! (1-8); anything else is treated as "no transform".

use image::DynamicImage;
use rexif::{ExifTag, TagValue};
use tracing::debug;

/// Read the EXIF orientation value from raw file bytes, if present
pub fn orientation_from_bytes(bytes: &[u8]) -> Option<u16> {
    let (parsed, _warnings) = rexif::parse_buffer_quiet(bytes);
    let exif = parsed.ok()?;

    exif.entries
        .iter()
        .find(|entry| entry.tag == ExifTag::Orientation)
        .and_then(|entry| match &entry.value {
            TagValue::U16(values) => values.first().copied(),
            _ => None,
        })
}

/// Apply an EXIF orientation to pixel data
pub fn apply_orientation(image: DynamicImage, orientation: u16) -> DynamicImage {
    if orientation > 1 {
        debug!("Baking EXIF orientation {} into pixels", orientation);
    }
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}
