//! Image operation set: format conversion, bounded resize, compression
//!
//! Each operation takes an image file path and yields the (possibly new)
//! path of the result. When several are requested they always run in the
//! fixed order convert -> resize -> compress, each stage's output feeding
//! the next stage's input.

use std::fs;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::{WebPEncoder, WebPQuality};
use image::DynamicImage;
use tracing::debug;

use crate::error::Result;
use crate::formats::TargetFormat;

pub mod orient;

use orient::{apply_orientation, orientation_from_bytes};

/// Encoder quality used when a stage needs to encode JPEG but the chain
/// requested no explicit quality
const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Re-encode `path` into `format`.
///
/// The embedded orientation is baked into pixel data first. In-place mode
/// (`output_dir` = None) writes next to the original and deletes the
/// original only after the new file is confirmed written; alternate mode
/// writes into `output_dir` and leaves the original untouched. Returns the
/// path of the encoded file.
pub fn convert_image(
    path: &Path,
    format: TargetFormat,
    output_dir: Option<&Path>,
) -> Result<PathBuf> {
    let bytes = fs::read(path)?;
    let orientation = orientation_from_bytes(&bytes).unwrap_or(1);
    let image = apply_orientation(image::load_from_memory(&bytes)?, orientation);

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");

    let dir = match output_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            dir.to_path_buf()
        }
        None => path.parent().unwrap_or_else(|| Path::new("")).to_path_buf(),
    };
    let new_path = dir.join(format!("{stem}.{}", format.extension()));

    debug!("Converting {:?} -> {:?}", path, new_path);
    write_encoded(&image, &new_path, format.image_format(), None)?;

    // In place: drop the original once the new file is confirmed on disk
    if output_dir.is_none() && new_path != path && new_path.exists() {
        fs::remove_file(path)?;
    }

    Ok(new_path)
}

/// Proportionally shrink the image at `path` so it fits within the given
/// bounds, in place. An unset bound is unbounded; never upscales; a no-op
/// when the image already fits (unless an orientation needed baking).
pub fn bounded_resize(
    path: &Path,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> Result<()> {
    let bytes = fs::read(path)?;
    let orientation = orientation_from_bytes(&bytes).unwrap_or(1);
    let image = apply_orientation(image::load_from_memory(&bytes)?, orientation);

    let target = bounded_dimensions(image.width(), image.height(), max_width, max_height);
    if target.is_none() && orientation <= 1 {
        debug!("{:?} already fits within bounds, skipping resize", path);
        return Ok(());
    }

    let resized = match target {
        Some((width, height)) => {
            debug!(
                "Resizing {:?}: {}x{} -> {}x{}",
                path,
                image.width(),
                image.height(),
                width,
                height
            );
            image.resize(width, height, image::imageops::FilterType::Lanczos3)
        }
        None => image,
    };

    let format = image::guess_format(&bytes)?;
    write_encoded(&resized, path, format, None)
}

/// Re-encode the image at `path` at the given quality, in place.
///
/// JPEG forces a three-channel color model; PNG is lossless, so quality only
/// triggers an optimize pass; WebP encodes lossy at the requested quality;
/// anything else gets a best-effort re-encode.
pub fn compress_image(path: &Path, quality: u8) -> Result<()> {
    let bytes = fs::read(path)?;
    let format = image::guess_format(&bytes)?;

    debug!("Compressing {:?} ({:?}, quality {})", path, format, quality);

    if format == image::ImageFormat::Png {
        let optimized = oxipng::optimize_from_memory(&bytes, &oxipng::Options::default())?;
        fs::write(path, optimized)?;
        return Ok(());
    }

    let orientation = orientation_from_bytes(&bytes).unwrap_or(1);
    let image = apply_orientation(image::load_from_memory(&bytes)?, orientation);
    write_encoded(&image, path, format, Some(quality))
}

/// Target dimensions for a proportional shrink into the given bounds, or
/// None when the image already fits. Never upscales.
pub fn bounded_dimensions(
    width: u32,
    height: u32,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> Option<(u32, u32)> {
    let bound_w = max_width.unwrap_or(u32::MAX);
    let bound_h = max_height.unwrap_or(u32::MAX);

    if width <= bound_w && height <= bound_h {
        return None;
    }

    let scale = f64::min(
        f64::from(bound_w) / f64::from(width),
        f64::from(bound_h) / f64::from(height),
    );
    let target_w = ((f64::from(width) * scale).round() as u32)
        .max(1)
        .min(bound_w.max(1));
    let target_h = ((f64::from(height) * scale).round() as u32)
        .max(1)
        .min(bound_h.max(1));

    Some((target_w, target_h))
}

/// Encode an image to `path` in the given format.
///
/// JPEG cannot carry transparency, so alpha is composited onto an opaque
/// white background first. A quality value drives the JPEG and lossy WebP
/// encoders; PNG and the remaining formats encode with their defaults.
fn write_encoded(
    image: &DynamicImage,
    path: &Path,
    format: image::ImageFormat,
    quality: Option<u8>,
) -> Result<()> {
    match format {
        image::ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgb8(flatten_onto_white(image));
            let mut output = fs::File::create(path)?;
            let encoder =
                JpegEncoder::new_with_quality(&mut output, quality.unwrap_or(DEFAULT_JPEG_QUALITY));
            rgb.write_with_encoder(encoder)?;
        }
        image::ImageFormat::WebP => match quality {
            Some(quality) => {
                let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
                let output = fs::File::create(path)?;
                let encoder =
                    WebPEncoder::new_with_quality(output, WebPQuality::lossy(quality.max(1)));
                rgba.write_with_encoder(encoder)?;
            }
            None => image.save_with_format(path, format)?,
        },
        _ => image.save_with_format(path, format)?,
    }
    Ok(())
}

/// Composite alpha onto an opaque white background, yielding three channels
fn flatten_onto_white(image: &DynamicImage) -> image::RgbImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb.clone(),
        other => {
            let rgba = other.to_rgba8();
            let mut rgb = image::RgbImage::new(rgba.width(), rgba.height());
            for (out, pixel) in rgb.pixels_mut().zip(rgba.pixels()) {
                let alpha = u16::from(pixel[3]);
                for channel in 0..3 {
                    let value = u16::from(pixel[channel]);
                    out[channel] = ((value * alpha + 255 * (255 - alpha)) / 255) as u8;
                }
            }
            rgb
        }
    }
}
