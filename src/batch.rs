//! Batch driver
//!
//! Resolves a path argument to a worklist of image files, applies the
//! operation chain to each, isolates per-file failures and aggregates a
//! [`BatchResult`]. Files are processed one at a time, in sorted directory
//! order (the filesystem gives no enumeration-order guarantee, so the
//! worklist is sorted for determinism). One file's failure never aborts the
//! batch; single-file invocations propagate the failure instead.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::caption::{Captioner, CaptionerRegistry, StemSource};
use crate::chain::OperationChain;
use crate::error::{ImaginerError, Result};
use crate::formats::{is_image_file, recognized_extension};
use crate::{ops, renamer};

/// Outcome of one batch run
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Files attempted
    pub attempted: usize,
    /// Files that reached their terminal succeeded state
    pub succeeded: usize,
    /// Per-file failures, attributed to their input paths
    pub failures: Vec<FileFailure>,
}

/// A failed file with its reason
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: ImaginerError,
}

impl BatchResult {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Per-file progress report passed to the observer during a run
pub enum FileOutcome<'a> {
    Succeeded { input: &'a Path, output: &'a Path },
    Failed { input: &'a Path, error: &'a ImaginerError },
}

/// The worklist a path argument resolves to
enum Worklist {
    Single(PathBuf),
    Directory(Vec<PathBuf>),
}

/// Run the operation chain over `path` (a file or a directory).
pub fn run(
    path: &Path,
    chain: &OperationChain,
    registry: &mut CaptionerRegistry,
) -> Result<BatchResult> {
    run_with(path, chain, registry, &mut |_outcome: FileOutcome<'_>| {})
}

/// Like [`run`], reporting each file's outcome to `observer` as it lands.
pub fn run_with(
    path: &Path,
    chain: &OperationChain,
    registry: &mut CaptionerRegistry,
    observer: &mut dyn FnMut(FileOutcome<'_>),
) -> Result<BatchResult> {
    chain.validate()?;

    let mut result = BatchResult::default();

    match resolve_worklist(path)? {
        Worklist::Single(file) => {
            // Single-file failures propagate as the command's result
            result.attempted = 1;
            let output = process_file(&file, chain, registry)?;
            observer(FileOutcome::Succeeded {
                input: &file,
                output: &output,
            });
            result.succeeded = 1;
        }
        Worklist::Directory(files) => {
            if files.is_empty() {
                info!("No image files found in {:?}", path);
                return Ok(result);
            }

            for file in &files {
                result.attempted += 1;
                match process_file(file, chain, registry) {
                    Ok(output) => {
                        result.succeeded += 1;
                        observer(FileOutcome::Succeeded {
                            input: file,
                            output: &output,
                        });
                    }
                    Err(error) => {
                        warn!("Skipped {:?}: {}", file, error);
                        observer(FileOutcome::Failed {
                            input: file,
                            error: &error,
                        });
                        result.failures.push(FileFailure {
                            path: file.clone(),
                            error,
                        });
                    }
                }
            }
        }
    }

    Ok(result)
}

/// Resolve the path argument to a worklist.
///
/// Directories yield their immediate recognized children, sorted; no
/// recursion. A single file must carry a recognized extension.
fn resolve_worklist(path: &Path) -> Result<Worklist> {
    if path.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|p| is_image_file(p))
            .collect();
        files.sort();
        Ok(Worklist::Directory(files))
    } else if path.is_file() {
        recognized_extension(path)?;
        Ok(Worklist::Single(path.to_path_buf()))
    } else {
        Err(ImaginerError::not_found(path))
    }
}

/// Apply the full chain to one file: image operations in fixed order, then
/// the naming pipeline. Returns the file's final path.
fn process_file(
    path: &Path,
    chain: &OperationChain,
    registry: &mut CaptionerRegistry,
) -> Result<PathBuf> {
    debug!("Processing {:?}", path);
    let mut current = path.to_path_buf();

    if let Some(format) = chain.format {
        current = ops::convert_image(&current, format, chain.output_dir.as_deref())?;
    } else if let Some(output_dir) = &chain.output_dir {
        // No conversion, but output still lands in the alternate folder
        fs::create_dir_all(output_dir)?;
        let file_name = current
            .file_name()
            .ok_or_else(|| ImaginerError::invalid_parameters("input has no file name"))?;
        let dest = output_dir.join(file_name);
        fs::copy(&current, &dest)?;
        current = dest;
    }

    if chain.has_resize() {
        ops::bounded_resize(&current, chain.max_width, chain.max_height)?;
    }

    if let Some(quality) = chain.quality {
        ops::compress_image(&current, quality)?;
    }

    if let Some(naming) = &chain.naming {
        let text = match naming.model {
            Some(size) => registry
                .get_or_create(size)?
                .caption(&current, naming.context.as_deref())?,
            None => StemSource.caption(&current, naming.context.as_deref())?,
        };
        let name = naming.build_name(&text);
        // Keep the current (possibly converted) extension
        current = renamer::rename_collision_safe(&current, &name, None)?;
    }

    debug!("Done: {:?}", current);
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::NamingChain;
    use crate::formats::TargetFormat;
    use crate::text::CaseMode;
    use image::{Rgba, RgbaImage};
    use std::fs::File;
    use tempfile::tempdir;

    fn write_png(path: &Path, width: u32, height: u32) {
        let mut img = RgbaImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = Rgba([120, 80, 40, 255]);
        }
        img.save(path).unwrap();
    }

    fn write_jpeg(path: &Path, width: u32, height: u32) {
        let mut img = image::RgbImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgb([120, 80, 40]);
        }
        img.save(path).unwrap();
    }

    #[test]
    fn test_not_found() {
        let dir = tempdir().unwrap();
        let chain = OperationChain::new().quality(80);
        let mut registry = CaptionerRegistry::stem_only();
        let result = run(&dir.path().join("missing"), &chain, &mut registry);
        assert!(matches!(result, Err(ImaginerError::NotFound { .. })));
    }

    #[test]
    fn test_unsupported_single_file() {
        let dir = tempdir().unwrap();
        let txt = dir.path().join("notes.txt");
        File::create(&txt).unwrap();

        let chain = OperationChain::new().quality(80);
        let mut registry = CaptionerRegistry::stem_only();
        let result = run(&txt, &chain, &mut registry);
        assert!(matches!(result, Err(ImaginerError::UnsupportedType { .. })));
        assert!(txt.exists());
    }

    #[test]
    fn test_empty_directory_is_not_an_error() {
        let dir = tempdir().unwrap();
        let chain = OperationChain::new().quality(80);
        let mut registry = CaptionerRegistry::stem_only();
        let result = run(dir.path(), &chain, &mut registry).unwrap();
        assert_eq!(result.attempted, 0);
        assert_eq!(result.succeeded, 0);
    }

    #[test]
    fn test_directory_skips_unrecognized_children() {
        let dir = tempdir().unwrap();
        write_png(&dir.path().join("a.png"), 4, 4);
        File::create(dir.path().join("readme.md")).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        write_png(&dir.path().join("nested").join("b.png"), 4, 4);

        let chain = OperationChain::new().quality(80);
        let mut registry = CaptionerRegistry::stem_only();
        let result = run(dir.path(), &chain, &mut registry).unwrap();
        // Only the immediate a.png; no recursion, no readme
        assert_eq!(result.attempted, 1);
        assert_eq!(result.succeeded, 1);
    }

    #[test]
    fn test_batch_isolates_single_failure() {
        let dir = tempdir().unwrap();
        write_png(&dir.path().join("a.png"), 4, 4);
        // Valid extension, invalid content
        fs::write(dir.path().join("b.png"), b"not an image at all").unwrap();
        write_png(&dir.path().join("c.png"), 4, 4);

        let chain = OperationChain::new().quality(80);
        let mut registry = CaptionerRegistry::stem_only();
        let result = run(dir.path(), &chain, &mut registry).unwrap();

        assert_eq!(result.attempted, 3);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed(), 1);
        assert!(result.failures[0].path.ends_with("b.png"));
    }

    #[test]
    fn test_single_file_failure_propagates() {
        let dir = tempdir().unwrap();
        let broken = dir.path().join("broken.png");
        fs::write(&broken, b"still not an image").unwrap();

        let chain = OperationChain::new().quality(80);
        let mut registry = CaptionerRegistry::stem_only();
        let result = run(&broken, &chain, &mut registry);
        assert!(result.is_err());
    }

    #[test]
    fn test_convert_and_resize_end_to_end() {
        let dir = tempdir().unwrap();
        write_jpeg(&dir.path().join("a.jpg"), 1600, 800);
        write_png(&dir.path().join("b.png"), 400, 400);

        let chain = OperationChain::new()
            .format(TargetFormat::Webp)
            .max_size(Some(800), None);
        let mut registry = CaptionerRegistry::stem_only();
        let result = run(dir.path(), &chain, &mut registry).unwrap();
        assert_eq!(result.succeeded, 2);

        // Originals replaced in place by .webp outputs
        assert!(!dir.path().join("a.jpg").exists());
        assert!(!dir.path().join("b.png").exists());

        let a = image::open(dir.path().join("a.webp")).unwrap();
        assert!(a.width() <= 800);
        let b = image::open(dir.path().join("b.webp")).unwrap();
        assert_eq!((b.width(), b.height()), (400, 400));
    }

    #[test]
    fn test_alternate_output_preserves_originals() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        write_png(&dir.path().join("a.png"), 100, 50);

        let chain = OperationChain::new()
            .max_size(Some(50), None)
            .output_dir(&out);
        let mut registry = CaptionerRegistry::stem_only();
        run(dir.path(), &chain, &mut registry).unwrap();

        // Original untouched, shrunk copy in the output folder
        let original = image::open(dir.path().join("a.png")).unwrap();
        assert_eq!(original.width(), 100);
        let copy = image::open(out.join("a.png")).unwrap();
        assert_eq!((copy.width(), copy.height()), (50, 25));
    }

    #[test]
    fn test_naming_pipeline_renames_collision_safe() {
        let dir = tempdir().unwrap();
        write_png(&dir.path().join("red-car.png"), 4, 4);
        // Pre-existing file with the name the pipeline will generate
        write_png(&dir.path().join("Red-Car.png"), 4, 4);

        let chain = OperationChain::new().naming(NamingChain {
            glue: Some("-".to_string()),
            case: Some(CaseMode::Title),
            ..Default::default()
        });
        let mut registry = CaptionerRegistry::stem_only();
        let result = run(&dir.path().join("red-car.png"), &chain, &mut registry).unwrap();
        assert_eq!(result.succeeded, 1);
        assert!(dir.path().join("Red-Car_1.png").exists());
    }

    #[test]
    fn test_naming_into_alternate_output_keeps_original() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("named");
        write_png(&dir.path().join("red-car.png"), 4, 4);

        let chain = OperationChain::new()
            .naming(NamingChain {
                glue: Some("-".to_string()),
                case: Some(CaseMode::Title),
                ..Default::default()
            })
            .output_dir(&out);
        let mut registry = CaptionerRegistry::stem_only();
        let result = run(&dir.path().join("red-car.png"), &chain, &mut registry).unwrap();
        assert_eq!(result.succeeded, 1);

        // Original stays put; the renamed copy lands in the output folder
        assert!(dir.path().join("red-car.png").exists());
        assert!(out.join("Red-Car.png").exists());
    }

    #[test]
    fn test_observer_sees_every_outcome() {
        let dir = tempdir().unwrap();
        write_png(&dir.path().join("a.png"), 4, 4);
        fs::write(dir.path().join("b.png"), b"junk").unwrap();

        let chain = OperationChain::new().quality(80);
        let mut registry = CaptionerRegistry::stem_only();
        let mut seen = 0usize;
        run_with(dir.path(), &chain, &mut registry, &mut |_| seen += 1).unwrap();
        assert_eq!(seen, 2);
    }
}
