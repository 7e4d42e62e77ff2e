//! Collision-safe renaming
//!
//! A rename never overwrites an existing file: if the desired name is taken
//! the renamer probes `base_1`, `base_2`, ... and takes the first free
//! candidate. Check-then-rename is not atomic against other processes; all
//! renames in a batch originate from one driver, which makes that an
//! accepted simplification.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ImaginerError, Result};

/// Probe cap before giving up with `CollisionExhausted`
const MAX_PROBES: u32 = 10_000;

/// A (directory, base name, extension) triple to derive a final path from
#[derive(Debug, Clone)]
pub struct RenameTarget {
    pub dir: PathBuf,
    pub base: String,
    pub extension: String,
}

impl RenameTarget {
    /// Build a target next to `current`, reusing its extension when the
    /// caller supplies none.
    pub fn for_file(current: &Path, base: &str, extension: Option<&str>) -> Self {
        let extension = extension
            .map(str::to_string)
            .or_else(|| {
                current
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_default();

        Self {
            dir: current.parent().unwrap_or_else(|| Path::new("")).to_path_buf(),
            base: base.to_string(),
            extension,
        }
    }

    fn candidate(&self, counter: Option<u32>) -> PathBuf {
        let mut name = match counter {
            Some(n) => format!("{}_{n}", self.base),
            None => self.base.clone(),
        };
        if !self.extension.is_empty() {
            name.push('.');
            name.push_str(&self.extension);
        }
        self.dir.join(name)
    }

    /// First candidate path that does not exist yet
    pub fn resolve(&self) -> Result<PathBuf> {
        let first = self.candidate(None);
        if !first.exists() {
            return Ok(first);
        }

        for counter in 1..=MAX_PROBES {
            let probe = self.candidate(Some(counter));
            if !probe.exists() {
                return Ok(probe);
            }
        }

        Err(ImaginerError::CollisionExhausted {
            dir: self.dir.clone(),
            base: self.base.clone(),
            limit: MAX_PROBES,
        })
    }
}

/// Rename `current` to `base.extension` in its own directory, probing for a
/// non-colliding name. Returns the final path.
pub fn rename_collision_safe(
    current: &Path,
    base: &str,
    extension: Option<&str>,
) -> Result<PathBuf> {
    let target = RenameTarget::for_file(current, base, extension);
    let final_path = target.resolve()?;

    debug!("Renaming {:?} -> {:?}", current, final_path);
    fs::rename(current, &final_path)?;

    Ok(final_path)
}
