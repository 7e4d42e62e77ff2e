//! Caption and name sources
//!
//! The caption model is an external collaborator: the core only consumes an
//! opaque `(image, context) -> text` function behind the [`Captioner`]
//! trait. The [`CaptionerRegistry`] is the explicit, injected replacement
//! for a per-model global cache: the caller constructs it once and passes it
//! into the batch driver, which gets-or-creates at most one captioner per
//! model size.

use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ImaginerError, Result};

/// Caption model size selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelSize {
    Small,
    Large,
}

impl ModelSize {
    /// Identifier passed through to the external model command
    pub fn selector(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Large => "large",
        }
    }
}

/// An image-to-text source. Synchronous and blocking from the driver's
/// perspective; failures surface as `CaptionFailure`.
pub trait Captioner {
    fn caption(&self, image: &Path, context: Option<&str>) -> Result<String>;
}

/// Factory that builds a captioner for a model size, used by the registry
pub type CaptionerFactory = Box<dyn Fn(ModelSize) -> Result<Box<dyn Captioner>>>;

/// Get-or-create captioner service, one instance per model size.
///
/// Construction can be expensive (model load), so the registry caches each
/// built captioner and reuses it for the rest of the run. Single-threaded by
/// design; a concurrent driver would need to guard this with a lock.
pub struct CaptionerRegistry {
    factory: CaptionerFactory,
    loaded: HashMap<ModelSize, Box<dyn Captioner>>,
}

impl CaptionerRegistry {
    pub fn new(factory: CaptionerFactory) -> Self {
        Self {
            factory,
            loaded: HashMap::new(),
        }
    }

    /// Registry whose captioners reuse the existing file stem as text
    pub fn stem_only() -> Self {
        Self::new(Box::new(|_| Ok(Box::new(StemSource) as Box<dyn Captioner>)))
    }

    /// Registry whose captioners shell out to an external command
    pub fn external_command(program: String) -> Self {
        Self::new(Box::new(move |size| {
            Ok(Box::new(CommandCaptioner::new(program.clone(), size)) as Box<dyn Captioner>)
        }))
    }

    /// Get the captioner for `size`, constructing it on first use
    pub fn get_or_create(&mut self, size: ModelSize) -> Result<&dyn Captioner> {
        if !self.loaded.contains_key(&size) {
            info!("Loading captioner for model size {:?}", size);
            let captioner = (self.factory)(size)?;
            self.loaded.insert(size, captioner);
        }
        Ok(self.loaded[&size].as_ref())
    }

    /// Number of captioners constructed so far
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }
}

/// Captioner that invokes an external command with the image path.
///
/// The command is called as `program <image> <selector> [context]` and the
/// caption is read from stdout. This keeps the model itself (a Python
/// inference script, an API wrapper, anything) a true black box.
pub struct CommandCaptioner {
    program: String,
    size: ModelSize,
}

impl CommandCaptioner {
    pub fn new(program: String, size: ModelSize) -> Self {
        Self { program, size }
    }
}

impl Captioner for CommandCaptioner {
    fn caption(&self, image: &Path, context: Option<&str>) -> Result<String> {
        debug!("Captioning {:?} via {:?}", image, self.program);

        let mut command = Command::new(&self.program);
        command.arg(image).arg(self.size.selector());
        if let Some(context) = context {
            command.arg(context);
        }

        let output = command
            .output()
            .map_err(|e| ImaginerError::caption(format!("cannot run {:?}: {e}", self.program), image))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ImaginerError::caption(
                format!("{:?} exited with {}: {}", self.program, output.status, stderr.trim()),
                image,
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(ImaginerError::caption(
                format!("{:?} produced no caption text", self.program),
                image,
            ));
        }

        Ok(text)
    }
}

/// Name source that reuses the existing file stem, with common filename
/// separators mapped back to spaces so the text chain has words to work on.
pub struct StemSource;

impl Captioner for StemSource {
    fn caption(&self, image: &Path, context: Option<&str>) -> Result<String> {
        let stem = image
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ImaginerError::caption("file has no usable stem", image))?;

        let text = stem.replace(['-', '_'], " ");
        Ok(match context {
            Some(context) => format!("{context}{text}"),
            None => text,
        })
    }
}
