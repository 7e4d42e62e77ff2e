//! Operation chain configuration
//!
//! One `OperationChain` describes everything a run does to each candidate
//! file. Image operations always apply in the fixed order convert -> resize
//! -> compress; naming steps in the fixed order generate -> normalize ->
//! glue -> prefix -> suffix -> case. Enabling a subset skips steps but never
//! reorders them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::caption::ModelSize;
use crate::error::{ImaginerError, Result};
use crate::formats::TargetFormat;
use crate::text::CaseMode;

/// The ordered, independently-enabled set of operations for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationChain {
    /// Re-encode into this format (None = keep original format)
    pub format: Option<TargetFormat>,

    /// Proportional shrink bound on width
    pub max_width: Option<u32>,

    /// Proportional shrink bound on height
    pub max_height: Option<u32>,

    /// Re-encode at this quality (0-100, format-dependent semantics)
    pub quality: Option<u8>,

    /// Write results into this directory instead of replacing in place
    pub output_dir: Option<PathBuf>,

    /// Naming pipeline (None = keep filenames)
    pub naming: Option<NamingChain>,
}

/// The naming half of the chain
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamingChain {
    /// Caption model selector; None reuses the existing file stem as text
    pub model: Option<ModelSize>,

    /// Optional prompt context passed to the caption source
    pub context: Option<String>,

    /// Replace spaces in the normalized name with this separator
    pub glue: Option<String>,

    /// Prepended verbatim
    pub prefix: Option<String>,

    /// Appended verbatim
    pub suffix: Option<String>,

    /// Case transform applied last
    pub case: Option<CaseMode>,
}

impl NamingChain {
    /// Run the text pipeline over caption text, in the fixed order
    /// normalize -> glue -> prefix -> suffix -> case.
    pub fn build_name(&self, text: &str) -> String {
        let mut name = crate::text::normalize(text);
        if let Some(separator) = &self.glue {
            name = crate::text::glue(&name, separator);
        }
        if let Some(prefix) = &self.prefix {
            name = crate::text::prefix(&name, prefix);
        }
        if let Some(suffix) = &self.suffix {
            name = crate::text::suffix(&name, suffix);
        }
        crate::text::apply_case(&name, self.case)
    }
}

impl OperationChain {
    /// Create an empty chain (every step disabled)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target format
    pub fn format(mut self, format: TargetFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the resize bounds; an unset bound is treated as unbounded
    pub fn max_size(mut self, max_width: Option<u32>, max_height: Option<u32>) -> Self {
        self.max_width = max_width;
        self.max_height = max_height;
        self
    }

    /// Set the compression quality
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Write outputs into a separate directory instead of in place
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Enable the naming pipeline
    pub fn naming(mut self, naming: NamingChain) -> Self {
        self.naming = Some(naming);
        self
    }

    /// Whether any image operation is enabled
    pub fn has_image_ops(&self) -> bool {
        self.format.is_some()
            || self.max_width.is_some()
            || self.max_height.is_some()
            || self.quality.is_some()
    }

    /// Whether a bounded resize is requested
    pub fn has_resize(&self) -> bool {
        self.max_width.is_some() || self.max_height.is_some()
    }

    /// Validate chain parameters
    pub fn validate(&self) -> Result<()> {
        if let Some(quality) = self.quality {
            if quality > 100 {
                return Err(ImaginerError::invalid_parameters(format!(
                    "Quality must be between 0-100, got {quality}"
                )));
            }
        }

        if self.max_width == Some(0) || self.max_height == Some(0) {
            return Err(ImaginerError::invalid_parameters(
                "Resize bounds must be greater than 0",
            ));
        }

        if !self.has_image_ops() && self.naming.is_none() && self.output_dir.is_none() {
            return Err(ImaginerError::invalid_parameters(
                "No operation requested: enable a format, resize, quality or naming step",
            ));
        }

        Ok(())
    }
}
