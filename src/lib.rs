//! Imaginer - Batch Image Transformation and Auto-Naming
//!
//! A library for simple image workflows: format conversion, bounded
//! resizing, quality compression and caption-driven renaming, applied over
//! a single file or a folder with per-file failure isolation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use imaginer::{batch, CaptionerRegistry, OperationChain, TargetFormat};
//! use std::path::Path;
//!
//! let chain = OperationChain::new()
//!     .format(TargetFormat::Webp)
//!     .max_size(Some(1200), None)
//!     .quality(80);
//!
//! let mut captioners = CaptionerRegistry::stem_only();
//! let result = batch::run(Path::new("./images"), &chain, &mut captioners)?;
//!
//! println!("{} of {} files processed", result.succeeded, result.attempted);
//! # Ok::<(), imaginer::ImaginerError>(())
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod caption;
pub mod chain;
pub mod error;
pub mod formats;
pub mod ops;
pub mod renamer;
pub mod text;

// Re-export commonly used types
pub use batch::{BatchResult, FileFailure, FileOutcome};
pub use caption::{Captioner, CaptionerRegistry, ModelSize};
pub use chain::{NamingChain, OperationChain};
pub use error::{ImaginerError, Result};
pub use formats::TargetFormat;
pub use text::CaseMode;

use tracing::info;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging
///
/// Sets up the tracing subscriber from the environment (`RUST_LOG`),
/// falling back to `default_filter` (or `"warn"`) when the variable is
/// unset. Safe to call more than once; later calls are no-ops.
pub fn init(default_filter: Option<&str>) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter.unwrap_or("warn")));

    if tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .is_ok()
    {
        info!("Imaginer v{} initialized", VERSION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_init_is_idempotent() {
        init(Some("debug"));
        init(None);
    }
}
