//! Imaginer CLI - Batch Image Transformation and Auto-Naming
//!
//! Two subcommands drive one batch pipeline: `convert` enables the image
//! operations (format conversion, bounded resize, compression) and `rename`
//! enables the naming pipeline (caption text through the transform chain,
//! then a collision-safe rename).

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

use imaginer::{
    batch, CaptionerRegistry, CaseMode, FileOutcome, ImaginerError, ModelSize, NamingChain,
    OperationChain, TargetFormat,
};

/// Imaginer - image conversion and caption-driven renaming
#[derive(Parser)]
#[command(
    name = "imaginer",
    version,
    about = "Convert, resize, compress and auto-rename images in batch",
    long_about = "Imaginer applies a fixed-order chain of image transforms (convert -> resize \
                  -> compress) and/or naming transforms (caption -> normalize -> glue -> \
                  prefix -> suffix -> case) to a single image or every image in a folder. \
                  One file's failure never aborts a batch."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output the batch summary as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert, resize and/or compress images
    Convert {
        /// Path to an image file or a folder of images
        path: PathBuf,

        /// Target format
        #[arg(long, value_enum)]
        format: Option<TargetFormat>,

        /// Maximum width in pixels (proportional shrink, never upscales)
        #[arg(long, value_name = "PIXELS")]
        max_width: Option<u32>,

        /// Maximum height in pixels
        #[arg(long, value_name = "PIXELS")]
        max_height: Option<u32>,

        /// Compression quality (0-100, e.g. 80)
        #[arg(long, value_name = "QUALITY")]
        compress: Option<u8>,

        /// Write results into this folder instead of replacing in place
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Generate names from image content and rename files
    Rename {
        /// Path to an image file or a folder of images
        path: PathBuf,

        /// Prepend this string to the resulting name
        #[arg(long)]
        prefix: Option<String>,

        /// Append this string to the resulting name
        #[arg(long)]
        suffix: Option<String>,

        /// Replace spaces with this string in the resulting name
        #[arg(long)]
        glue: Option<String>,

        /// Change case of the resulting name
        #[arg(long, value_enum)]
        case: Option<CaseMode>,

        /// Prompt prefix for conditional naming (e.g. "Bottle of ")
        #[arg(long)]
        context: Option<String>,

        /// Model size for generating the name
        #[arg(long, value_enum, default_value = "small")]
        model: ModelSize,

        /// External caption command invoked as `CMD <image> <model> [context]`;
        /// without it, names reuse the existing file stem
        #[arg(long, value_name = "CMD")]
        caption_cmd: Option<String>,

        /// Copy files into this folder and rename the copies, leaving the
        /// originals untouched
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    imaginer::init(Some(log_level));

    let (path, chain, mut registry) = match build_run(&cli.command) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("{}: {}", style("Error").red().bold(), e);
            process::exit(1);
        }
    };

    let show_progress = path.is_dir() && !cli.quiet && !cli.json;
    let progress = show_progress.then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {pos} processed") {
            pb.set_style(style);
        }
        pb
    });

    let mut lines = Vec::new();
    let mut observer = |outcome: FileOutcome<'_>| {
        match &outcome {
            FileOutcome::Succeeded { input, output } => {
                if input == output {
                    lines.push(format!("Done: {}", output.display()));
                } else {
                    lines.push(format!("{} -> {}", input.display(), output.display()));
                }
            }
            FileOutcome::Failed { input, error } => {
                lines.push(format!(
                    "{} {}: {}",
                    style("Skipped").yellow(),
                    input.display(),
                    error
                ));
            }
        }
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    };

    let result = batch::run_with(&path, &chain, &mut registry, &mut observer);

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    match result {
        Ok(result) => {
            if cli.json {
                print_json_summary(&result);
            } else {
                if !cli.quiet {
                    for line in &lines {
                        println!("{line}");
                    }
                }
                print_summary(&result, cli.quiet);
            }
            info!("Batch complete");
        }
        Err(e) => {
            eprintln!("{}: {}", style("Error").red().bold(), e);
            process::exit(e.exit_code());
        }
    }
}

/// Map a subcommand onto the path, operation chain and captioner service
fn build_run(
    command: &Commands,
) -> Result<(PathBuf, OperationChain, CaptionerRegistry), ImaginerError> {
    match command {
        Commands::Convert {
            path,
            format,
            max_width,
            max_height,
            compress,
            output,
        } => {
            let mut chain = OperationChain::new().max_size(*max_width, *max_height);
            if let Some(format) = format {
                chain = chain.format(*format);
            }
            if let Some(quality) = compress {
                chain = chain.quality(*quality);
            }
            if let Some(output) = output {
                chain = chain.output_dir(output);
            }
            chain.validate()?;
            Ok((path.clone(), chain, CaptionerRegistry::stem_only()))
        }
        Commands::Rename {
            path,
            prefix,
            suffix,
            glue,
            case,
            context,
            model,
            caption_cmd,
            output,
        } => {
            let naming = NamingChain {
                model: caption_cmd.is_some().then_some(*model),
                context: context.clone(),
                glue: glue.clone(),
                prefix: prefix.clone(),
                suffix: suffix.clone(),
                case: *case,
            };
            let mut chain = OperationChain::new().naming(naming);
            if let Some(output) = output {
                chain = chain.output_dir(output);
            }
            chain.validate()?;

            let registry = match caption_cmd {
                Some(cmd) => CaptionerRegistry::external_command(cmd.clone()),
                None => CaptionerRegistry::stem_only(),
            };
            Ok((path.clone(), chain, registry))
        }
    }
}

/// Print the styled batch summary
fn print_summary(result: &batch::BatchResult, quiet: bool) {
    if result.attempted == 0 {
        if !quiet {
            println!("No image files found in that folder.");
        }
        return;
    }

    if !quiet {
        println!(
            "Processed {} of {} file(s).",
            style(result.succeeded).green().bold(),
            result.attempted
        );
    }
    for failure in &result.failures {
        eprintln!(
            "  {}: {}: {}",
            style("Failed").red(),
            failure.path.display(),
            failure.error
        );
    }
}

/// Batch summary serialized for automation
#[derive(Serialize)]
struct JsonSummary {
    attempted: usize,
    succeeded: usize,
    failed: usize,
    failures: Vec<JsonFailure>,
}

#[derive(Serialize)]
struct JsonFailure {
    path: PathBuf,
    error: String,
}

fn print_json_summary(result: &batch::BatchResult) {
    let summary = JsonSummary {
        attempted: result.attempted,
        succeeded: result.succeeded,
        failed: result.failed(),
        failures: result
            .failures
            .iter()
            .map(|f| JsonFailure {
                path: f.path.clone(),
                error: f.error.to_string(),
            })
            .collect(),
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("{}: JSON summary failed: {}", style("Error").red().bold(), e),
    }
}
