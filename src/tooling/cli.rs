//! CLI Tooling
//!
//! Command-line surfaces for the builder (`grid`) and the explorer
//! (`grider`). Parsing lives in the clap structs; execution lives in
//! [`BuildContext`] and [`ExplorerContext`] so tests can drive both without
//! spawning processes.

use crate::config::ConfigLoader;
use crate::error::ApiError;
use crate::image::{build_from_gridfile, BuildReport, Image};
use crate::logging::{init_logging, LoggingOverrides};
use crate::path::ImagePath;
use crate::tooling::format::{
    format_build_report, format_listing_json, format_listing_text, format_stats_json,
    format_stats_text,
};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Logging and configuration flags shared by both binaries.
#[derive(Args, Debug, Clone, Default)]
pub struct LogArgs {
    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl LogArgs {
    pub fn overrides(&self) -> LoggingOverrides {
        LoggingOverrides {
            verbose: self.verbose,
            level: self.log_level.clone(),
            format: self.log_format.clone(),
            output: self.log_output.clone(),
            file: self.log_file.clone(),
        }
    }

    /// Load configuration, apply these flags, and install the subscriber.
    pub fn init_logging(&self) -> Result<(), ApiError> {
        let config = ConfigLoader::load_optional(self.config.as_deref())?;
        init_logging(Some(&config.logging), &self.overrides())
    }
}

/// Grid - build a seekable image from a directory tree
#[derive(Parser, Debug)]
#[command(name = "grid")]
#[command(about = "Build a grid image from the directory named in a gridfile")]
pub struct BuildCli {
    /// Gridfile: line 1 is the source directory, line 2 the image path
    pub gridfile: PathBuf,

    #[command(flatten)]
    pub logging: LogArgs,
}

/// Grider - explore a grid image
#[derive(Parser, Debug)]
#[command(name = "grider")]
#[command(about = "List directories and print files stored in a grid image")]
pub struct ExplorerCli {
    /// Image file to open
    pub image: PathBuf,

    #[command(subcommand)]
    pub command: ExplorerCommand,

    #[command(flatten)]
    pub logging: LogArgs,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ExplorerCommand {
    /// List a directory (the root when no path is given)
    Ls {
        /// Directory path inside the image
        #[arg(default_value = "")]
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Write a file's contents to stdout
    Cat {
        /// File path inside the image
        path: String,
    },
    /// Show header and region sizes
    Info {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Runs the builder.
pub struct BuildContext {
    gridfile: PathBuf,
}

impl BuildContext {
    pub fn new(gridfile: impl Into<PathBuf>) -> Self {
        Self {
            gridfile: gridfile.into(),
        }
    }

    /// Build the image and return a one-line summary.
    pub fn execute(&self) -> Result<String, ApiError> {
        let report: BuildReport = build_from_gridfile(&self.gridfile)?;
        info!(?report, "build finished");
        Ok(format_build_report(&report))
    }
}

/// Runs explorer commands against one opened image.
pub struct ExplorerContext {
    image: Image,
    color: bool,
}

fn check_format(format: &str) -> Result<(), ApiError> {
    match format {
        "text" | "json" => Ok(()),
        other => Err(ApiError::InvalidArgument(format!(
            "unknown output format '{}' (expected text or json)",
            other
        ))),
    }
}

impl ExplorerContext {
    pub fn open(path: &Path) -> Result<Self, ApiError> {
        Ok(Self {
            image: Image::open(path)?,
            color: false,
        })
    }

    /// Enable ANSI colors in text listings.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Execute `command`, writing its output to `out`.
    ///
    /// Nothing is written when the command fails.
    pub fn execute<W: Write>(&mut self, command: &ExplorerCommand, out: &mut W) -> Result<(), ApiError> {
        match command {
            ExplorerCommand::Ls { path, format } => {
                check_format(format)?;
                let path = ImagePath::parse(path);
                let listing = if path.is_empty() {
                    self.image.root().clone()
                } else {
                    self.image
                        .find_directory(&path)
                        .ok_or_else(|| ApiError::NotFound {
                            kind: "directory",
                            path: path.to_string(),
                        })?
                };
                debug!(path = %path, entries = listing.len(), "listing directory");
                let text = if format == "json" {
                    format!("{}\n", format_listing_json(&path, &listing))
                } else {
                    format_listing_text(&path, &listing, self.color)
                };
                out.write_all(text.as_bytes())?;
            }
            ExplorerCommand::Cat { path } => {
                let path = ImagePath::parse(path);
                if path.is_empty() {
                    return Err(ApiError::InvalidArgument("no path provided".to_string()));
                }
                let content = self.image.read(&path)?.ok_or_else(|| ApiError::NotFound {
                    kind: "file",
                    path: path.to_string(),
                })?;
                debug!(path = %path, len = content.len(), "read file");
                out.write_all(&content)?;
            }
            ExplorerCommand::Info { format } => {
                check_format(format)?;
                let stats = self.image.stats();
                let text = if format == "json" {
                    format!("{}\n", format_stats_json(&stats))
                } else {
                    format_stats_text(&stats)
                };
                out.write_all(text.as_bytes())?;
            }
        }
        out.flush()?;
        Ok(())
    }
}
