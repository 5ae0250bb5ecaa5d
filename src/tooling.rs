//! Tooling & Integration Layer
//!
//! Command-line surfaces for building and exploring images, plus the text
//! formatting they share.

pub mod cli;
pub mod format;

pub use cli::{BuildCli, BuildContext, ExplorerCli, ExplorerCommand, ExplorerContext, LogArgs};
