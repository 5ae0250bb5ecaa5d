//! Error types for image building, reading, and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while inserting entries into an index tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("duplicate entry name: {0:?}")]
    DuplicateName(String),

    #[error("invalid entry name: {0:?}")]
    InvalidName(String),
}

/// Errors raised while opening or reading an image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("unable to open image {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image corrupted: {0}")]
    Corrupted(String),

    #[error("truncated payload at offset {offset}: expected {expected} bytes, got {actual}")]
    TruncatedPayload {
        offset: u64,
        expected: u64,
        actual: u64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Errors raised by the two-line gridfile parser.
#[derive(Debug, Error)]
pub enum GridfileError {
    #[error("unable to open gridfile {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("gridfile is invalid: too few lines ({0})")]
    TooFewLines(usize),

    #[error("gridfile is invalid: too many lines ({0})")]
    TooManyLines(usize),
}

/// Errors raised while snapshotting a source tree or emitting an image.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Gridfile(#[from] GridfileError),

    #[error("provided root is not a directory: {0:?}")]
    InvalidRoot(PathBuf),

    #[error("unable to open source file {path:?}: {source}")]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("short read from {path:?}: expected {expected} bytes, got {actual}")]
    ShortRead {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("unusable destination {path:?}: {reason}")]
    Destination { path: PathBuf, reason: String },

    #[error("invalid entry name under {parent:?}: {name}")]
    InvalidName { parent: PathBuf, name: String },

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the command-line layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("unable to find {kind}: {path}")]
    NotFound { kind: &'static str, path: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
