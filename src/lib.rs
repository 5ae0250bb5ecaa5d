//! Grid: Seekable Directory Images
//!
//! Packs a directory tree into a single binary image whose index can be
//! decoded up front and whose file payloads are read on demand by absolute
//! offset.

pub mod codec;
pub mod config;
pub mod error;
pub mod gridfile;
pub mod image;
pub mod logging;
pub mod path;
pub mod tooling;
pub mod tree;

pub use error::{ApiError, BuildError, GridfileError, ImageError, TreeError};
pub use image::{Image, ImageBuilder};
pub use path::ImagePath;
pub use tree::IndexTree;
