//! Images
//!
//! The builder turns a directory tree on disk into an image; the reader opens
//! an image and resolves paths against its index. The two halves share only
//! the on-disk format defined in [`crate::codec`].

pub mod builder;
pub mod reader;
pub mod snapshot;

pub use builder::{build_from_gridfile, BuildReport, ImageBuilder};
pub use reader::{Image, ImageStats};
pub use snapshot::{DirectorySnapshot, FileSnapshot};
