//! In-memory index tree
//!
//! The decoded form of an image's index region. Produced once when an image is
//! opened; lookups are pure walks over it.

pub mod node;

pub use node::{validate_name, EntryRef, IndexTree, Offset};
