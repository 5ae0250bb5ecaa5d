//! Index tree nodes and path resolution

use crate::error::TreeError;
use crate::path::{ImagePath, SEPARATOR};
use serde::Serialize;
use std::collections::BTreeMap;

/// Absolute byte offset of a payload record inside an image.
pub type Offset = u64;

/// One directory listing of an image.
///
/// Subdirectories live in `nested`, files in `contained` (mapped to their
/// payload offsets). Both maps share a single namespace: a name may appear in
/// at most one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexTree {
    nested: BTreeMap<String, IndexTree>,
    contained: BTreeMap<String, Offset>,
}

/// What a name in a node refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRef<'a> {
    Directory(&'a IndexTree),
    File(Offset),
}

/// Check that a name can be stored in an index entry: non-empty, with no NUL
/// and no `/`.
pub fn validate_name(name: &str) -> Result<(), TreeError> {
    if name.is_empty() || name.as_bytes().contains(&0) || name.contains(SEPARATOR) {
        return Err(TreeError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl IndexTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nested(&self) -> &BTreeMap<String, IndexTree> {
        &self.nested
    }

    pub fn contained(&self) -> &BTreeMap<String, Offset> {
        &self.contained
    }

    /// Number of entries in this node (not recursive).
    pub fn len(&self) -> usize {
        self.nested.len() + self.contained.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nested.is_empty() && self.contained.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nested.contains_key(name) || self.contained.contains_key(name)
    }

    pub fn insert_directory(
        &mut self,
        name: impl Into<String>,
        tree: IndexTree,
    ) -> Result<(), TreeError> {
        let name = name.into();
        self.check_insertable(&name)?;
        self.nested.insert(name, tree);
        Ok(())
    }

    pub fn insert_file(&mut self, name: impl Into<String>, offset: Offset) -> Result<(), TreeError> {
        let name = name.into();
        self.check_insertable(&name)?;
        self.contained.insert(name, offset);
        Ok(())
    }

    fn check_insertable(&self, name: &str) -> Result<(), TreeError> {
        validate_name(name)?;
        if self.contains(name) {
            return Err(TreeError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    /// Resolve `path` relative to this node.
    ///
    /// Every segment but the last must name a subdirectory; the last segment
    /// may name either kind. Empty paths resolve to nothing.
    pub fn lookup(&self, path: &ImagePath) -> Option<EntryRef<'_>> {
        let (last, parents) = path.segments().split_last()?;
        let mut node = self;
        for segment in parents {
            node = node.nested.get(segment)?;
        }
        if let Some(dir) = node.nested.get(last) {
            return Some(EntryRef::Directory(dir));
        }
        node.contained.get(last).map(|offset| EntryRef::File(*offset))
    }

    pub fn exists(&self, path: &ImagePath) -> bool {
        self.lookup(path).is_some()
    }

    pub fn is_directory(&self, path: &ImagePath) -> bool {
        matches!(self.lookup(path), Some(EntryRef::Directory(_)))
    }

    pub fn is_regular_file(&self, path: &ImagePath) -> bool {
        matches!(self.lookup(path), Some(EntryRef::File(_)))
    }

    /// Borrow the subtree at `path`.
    pub fn directory(&self, path: &ImagePath) -> Option<&IndexTree> {
        match self.lookup(path)? {
            EntryRef::Directory(dir) => Some(dir),
            EntryRef::File(_) => None,
        }
    }

    /// Detached copy of the subtree at `path`, usable as a root for further
    /// relative lookups.
    pub fn find_directory(&self, path: &ImagePath) -> Option<IndexTree> {
        self.directory(path).cloned()
    }

    /// Payload offset of the file at `path`.
    pub fn find_file(&self, path: &ImagePath) -> Option<Offset> {
        match self.lookup(path)? {
            EntryRef::File(offset) => Some(offset),
            EntryRef::Directory(_) => None,
        }
    }

    /// Count directories and files below this node (this node excluded).
    pub fn count_entries(&self) -> (u64, u64) {
        let mut directories = 0u64;
        let mut files = 0u64;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            directories += node.nested.len() as u64;
            files += node.contained.len() as u64;
            pending.extend(node.nested.values());
        }
        (directories, files)
    }

    /// Every file below this node with its path relative to this node, in
    /// name order.
    pub fn files(&self) -> Vec<(ImagePath, Offset)> {
        let mut out = Vec::new();
        let mut pending = vec![(ImagePath::new(), self)];
        while let Some((prefix, node)) = pending.pop() {
            for (name, offset) in &node.contained {
                let mut file_path = prefix.clone();
                file_path.push(name.as_str());
                out.push((file_path, *offset));
            }
            for (name, child) in &node.nested {
                let mut child_path = prefix.clone();
                child_path.push(name.as_str());
                pending.push((child_path, child));
            }
        }
        out.sort_by(|a, b| a.0.segments().cmp(b.0.segments()));
        out
    }
}
