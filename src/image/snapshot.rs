//! Build-time snapshot of a live directory tree.

use crate::codec::{node_size, WORD};
use crate::error::{BuildError, TreeError};
use crate::tree::validate_name;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A regular file captured from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    pub name: String,
    pub source: PathBuf,
    pub len: u64,
}

/// A directory captured from disk, children sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    name: String,
    directories: Vec<DirectorySnapshot>,
    files: Vec<FileSnapshot>,
    names: HashSet<String>,
}

impl DirectorySnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Walk `root` and capture every directory and regular file below it.
    ///
    /// Symlinks are not followed; they and other special files are skipped.
    pub fn capture(root: &Path) -> Result<Self, BuildError> {
        if !root.is_dir() {
            return Err(BuildError::InvalidRoot(root.to_path_buf()));
        }

        // open directories, indexed by walk depth
        let mut stack = vec![DirectorySnapshot::new("")];
        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry?;
            while stack.len() > entry.depth() {
                close_top(&mut stack)?;
            }

            let name = entry
                .file_name()
                .to_str()
                .ok_or_else(|| BuildError::InvalidName {
                    parent: entry.path().parent().unwrap_or(root).to_path_buf(),
                    name: entry.file_name().to_string_lossy().into_owned(),
                })?
                .to_string();
            let file_type = entry.file_type();

            if file_type.is_dir() {
                stack.push(DirectorySnapshot::new(name));
            } else if file_type.is_file() {
                let len = entry.metadata()?.len();
                let parent = stack
                    .last_mut()
                    .ok_or_else(|| BuildError::InvalidRoot(root.to_path_buf()))?;
                parent.add_file(FileSnapshot {
                    name,
                    source: entry.path().to_path_buf(),
                    len,
                })?;
            } else {
                warn!(
                    path = %entry.path().display(),
                    "skipping entry that is neither a directory nor a regular file"
                );
            }
        }

        while stack.len() > 1 {
            close_top(&mut stack)?;
        }
        let snapshot = stack
            .pop()
            .ok_or_else(|| BuildError::InvalidRoot(root.to_path_buf()))?;
        let (directories, files) = snapshot.count();
        debug!(root = %root.display(), directories, files, "captured source tree");
        Ok(snapshot)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn directories(&self) -> &[DirectorySnapshot] {
        &self.directories
    }

    pub fn files(&self) -> &[FileSnapshot] {
        &self.files
    }

    fn claim(&mut self, name: &str) -> Result<(), TreeError> {
        validate_name(name)?;
        if !self.names.insert(name.to_string()) {
            return Err(TreeError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    pub fn add_directory(&mut self, dir: DirectorySnapshot) -> Result<(), TreeError> {
        self.claim(&dir.name)?;
        self.directories.push(dir);
        Ok(())
    }

    pub fn add_file(&mut self, file: FileSnapshot) -> Result<(), TreeError> {
        self.claim(&file.name)?;
        self.files.push(file);
        Ok(())
    }

    pub fn entry_count(&self) -> u64 {
        (self.directories.len() + self.files.len()) as u64
    }

    /// Encoded size of this directory's own index node.
    pub fn self_size(&self) -> u64 {
        node_size(
            self.directories
                .iter()
                .map(|d| d.name.as_str())
                .chain(self.files.iter().map(|f| f.name.as_str())),
        )
    }

    /// Encoded size of the index region for this directory and everything
    /// below it.
    pub fn table_size(&self) -> u64 {
        self.iter().map(DirectorySnapshot::self_size).sum()
    }

    /// Encoded size of every payload record below this directory.
    pub fn payload_size(&self) -> u64 {
        self.iter()
            .flat_map(|dir| dir.files.iter())
            .map(|file| WORD + file.len)
            .sum()
    }

    /// Number of directories and files below this directory.
    pub fn count(&self) -> (u64, u64) {
        self.iter().fold((0, 0), |(dirs, files), dir| {
            (dirs + dir.directories.len() as u64, files + dir.files.len() as u64)
        })
    }

    /// This directory and all descendants, pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &DirectorySnapshot> {
        let mut pending = vec![self];
        std::iter::from_fn(move || {
            let next = pending.pop()?;
            pending.extend(next.directories.iter().rev());
            Some(next)
        })
    }
}

fn close_top(stack: &mut Vec<DirectorySnapshot>) -> Result<(), BuildError> {
    if let Some(done) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.add_directory(done)?;
        }
    }
    Ok(())
}
