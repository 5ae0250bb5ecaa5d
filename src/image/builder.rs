//! Image builder
//!
//! Emits an image from a [`DirectorySnapshot`]. Two cursors are threaded
//! through a pre-order walk of the snapshot:
//!
//! * `table` is the next free byte of the index region. Each directory claims
//!   it as its own node offset and advances it by the node's own size, so a
//!   child's node lands wherever the cursor stands when the walk descends.
//! * `bunch` is the next free byte of the payload region, starting right after
//!   the index. A directory's file payloads are written after all of its
//!   subdirectories have been emitted.
//!
//! Pointers are absolute offsets written as the walk goes; nothing is patched
//! after the fact.

use super::snapshot::DirectorySnapshot;
use crate::codec::{copy_payload, entry_size, write_entry, write_u64, EntryKind, HEADER_SIZE, WORD};
use crate::error::BuildError;
use crate::gridfile::Gridfile;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, info, trace};

/// Summary of a finished build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub table_size: u64,
    pub payload_size: u64,
    pub directories: u64,
    pub files: u64,
}

impl BuildReport {
    pub fn image_size(&self) -> u64 {
        HEADER_SIZE + self.table_size + self.payload_size
    }
}

/// Builds images from a captured directory tree.
#[derive(Debug, Clone)]
pub struct ImageBuilder {
    root: DirectorySnapshot,
}

struct Cursors {
    table: u64,
    bunch: u64,
}

/// A directory whose entries are being emitted.
struct Frame<'a> {
    dir: &'a DirectorySnapshot,
    write_pos: u64,
    next_dir: usize,
}

/// Claim an index node for `dir` and write its entry count.
fn enter<'a, W: Write + Seek>(
    out: &mut W,
    dir: &'a DirectorySnapshot,
    cursors: &mut Cursors,
) -> Result<Frame<'a>, BuildError> {
    let at = cursors.table;
    cursors.table += dir.self_size();
    out.seek(SeekFrom::Start(at))?;
    write_u64(out, dir.entry_count())?;
    trace!(name = dir.name(), offset = at, "claimed index node");
    Ok(Frame {
        dir,
        write_pos: at + WORD,
        next_dir: 0,
    })
}

impl ImageBuilder {
    pub fn new(root: DirectorySnapshot) -> Self {
        Self { root }
    }

    /// Capture the directory tree at `root`.
    pub fn from_directory(root: &Path) -> Result<Self, BuildError> {
        Ok(Self::new(DirectorySnapshot::capture(root)?))
    }

    pub fn snapshot(&self) -> &DirectorySnapshot {
        &self.root
    }

    /// Emit the image into `out`, starting at byte 0.
    pub fn write_to<W: Write + Seek>(&self, out: &mut W) -> Result<BuildReport, BuildError> {
        let table_size = self.root.table_size();
        let mut cursors = Cursors {
            table: HEADER_SIZE,
            bunch: HEADER_SIZE + table_size,
        };

        out.seek(SeekFrom::Start(0))?;
        write_u64(out, table_size)?;

        let mut stack = vec![enter(out, &self.root, &mut cursors)?];
        loop {
            let Some(frame) = stack.last_mut() else {
                break;
            };
            let dir = frame.dir;

            if let Some(child) = dir.directories().get(frame.next_dir) {
                frame.next_dir += 1;
                out.seek(SeekFrom::Start(frame.write_pos))?;
                write_entry(out, EntryKind::Directory, child.name(), cursors.table)?;
                frame.write_pos += entry_size(child.name());
                let child_frame = enter(out, child, &mut cursors)?;
                stack.push(child_frame);
                continue;
            }

            let mut write_pos = frame.write_pos;
            stack.pop();
            for file in dir.files() {
                out.seek(SeekFrom::Start(write_pos))?;
                write_entry(out, EntryKind::File, &file.name, cursors.bunch)?;
                write_pos += entry_size(&file.name);

                out.seek(SeekFrom::Start(cursors.bunch))?;
                let mut source = File::open(&file.source).map_err(|source| {
                    BuildError::SourceOpen {
                        path: file.source.clone(),
                        source,
                    }
                })?;
                let copied = copy_payload(&mut source, out, file.len)?;
                if copied != file.len {
                    return Err(BuildError::ShortRead {
                        path: file.source.clone(),
                        expected: file.len,
                        actual: copied,
                    });
                }
                trace!(name = %file.name, offset = cursors.bunch, len = file.len, "wrote payload");
                cursors.bunch += WORD + file.len;
            }
        }
        out.flush()?;

        debug_assert_eq!(cursors.table, HEADER_SIZE + table_size);
        let (directories, files) = self.root.count();
        let report = BuildReport {
            table_size,
            payload_size: cursors.bunch - HEADER_SIZE - table_size,
            directories,
            files,
        };
        debug!(?report, "emitted image");
        Ok(report)
    }

    /// Write the image to `dest`.
    ///
    /// The image is emitted into a temporary file next to `dest` and renamed
    /// over it only once complete, so a failed build never leaves a partial
    /// image at `dest`.
    pub fn write_image(&self, dest: &Path) -> Result<BuildReport, BuildError> {
        let existing = std::fs::symlink_metadata(dest).ok();
        if let Some(meta) = &existing {
            if !meta.is_file() {
                return Err(BuildError::Destination {
                    path: dest.to_path_buf(),
                    reason: "exists and is not a regular file".to_string(),
                });
            }
        }

        let parent = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let temp = tempfile::Builder::new()
            .prefix(".grid-")
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(|e| BuildError::Destination {
                path: dest.to_path_buf(),
                reason: format!("unable to create temporary file: {e}"),
            })?;

        let report = {
            let mut writer = BufWriter::new(temp.as_file());
            let report = self.write_to(&mut writer)?;
            writer.flush()?;
            report
        };
        #[cfg(unix)]
        temp.as_file()
            .set_permissions(publish_permissions(existing.as_ref()))?;
        temp.as_file().sync_all()?;
        temp.persist(dest).map_err(|e| BuildError::Destination {
            path: dest.to_path_buf(),
            reason: e.error.to_string(),
        })?;

        info!(path = %dest.display(), size = report.image_size(), "published image");
        Ok(report)
    }
}

/// Mode of the image being replaced, or 0644 for a new one.
#[cfg(unix)]
fn publish_permissions(existing: Option<&std::fs::Metadata>) -> std::fs::Permissions {
    use std::os::unix::fs::PermissionsExt;
    match existing {
        Some(meta) => meta.permissions(),
        None => std::fs::Permissions::from_mode(0o644),
    }
}

/// Build the image described by the gridfile at `path`.
pub fn build_from_gridfile(path: &Path) -> Result<BuildReport, BuildError> {
    info!(gridfile = %path.display(), "reading gridfile");
    let gridfile = Gridfile::load(path)?;
    info!(
        root = %gridfile.root.display(),
        image = %gridfile.image.display(),
        "gridfile loaded"
    );

    let builder = ImageBuilder::from_directory(&gridfile.root)?;
    info!(
        tables = builder.snapshot().table_size(),
        bunch = builder.snapshot().payload_size(),
        "computed layout"
    );
    builder.write_image(&gridfile.image)
}
