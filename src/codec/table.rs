//! Header and index region decoding

use super::{read_entry, read_u64, EntryKind, HEADER_SIZE, MIN_ENTRY_SIZE, WORD};
use crate::error::ImageError;
use crate::tree::{validate_name, IndexTree};
use std::collections::HashSet;
use std::io::{self, Read, Seek, SeekFrom};
use tracing::{debug, trace};

/// Decoded image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Length of the index region, header excluded.
    pub table_size: u64,
    /// Length of the whole stream.
    pub stream_len: u64,
}

impl Header {
    /// First byte of the payload region.
    pub fn payload_offset(&self) -> u64 {
        HEADER_SIZE + self.table_size
    }

    /// Most nodes an index region of this size can hold.
    fn node_budget(&self) -> u64 {
        self.table_size / WORD
    }
}

fn truncated(context: &str, err: io::Error) -> ImageError {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => {
            ImageError::Corrupted(format!("{context}: unexpected end of stream"))
        }
        io::ErrorKind::InvalidData => ImageError::Corrupted(format!("{context}: {err}")),
        _ => ImageError::Io(err),
    }
}

/// Read and validate the header.
pub fn read_header<R: Read + Seek>(reader: &mut R) -> Result<Header, ImageError> {
    let stream_len = reader.seek(SeekFrom::End(0))?;
    if stream_len < HEADER_SIZE {
        return Err(ImageError::Corrupted(format!(
            "stream is {stream_len} bytes, shorter than the {HEADER_SIZE}-byte header"
        )));
    }
    reader.seek(SeekFrom::Start(0))?;
    let table_size = read_u64(reader).map_err(|e| truncated("header", e))?;

    let fits = HEADER_SIZE
        .checked_add(table_size)
        .map(|end| end <= stream_len)
        .unwrap_or(false);
    if !fits {
        return Err(ImageError::Corrupted(format!(
            "index region of {table_size} bytes does not fit in a {stream_len}-byte stream"
        )));
    }

    Ok(Header {
        table_size,
        stream_len,
    })
}

/// A node whose entries are still being read.
struct PendingNode {
    name: Option<String>,
    tree: IndexTree,
    remaining: u64,
    cursor: u64,
}

/// Opens index nodes, each offset at most once.
struct NodeOpener<'h> {
    header: &'h Header,
    opened: HashSet<u64>,
}

impl NodeOpener<'_> {
    fn open<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        offset: u64,
        name: Option<String>,
    ) -> Result<PendingNode, ImageError> {
        let in_region = offset >= HEADER_SIZE
            && offset
                .checked_add(WORD)
                .map(|end| end <= self.header.payload_offset())
                .unwrap_or(false);
        if !in_region {
            return Err(ImageError::Corrupted(format!(
                "directory pointer {offset} lies outside the index region"
            )));
        }

        // every directory owns its node; a repeat is a cycle or a shared node
        if !self.opened.insert(offset) {
            return Err(ImageError::Corrupted(format!(
                "index node at {offset} is referenced more than once"
            )));
        }
        if self.opened.len() as u64 > self.header.node_budget() {
            return Err(ImageError::Corrupted(
                "index references more nodes than the region can hold".to_string(),
            ));
        }

        reader.seek(SeekFrom::Start(offset))?;
        let count = read_u64(reader).map_err(|e| truncated("entry count", e))?;
        let fits = count
            .checked_mul(MIN_ENTRY_SIZE)
            .map(|size| size <= self.header.table_size)
            .unwrap_or(false);
        if !fits {
            return Err(ImageError::Corrupted(format!(
                "node at {offset} claims {count} entries"
            )));
        }

        trace!(offset, count, "opened index node");
        Ok(PendingNode {
            name,
            tree: IndexTree::new(),
            remaining: count,
            cursor: offset + WORD,
        })
    }
}

fn decode_name(raw: Vec<u8>, at: u64) -> Result<String, ImageError> {
    let name = String::from_utf8(raw)
        .map_err(|_| ImageError::Corrupted(format!("entry name at {at} is not valid UTF-8")))?;
    validate_name(&name)
        .map_err(|e| ImageError::Corrupted(format!("entry at {at}: {e}")))?;
    Ok(name)
}

/// Decode the whole index region into a tree rooted at [`HEADER_SIZE`].
///
/// Nested nodes are decoded depth-first through an explicit stack, so deep or
/// hostile images cannot exhaust the call stack. Payloads are never touched.
pub fn decode_table<R: Read + Seek>(
    reader: &mut R,
    header: &Header,
) -> Result<IndexTree, ImageError> {
    let mut opener = NodeOpener {
        header,
        opened: HashSet::new(),
    };
    let mut stack = vec![opener.open(reader, HEADER_SIZE, None)?];

    while let Some(mut node) = stack.pop() {
        if node.remaining == 0 {
            match (node.name, stack.last_mut()) {
                (Some(name), Some(parent)) => parent
                    .tree
                    .insert_directory(name, node.tree)
                    .map_err(|e| ImageError::Corrupted(e.to_string()))?,
                _ => {
                    debug!(nodes = opener.opened.len(), "decoded index region");
                    return Ok(node.tree);
                }
            }
            continue;
        }

        reader.seek(SeekFrom::Start(node.cursor))?;
        let limit = header.payload_offset().saturating_sub(node.cursor);
        let entry = read_entry(reader, limit).map_err(|e| truncated("index entry", e))?;
        let name = decode_name(entry.name, node.cursor)?;
        node.cursor = reader.stream_position()?;
        node.remaining -= 1;

        match entry.kind {
            EntryKind::Directory => {
                if node.tree.contains(&name) {
                    return Err(ImageError::Corrupted(format!(
                        "duplicate entry name: {name:?}"
                    )));
                }
                let child = opener.open(reader, entry.pointer, Some(name))?;
                stack.push(node);
                stack.push(child);
            }
            EntryKind::File => {
                node.tree
                    .insert_file(name, entry.pointer)
                    .map_err(|e| ImageError::Corrupted(e.to_string()))?;
                stack.push(node);
            }
        }
    }

    Err(ImageError::Corrupted("index region has no root".to_string()))
}
