//! Image codec
//!
//! Primitive encoders and decoders shared by the reader and the builder. Every
//! integer on disk is an unsigned 64-bit little-endian word, regardless of the
//! host's pointer width.
//!
//! Layout:
//!
//! ```text
//! [0, 8)                 table_size (index region length, header excluded)
//! [8, 8 + table_size)    index region, root node at 8
//! [8 + table_size, ..)   payload region
//!
//! node    := count:u64 entry{count}
//! entry   := tag:u8 name NUL pointer:u64
//! payload := len:u64 bytes{len}
//! ```

pub mod payload;
pub mod table;

use std::io::{self, Read, Seek, SeekFrom, Write};

pub use payload::{copy_payload, read_payload};
pub use table::{decode_table, read_header, Header};

/// Width of every on-disk integer.
pub const WORD: u64 = 8;

/// Offset of the root node (just past the `table_size` header).
pub const HEADER_SIZE: u64 = WORD;

/// Tag byte for directory entries. Any other tag decodes as a file.
pub const DIRECTORY_TAG: u8 = b'd';

/// Tag byte written for file entries.
pub const FILE_TAG: u8 = b'f';

/// Chunk size used when scanning for a name terminator.
pub const NAME_SCAN_CHUNK: usize = 64;

/// Chunk size used for payload copies.
pub const PAYLOAD_CHUNK: usize = 4096;

/// Smallest possible entry: tag, one name byte, NUL, pointer.
pub const MIN_ENTRY_SIZE: u64 = 1 + 1 + 1 + WORD;

/// Kind of an index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

impl EntryKind {
    pub fn from_tag(tag: u8) -> Self {
        if tag == DIRECTORY_TAG {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            EntryKind::Directory => DIRECTORY_TAG,
            EntryKind::File => FILE_TAG,
        }
    }
}

/// An index entry as stored on disk, before it is attached to a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub kind: EntryKind,
    pub name: Vec<u8>,
    pub pointer: u64,
}

pub fn read_u64<R: Read>(reader: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; WORD as usize];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

pub fn write_u64<W: Write>(writer: &mut W, value: u64) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Encoded size of one entry named `name`.
pub fn entry_size(name: &str) -> u64 {
    1 + name.len() as u64 + 1 + WORD
}

/// Encoded size of one node holding entries with the given names.
pub fn node_size<'a, I>(names: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .fold(WORD, |acc, name| acc + entry_size(name))
}

/// Read a NUL-terminated name of at most `limit` bytes, terminator included.
///
/// The stream is scanned in [`NAME_SCAN_CHUNK`] reads; on return the cursor
/// sits exactly one byte past the terminator, whichever chunk it fell in.
/// A name still unterminated after `limit` bytes is `InvalidData`.
pub fn read_name<R: Read + Seek>(reader: &mut R, limit: u64) -> io::Result<Vec<u8>> {
    let mut name = Vec::new();
    let mut chunk = [0u8; NAME_SCAN_CHUNK];
    loop {
        let left = limit.saturating_sub(name.len() as u64);
        if left == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("entry name exceeds {limit} bytes"),
            ));
        }
        let want = left.min(NAME_SCAN_CHUNK as u64) as usize;
        let read = match reader.read(&mut chunk[..want]) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "unterminated entry name",
                ))
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if let Some(nul) = chunk[..read].iter().position(|b| *b == 0) {
            name.extend_from_slice(&chunk[..nul]);
            let overshoot = (read - nul - 1) as i64;
            if overshoot > 0 {
                reader.seek(SeekFrom::Current(-overshoot))?;
            }
            return Ok(name);
        }
        name.extend_from_slice(&chunk[..read]);
    }
}

/// Read one entry whose bytes must all fall within the next `limit` bytes.
pub fn read_entry<R: Read + Seek>(reader: &mut R, limit: u64) -> io::Result<RawEntry> {
    if limit < MIN_ENTRY_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "entry runs past the index region",
        ));
    }
    let mut tag = [0u8; 1];
    reader.read_exact(&mut tag)?;
    // tag and pointer are outside the name's share
    let name = read_name(reader, limit - 1 - WORD)?;
    let pointer = read_u64(reader)?;
    Ok(RawEntry {
        kind: EntryKind::from_tag(tag[0]),
        name,
        pointer,
    })
}

pub fn write_entry<W: Write>(
    writer: &mut W,
    kind: EntryKind,
    name: &str,
    pointer: u64,
) -> io::Result<()> {
    let mut buf = Vec::with_capacity(entry_size(name) as usize);
    buf.push(kind.tag());
    buf.extend_from_slice(name.as_bytes());
    buf.push(0);
    buf.extend_from_slice(&pointer.to_le_bytes());
    writer.write_all(&buf)
}
