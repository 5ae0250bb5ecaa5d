//! Image reader
//!
//! Opens an image, decodes its whole index once, and answers lookups from the
//! in-memory tree. Only payload reads go back to the stream.

use crate::codec::{decode_table, read_header, read_payload, Header};
use crate::error::ImageError;
use crate::path::ImagePath;
use crate::tree::{IndexTree, Offset};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::{debug, info};

/// Summary of an opened image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageStats {
    pub image_size: u64,
    pub table_size: u64,
    pub payload_offset: u64,
    pub payload_size: u64,
    pub directories: u64,
    pub files: u64,
}

/// An opened image.
///
/// Lookups borrow the decoded tree; payload reads move the stream cursor and
/// therefore need `&mut self`.
#[derive(Debug)]
pub struct Image<R = BufReader<File>> {
    stream: R,
    header: Header,
    root: IndexTree,
}

impl Image<BufReader<File>> {
    /// Open the image at `path` and decode its index.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ImageError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let image = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            table_size = image.header.table_size,
            "opened image"
        );
        Ok(image)
    }
}

impl<R: Read + Seek> Image<R> {
    /// Decode the header and index from an already opened stream.
    pub fn from_reader(mut stream: R) -> Result<Self, ImageError> {
        let header = read_header(&mut stream)?;
        let root = decode_table(&mut stream, &header)?;
        debug!(
            stream_len = header.stream_len,
            payload_offset = header.payload_offset(),
            entries = root.len(),
            "decoded image index"
        );
        Ok(Self {
            stream,
            header,
            root,
        })
    }

    pub fn root(&self) -> &IndexTree {
        &self.root
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn table_size(&self) -> u64 {
        self.header.table_size
    }

    pub fn payload_offset(&self) -> u64 {
        self.header.payload_offset()
    }

    /// Length of the underlying stream in bytes.
    pub fn image_size(&self) -> u64 {
        self.header.stream_len
    }

    pub fn exists(&self, path: &ImagePath) -> bool {
        self.root.exists(path)
    }

    pub fn is_directory(&self, path: &ImagePath) -> bool {
        self.root.is_directory(path)
    }

    pub fn is_regular_file(&self, path: &ImagePath) -> bool {
        self.root.is_regular_file(path)
    }

    /// Detached copy of the directory at `path`.
    pub fn find_directory(&self, path: &ImagePath) -> Option<IndexTree> {
        self.root.find_directory(path)
    }

    /// Payload offset of the file at `path`.
    pub fn find_file(&self, path: &ImagePath) -> Option<Offset> {
        self.root.find_file(path)
    }

    /// Contents of the file at `path`; `Ok(None)` when no such file exists.
    pub fn read(&mut self, path: &ImagePath) -> Result<Option<Vec<u8>>, ImageError> {
        match self.find_file(path) {
            Some(offset) => self.read_at(offset).map(Some),
            None => Ok(None),
        }
    }

    /// Contents of the payload record at `offset`, typically taken from a
    /// detached subtree.
    pub fn read_at(&mut self, offset: Offset) -> Result<Vec<u8>, ImageError> {
        read_payload(&mut self.stream, offset, self.header.stream_len)
    }

    pub fn stats(&self) -> ImageStats {
        let (directories, files) = self.root.count_entries();
        ImageStats {
            image_size: self.header.stream_len,
            table_size: self.header.table_size,
            payload_offset: self.header.payload_offset(),
            payload_size: self.header.stream_len - self.header.payload_offset(),
            directories,
            files,
        }
    }

    pub fn into_inner(self) -> R {
        self.stream
    }
}
