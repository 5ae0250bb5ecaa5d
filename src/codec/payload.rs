//! Payload records: an 8-byte length followed by raw content.

use super::{read_u64, write_u64, PAYLOAD_CHUNK, WORD};
use crate::error::ImageError;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Read the payload record at `offset`.
///
/// `stream_len` bounds the declared length before anything is allocated; a
/// record running past it, or any short chunk, is a truncated payload.
pub fn read_payload<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    stream_len: u64,
) -> Result<Vec<u8>, ImageError> {
    let available = stream_len.saturating_sub(offset);
    if available < WORD {
        return Err(ImageError::TruncatedPayload {
            offset,
            expected: WORD,
            actual: available,
        });
    }

    reader.seek(SeekFrom::Start(offset))?;
    let len = read_u64(reader)?;
    let available = available - WORD;
    if len > available {
        return Err(ImageError::TruncatedPayload {
            offset,
            expected: len,
            actual: available,
        });
    }

    let mut data = Vec::with_capacity(len as usize);
    let mut chunk = [0u8; PAYLOAD_CHUNK];
    let mut rest = len;
    while rest > 0 {
        let want = rest.min(PAYLOAD_CHUNK as u64) as usize;
        match reader.read_exact(&mut chunk[..want]) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(ImageError::TruncatedPayload {
                    offset,
                    expected: len,
                    actual: data.len() as u64,
                })
            }
            Err(e) => return Err(e.into()),
        }
        data.extend_from_slice(&chunk[..want]);
        rest -= want as u64;
    }
    Ok(data)
}

/// Write a payload record declaring `len` bytes and copy up to `len` bytes of
/// `source` after it.
///
/// Returns the number of bytes copied; a value below `len` means `source`
/// ended early and the record is incomplete.
pub fn copy_payload<R: Read, W: Write>(
    source: &mut R,
    writer: &mut W,
    len: u64,
) -> io::Result<u64> {
    write_u64(writer, len)?;
    let mut chunk = [0u8; PAYLOAD_CHUNK];
    let mut copied = 0u64;
    while copied < len {
        let want = (len - copied).min(PAYLOAD_CHUNK as u64) as usize;
        let read = match source.read(&mut chunk[..want]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&chunk[..read])?;
        copied += read as u64;
    }
    Ok(copied)
}
