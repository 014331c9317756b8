//! RIFF chunk walking
//!
//! A RIFF stream is a sequence of chunks, each an 8-byte header (4-byte tag,
//! 4-byte little-endian body size) followed by the body. The walker scans
//! forward from the current stream position, skipping chunks it was not asked
//! for, until the requested tag is found or the stream runs out.

use std::fmt;
use std::io::{Read, Seek, SeekFrom};

use crate::error::{Error, Result};

/// Four-byte RIFF chunk identifier.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ChunkTag(pub [u8; 4]);

/// Tag of the format chunk (note the trailing space).
pub const TAG_FMT: ChunkTag = ChunkTag(*b"fmt ");

/// Tag of the sample data chunk.
pub const TAG_DATA: ChunkTag = ChunkTag(*b"data");

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{byte:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkTag(\"{self}\")")
    }
}

/// Parsed chunk header.
///
/// `size` counts only the body that follows; the 8 header bytes are not
/// included.
#[derive(Debug, Clone, Copy)]
pub struct ChunkHeader {
    pub tag: ChunkTag,
    pub size: u32,
}

/// Scans forward from the current position for a chunk tagged `target`.
///
/// On success the stream is positioned at the start of the chunk body and the
/// declared body size is returned. Chunks with other tags are skipped over,
/// including the conventional pad byte after an odd-sized body, so an
/// odd-sized chunk never misaligns the scan.
///
/// Declared sizes are bounded against the actual stream length: a skip that
/// would overrun the end of the stream fails with `ChunkNotFound` instead of
/// seeking past it. A header that can only be partially read fails with
/// `TruncatedHeader`; a cleanly exhausted stream fails with `ChunkNotFound`.
pub fn find_chunk<R: Read + Seek>(stream: &mut R, target: ChunkTag) -> Result<u32> {
    let start = stream.stream_position()?;
    let stream_len = stream.seek(SeekFrom::End(0))?;
    stream.seek(SeekFrom::Start(start))?;

    loop {
        let header = match read_chunk_header(stream, target)? {
            Some(header) => header,
            None => return Err(Error::ChunkNotFound { tag: target }),
        };

        if header.tag == target {
            return Ok(header.size);
        }

        // Skip the body plus the pad byte RIFF appends after odd-sized bodies.
        let skip = u64::from(header.size) + u64::from(header.size & 1);
        let position = stream.stream_position()?;
        match position.checked_add(skip) {
            Some(next) if next <= stream_len => {
                stream.seek(SeekFrom::Current(skip as i64))?;
            }
            _ => return Err(Error::ChunkNotFound { tag: target }),
        }
    }
}

/// Reads one 8-byte chunk header.
///
/// Returns `None` on a clean end of stream (zero bytes available) and
/// `TruncatedHeader` when only part of a header remains.
fn read_chunk_header<R: Read>(stream: &mut R, target: ChunkTag) -> Result<Option<ChunkHeader>> {
    let mut raw = [0u8; 8];
    let mut filled = 0;
    while filled < raw.len() {
        let count = stream.read(&mut raw[filled..])?;
        if count == 0 {
            break;
        }
        filled += count;
    }

    match filled {
        0 => Ok(None),
        8 => Ok(Some(ChunkHeader {
            tag: ChunkTag([raw[0], raw[1], raw[2], raw[3]]),
            size: u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]),
        })),
        _ => Err(Error::TruncatedHeader { tag: target }),
    }
}
