//! WAVE file decoding
//!
//! Validates the RIFF/WAVE envelope, then locates the `fmt ` and `data`
//! chunks independently of their order and materializes the whole sample
//! payload in memory. Only linear PCM at 8 or 16 bits per sample is accepted.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::audio::{PcmBuffer, SampleFormat};
use crate::error::{Error, Result};
use crate::wave::chunk::{find_chunk, TAG_DATA, TAG_FMT};

const MAGIC_RIFF: [u8; 4] = *b"RIFF";
const MAGIC_WAVE: [u8; 4] = *b"WAVE";

const FORMAT_ID_LINEAR_PCM: u16 = 0x1;

/// Minimum `fmt ` body: format id, channels, sample rate, byte rate, block
/// align, bits per sample.
const FMT_BODY_MIN: usize = 16;

/// Raw `fmt ` chunk fields as stored in the file.
#[derive(Debug, Clone, Copy)]
pub struct FormatDescriptor {
    /// Codec tag; only `1` (linear PCM) is accepted
    pub format_id: u16,

    /// Interleaved channel count
    pub channels: u16,

    /// Samples per second per channel
    pub sample_rate: u32,

    /// Declared average byte rate; informational, not validated
    pub bytes_per_sec: u32,

    /// Declared frame size in bytes; informational, not validated
    pub block_align: u16,

    /// Bit depth; only 8 and 16 are accepted
    pub bits_per_sample: u16,
}

impl FormatDescriptor {
    /// Parses the leading 16 bytes of a `fmt ` chunk body.
    ///
    /// Extension fields some writers append (e.g. the 18-byte variant) are
    /// ignored.
    fn from_bytes(body: &[u8]) -> Result<Self> {
        if body.len() < FMT_BODY_MIN {
            return Err(Error::FmtChunkTruncated);
        }

        Ok(Self {
            format_id: u16::from_le_bytes([body[0], body[1]]),
            channels: u16::from_le_bytes([body[2], body[3]]),
            sample_rate: u32::from_le_bytes([body[4], body[5], body[6], body[7]]),
            bytes_per_sec: u32::from_le_bytes([body[8], body[9], body[10], body[11]]),
            block_align: u16::from_le_bytes([body[12], body[13]]),
            bits_per_sample: u16::from_le_bytes([body[14], body[15]]),
        })
    }

    /// Maps the descriptor to the output-facing sample format.
    pub fn sample_format(&self) -> Result<SampleFormat> {
        if self.format_id != FORMAT_ID_LINEAR_PCM {
            return Err(Error::UnsupportedCodec {
                format_id: self.format_id,
            });
        }

        match self.bits_per_sample {
            8 => Ok(SampleFormat::U8),
            16 => Ok(SampleFormat::S16Le),
            bits => Err(Error::UnsupportedBitDepth { bits }),
        }
    }
}

/// Everything decoding one WAVE file produces.
#[derive(Debug)]
pub struct DecodedWave {
    /// Output-facing sample format
    pub format: SampleFormat,

    /// Raw `fmt ` chunk fields
    pub descriptor: FormatDescriptor,

    /// Samples per second per channel
    pub sample_rate: u32,

    /// Interleaved channel count
    pub channels: u16,

    /// The complete `data` chunk payload
    pub pcm: PcmBuffer,
}

/// Decodes the WAVE file at `path`.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<DecodedWave> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::OpenFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let decoded = decode(BufReader::new(file))?;
    debug!(
        "decoded {}: {} bytes of {}ch {}Hz {}",
        path.display(),
        decoded.pcm.len(),
        decoded.channels,
        decoded.sample_rate,
        decoded.format,
    );
    Ok(decoded)
}

/// Decodes a WAVE stream.
///
/// The `fmt ` and `data` chunks are each searched from the end of the 12-byte
/// envelope, so their relative order does not matter. The returned buffer
/// holds exactly the declared `data` chunk size, never the remainder of the
/// stream.
pub fn decode<R: Read + Seek>(mut stream: R) -> Result<DecodedWave> {
    check_riff_header(&mut stream)?;
    check_wave_header(&mut stream)?;

    // Offset just past the RIFF+WAVE envelope; both chunk scans start here.
    let chunk_region_start = stream.stream_position()?;

    let descriptor = read_fmt_chunk(&mut stream)?;
    let format = descriptor.sample_format()?;

    stream.seek(SeekFrom::Start(chunk_region_start))?;
    let pcm = read_data_chunk(&mut stream)?;

    Ok(DecodedWave {
        format,
        sample_rate: descriptor.sample_rate,
        channels: descriptor.channels,
        descriptor,
        pcm,
    })
}

/// Validates the 8-byte RIFF header.
///
/// The declared overall size in bytes 4..8 is read but not cross-checked
/// against the actual stream length.
fn check_riff_header<R: Read>(stream: &mut R) -> Result<()> {
    let mut header = [0u8; 8];
    stream
        .read_exact(&mut header)
        .map_err(|e| short_read(e, Error::BadRiffMagic))?;

    if header[..4] != MAGIC_RIFF {
        return Err(Error::BadRiffMagic);
    }
    Ok(())
}

/// Validates the 4-byte WAVE form type following the RIFF header.
fn check_wave_header<R: Read>(stream: &mut R) -> Result<()> {
    let mut form_type = [0u8; 4];
    stream
        .read_exact(&mut form_type)
        .map_err(|e| short_read(e, Error::BadWaveMagic))?;

    if form_type != MAGIC_WAVE {
        return Err(Error::BadWaveMagic);
    }
    Ok(())
}

fn read_fmt_chunk<R: Read + Seek>(stream: &mut R) -> Result<FormatDescriptor> {
    let size = find_chunk(stream, TAG_FMT).map_err(|e| match e {
        Error::ChunkNotFound { .. } => Error::FmtChunkMissing,
        other => other,
    })?;

    let body = read_chunk_body(stream, size, Error::FmtChunkTruncated)?;
    FormatDescriptor::from_bytes(&body)
}

fn read_data_chunk<R: Read + Seek>(stream: &mut R) -> Result<PcmBuffer> {
    let size = find_chunk(stream, TAG_DATA).map_err(|e| match e {
        Error::ChunkNotFound { .. } => Error::DataChunkMissing,
        other => other,
    })?;

    let bytes = read_chunk_body(stream, size, Error::DataChunkTruncated)?;
    Ok(PcmBuffer::new(bytes))
}

/// Reads exactly `size` body bytes from the current position.
///
/// The declared size is bounded against the remaining stream length before
/// anything is allocated, so a hostile size field cannot trigger an oversized
/// allocation or a read past the end.
fn read_chunk_body<R: Read + Seek>(stream: &mut R, size: u32, truncated: Error) -> Result<Vec<u8>> {
    let position = stream.stream_position()?;
    let stream_len = stream.seek(SeekFrom::End(0))?;
    stream.seek(SeekFrom::Start(position))?;

    if u64::from(size) > stream_len - position {
        return Err(truncated);
    }

    let mut body = vec![0u8; size as usize];
    stream.read_exact(&mut body).map_err(|e| short_read(e, truncated))?;
    Ok(body)
}

/// Maps an unexpected EOF to the given structural error; other I/O failures
/// propagate as-is.
fn short_read(e: std::io::Error, structural: Error) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        structural
    } else {
        Error::Io(e)
    }
}
