//! Error types for wavplay
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::wave::ChunkTag;

/// Main error type for wavplay
#[derive(Error, Debug)]
pub enum Error {
    /// File could not be opened for reading
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File does not start with the RIFF magic bytes
    #[error("Not a RIFF container")]
    BadRiffMagic,

    /// RIFF container whose form type is not WAVE
    #[error("RIFF container is not WAVE")]
    BadWaveMagic,

    /// Chunk header cut off mid-read while scanning
    #[error("Truncated chunk header while scanning for '{tag}'")]
    TruncatedHeader { tag: ChunkTag },

    /// Stream exhausted without the requested chunk appearing
    #[error("Chunk '{tag}' not found")]
    ChunkNotFound { tag: ChunkTag },

    /// No 'fmt ' chunk in the file
    #[error("No 'fmt ' chunk in file")]
    FmtChunkMissing,

    /// 'fmt ' chunk body shorter than its declared size or below the
    /// 16-byte minimum
    #[error("'fmt ' chunk truncated")]
    FmtChunkTruncated,

    /// Codec tag other than linear PCM
    #[error("Unsupported codec (format id {format_id:#06x}); only linear PCM is supported")]
    UnsupportedCodec { format_id: u16 },

    /// Bit depth other than 8 or 16
    #[error("Unsupported bit depth {bits}; only 8 or 16 bits per sample are supported")]
    UnsupportedBitDepth { bits: u16 },

    /// No 'data' chunk in the file
    #[error("No 'data' chunk in file")]
    DataChunkMissing,

    /// 'data' chunk body shorter than its declared size
    #[error("'data' chunk truncated")]
    DataChunkTruncated,

    /// No output device connected within the discovery window
    #[error("No audio output device found within {:.1}s", .0.as_secs_f32())]
    DeviceResolutionTimeout(Duration),

    /// Device enumeration errors from the audio host
    #[error("Device discovery error: {0}")]
    DeviceDiscovery(String),

    /// Output session could not be created or started
    #[error("Failed to create output session: {0}")]
    OutputSessionCreateFailed(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using wavplay Error
pub type Result<T> = std::result::Result<T, Error>;
