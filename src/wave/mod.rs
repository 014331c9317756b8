//! RIFF/WAVE container parsing

pub mod chunk;
pub mod decoder;

pub use chunk::{find_chunk, ChunkHeader, ChunkTag, TAG_DATA, TAG_FMT};
pub use decoder::{decode, decode_file, DecodedWave, FormatDescriptor};
