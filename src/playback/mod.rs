//! Pull-based playback sessions

pub mod cursor;
pub mod engine;

pub use cursor::PlaybackCursor;
pub use engine::PlaybackEngine;
