//! # wavplay
//!
//! Decodes linear-PCM RIFF/WAVE files and streams them to an audio output
//! device through a pull-based fill callback.
//!
//! **Pipeline:** RIFF chunk walker → WAVE decoder → bounded-wait device
//! discovery → blocking playback session over cpal.

pub mod audio;
pub mod error;
pub mod playback;
pub mod wave;

pub use error::{Error, Result};
