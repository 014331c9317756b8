//! Audio output sessions over cpal
//!
//! Models the output collaborator: a session is created for one device with
//! the stream parameters and three callback registrations. The collaborator
//! pulls audio by invoking the fill callback from its own thread; a
//! zero-length fill is the end-of-stream signal, after which the end callback
//! fires exactly once and the device is fed silence while it drains.

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, StreamTrait};
use tracing::{debug, error};

use crate::audio::device::DeviceHandle;
use crate::audio::types::SampleFormat;
use crate::error::{Error, Result};

/// Pull callback: fill `dest` from the current stream position and return the
/// byte count written; `0` means end of stream.
pub type FillHandler = Box<dyn FnMut(&mut [u8]) -> usize + Send>;

/// End-of-session callback. May be invoked from the collaborator's callback
/// thread; must tolerate duplicate invocation.
pub type EndHandler = Box<dyn FnMut() + Send>;

type SharedEndHandler = Arc<Mutex<EndHandler>>;

/// The three callbacks one playback session registers with the output
/// collaborator.
pub struct SessionCallbacks {
    /// Invoked once when the session is armed, just before output unpauses
    pub on_start: Box<dyn FnOnce() + Send>,

    /// The pull protocol
    pub on_fill: FillHandler,

    /// Invoked when the collaborator drains the stream or the device fails
    pub on_end: EndHandler,
}

/// Output collaborator boundary: arms a session and starts pulling.
pub trait AudioSink {
    fn start(&mut self, callbacks: SessionCallbacks) -> Result<()>;
}

/// cpal-backed output session.
///
/// Requires a device configuration natively matching the decoded stream:
/// no resampling, no channel remixing, no sample format conversion beyond
/// byte reassembly.
pub struct CpalAudioSink {
    device: DeviceHandle,
    format: SampleFormat,
    sample_rate: u32,
    channels: u16,
    stream: Option<cpal::Stream>,
}

impl CpalAudioSink {
    pub fn new(device: DeviceHandle, format: SampleFormat, sample_rate: u32, channels: u16) -> Self {
        Self {
            device,
            format,
            sample_rate,
            channels,
            stream: None,
        }
    }

    /// Finds a supported device configuration exactly matching the stream
    /// parameters.
    fn negotiate_config(&self) -> Result<cpal::StreamConfig> {
        let wanted = match self.format {
            SampleFormat::U8 => cpal::SampleFormat::U8,
            SampleFormat::S16Le => cpal::SampleFormat::I16,
        };
        let rate = cpal::SampleRate(self.sample_rate);

        let mut ranges = self.device.raw.supported_output_configs().map_err(|e| {
            Error::OutputSessionCreateFailed(format!("failed to query device configs: {e}"))
        })?;

        let supported = ranges
            .find(|range| {
                range.channels() == self.channels
                    && range.sample_format() == wanted
                    && range.min_sample_rate() <= rate
                    && range.max_sample_rate() >= rate
            })
            .ok_or_else(|| {
                Error::OutputSessionCreateFailed(format!(
                    "device '{}' does not support {}ch {}Hz {}",
                    self.device.name(),
                    self.channels,
                    self.sample_rate,
                    self.format,
                ))
            })?;

        Ok(supported.with_sample_rate(rate).config())
    }

    fn build_stream_i16(
        &self,
        config: &cpal::StreamConfig,
        mut on_fill: FillHandler,
        on_end: SharedEndHandler,
    ) -> Result<cpal::Stream> {
        let err_end = Arc::clone(&on_end);
        let mut scratch: Vec<u8> = Vec::new();
        let mut ended = false;

        self.device
            .raw
            .build_output_stream(
                config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    scratch.resize(data.len() * 2, 0);
                    let filled = if ended { 0 } else { (on_fill)(&mut scratch) };
                    if filled == 0 && !ended {
                        ended = true;
                        signal_end(&on_end);
                    }

                    // Reassemble little-endian samples; pad a short fill with
                    // silence so the device keeps draining cleanly.
                    for (index, sample) in data.iter_mut().enumerate() {
                        let at = index * 2;
                        *sample = if at + 1 < filled {
                            i16::from_le_bytes([scratch[at], scratch[at + 1]])
                        } else {
                            0
                        };
                    }
                },
                move |err| {
                    error!("audio stream error: {err}");
                    signal_end(&err_end);
                },
                None,
            )
            .map_err(|e| Error::OutputSessionCreateFailed(e.to_string()))
    }

    fn build_stream_u8(
        &self,
        config: &cpal::StreamConfig,
        mut on_fill: FillHandler,
        on_end: SharedEndHandler,
    ) -> Result<cpal::Stream> {
        let err_end = Arc::clone(&on_end);
        let mut ended = false;

        self.device
            .raw
            .build_output_stream(
                config,
                move |data: &mut [u8], _: &cpal::OutputCallbackInfo| {
                    let filled = if ended { 0 } else { (on_fill)(data) };
                    if filled == 0 && !ended {
                        ended = true;
                        signal_end(&on_end);
                    }

                    // Unsigned 8-bit silence sits at the midpoint.
                    for sample in &mut data[filled..] {
                        *sample = 0x80;
                    }
                },
                move |err| {
                    error!("audio stream error: {err}");
                    signal_end(&err_end);
                },
                None,
            )
            .map_err(|e| Error::OutputSessionCreateFailed(e.to_string()))
    }
}

impl AudioSink for CpalAudioSink {
    fn start(&mut self, callbacks: SessionCallbacks) -> Result<()> {
        let config = self.negotiate_config()?;
        let SessionCallbacks {
            on_start,
            on_fill,
            on_end,
        } = callbacks;
        let on_end: SharedEndHandler = Arc::new(Mutex::new(on_end));

        let stream = match self.format {
            SampleFormat::S16Le => self.build_stream_i16(&config, on_fill, on_end)?,
            SampleFormat::U8 => self.build_stream_u8(&config, on_fill, on_end)?,
        };

        on_start();
        stream
            .play()
            .map_err(|e| Error::OutputSessionCreateFailed(e.to_string()))?;
        self.stream = Some(stream);

        debug!(
            "output session started on '{}' ({}ch {}Hz {})",
            self.device.name(),
            self.channels,
            self.sample_rate,
            self.format,
        );
        Ok(())
    }
}

impl Drop for CpalAudioSink {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.pause();
        }
    }
}

fn signal_end(on_end: &SharedEndHandler) {
    let mut handler = on_end.lock().unwrap();
    (*handler)();
}
