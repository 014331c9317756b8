//! Blocking playback sessions
//!
//! The engine arms an output sink with the pull-protocol callbacks and parks
//! the calling thread until the sink reports the end of the stream. It is
//! purely reactive: nothing here drives the session forward, and there is no
//! cancellation path — the session ends when the sink says it has ended,
//! whether by draining the stream or by device failure.

use std::sync::{Arc, Condvar, Mutex};

use tracing::{debug, info};

use crate::audio::output::{AudioSink, SessionCallbacks};
use crate::audio::PcmBuffer;
use crate::error::Result;
use crate::playback::cursor::PlaybackCursor;

/// Completion handoff shared with the sink's callback threads.
struct EndSignal {
    ended: Mutex<bool>,
    cond: Condvar,
}

impl EndSignal {
    fn new() -> Self {
        Self {
            ended: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Marks the session ended. Safe to call more than once; the flag only
    /// ever moves to true.
    fn notify(&self) {
        let mut ended = self.ended.lock().unwrap();
        *ended = true;
        self.cond.notify_all();
    }

    /// Parks until the session ends. Predicate wait: an end signal that fires
    /// before this call is observed, not lost.
    fn wait(&self) {
        let guard = self.ended.lock().unwrap();
        let _guard = self.cond.wait_while(guard, |ended| !*ended).unwrap();
    }
}

/// Drives one pull-based playback session over an output sink.
pub struct PlaybackEngine<S: AudioSink> {
    sink: S,
}

impl<S: AudioSink> PlaybackEngine<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Plays the buffer to completion, blocking the calling thread.
    ///
    /// The buffer is handed to the session whole; the sink pulls successive
    /// slices of it through the fill callback until a zero-length fill marks
    /// the end of the stream, then reports completion through the end
    /// callback. Returns once that report arrives.
    pub fn play(&mut self, pcm: PcmBuffer) -> Result<()> {
        let total = pcm.len();
        let pcm = Arc::new(pcm);
        let signal = Arc::new(EndSignal::new());

        let mut cursor = PlaybackCursor::new(Arc::clone(&pcm));
        let end_signal = Arc::clone(&signal);

        self.sink.start(SessionCallbacks {
            on_start: Box::new(|| info!("playback started")),
            on_fill: Box::new(move |dest| cursor.fill(dest)),
            on_end: Box::new(move || {
                debug!("end of stream reported");
                end_signal.notify();
            }),
        })?;

        signal.wait();
        info!("playback finished ({total} bytes)");
        Ok(())
    }

    /// Gives the sink back once the session is over.
    pub fn into_sink(self) -> S {
        self.sink
    }
}
