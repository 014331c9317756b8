//! Pull-protocol cursor
//!
//! The read offset into an immutable PCM buffer is the only per-session state
//! the playback engine mutates, and only the fill callback touches it.

use std::sync::Arc;

use crate::audio::PcmBuffer;

/// Read position within a PCM buffer.
///
/// Advances monotonically and never rewinds within a session. Reaching the
/// end of the buffer is the terminal condition of the pull protocol: the
/// first fill at the end returns 0, and so does every fill after it.
pub struct PlaybackCursor {
    pcm: Arc<PcmBuffer>,
    position: usize,
}

impl PlaybackCursor {
    pub fn new(pcm: Arc<PcmBuffer>) -> Self {
        Self { pcm, position: 0 }
    }

    /// One pull: copies `min(dest.len(), remaining)` bytes into `dest` and
    /// advances past them. Returns the byte count written; 0 signals end of
    /// stream.
    pub fn fill(&mut self, dest: &mut [u8]) -> usize {
        let remaining = self.pcm.len() - self.position;
        let count = dest.len().min(remaining);
        if count > 0 {
            let end = self.position + count;
            dest[..count].copy_from_slice(&self.pcm.as_bytes()[self.position..end]);
            self.position = end;
        }
        count
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// True once every byte has been pulled
    pub fn is_exhausted(&self) -> bool {
        self.position == self.pcm.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor_over(bytes: Vec<u8>) -> PlaybackCursor {
        PlaybackCursor::new(Arc::new(PcmBuffer::new(bytes)))
    }

    #[test]
    fn fill_sequence_for_25_bytes_at_capacity_10() {
        let mut cursor = cursor_over((0..25).collect());
        let mut dest = [0u8; 10];

        assert_eq!(cursor.fill(&mut dest), 10);
        assert_eq!(&dest[..], &(0..10).collect::<Vec<u8>>()[..]);

        assert_eq!(cursor.fill(&mut dest), 10);
        assert_eq!(&dest[..], &(10..20).collect::<Vec<u8>>()[..]);

        assert_eq!(cursor.fill(&mut dest), 5);
        assert_eq!(&dest[..5], &(20..25).collect::<Vec<u8>>()[..]);

        // End of stream, and it stays ended.
        assert_eq!(cursor.fill(&mut dest), 0);
        assert_eq!(cursor.fill(&mut dest), 0);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn exact_multiple_ends_with_zero() {
        let mut cursor = cursor_over(vec![7; 20]);
        let mut dest = [0u8; 10];

        assert_eq!(cursor.fill(&mut dest), 10);
        assert_eq!(cursor.fill(&mut dest), 10);
        assert_eq!(cursor.fill(&mut dest), 0);
    }

    #[test]
    fn empty_buffer_is_immediately_ended() {
        let mut cursor = cursor_over(Vec::new());
        let mut dest = [0u8; 4];

        assert_eq!(cursor.fill(&mut dest), 0);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn position_is_monotonic() {
        let mut cursor = cursor_over(vec![0; 30]);
        let mut dest = [0u8; 7];
        let mut last = 0;

        loop {
            let count = cursor.fill(&mut dest);
            assert!(cursor.position() >= last);
            last = cursor.position();
            if count == 0 {
                break;
            }
        }
        assert_eq!(last, 30);
    }
}
