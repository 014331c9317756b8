//! WAVE decoding integration tests
//!
//! Exercises the container parser against synthetic files: hound-generated
//! fixtures for the happy path, hand-built byte streams for malformed and
//! adversarial containers.

use std::io::Cursor;

use wavplay::audio::SampleFormat;
use wavplay::wave;
use wavplay::Error;

/// Builds a standard 16-byte `fmt ` body.
fn fmt_body(format_id: u16, channels: u16, sample_rate: u32, bits: u16) -> Vec<u8> {
    let block_align = channels * (bits / 8);
    let bytes_per_sec = sample_rate * u32::from(block_align);

    let mut body = Vec::with_capacity(16);
    body.extend_from_slice(&format_id.to_le_bytes());
    body.extend_from_slice(&channels.to_le_bytes());
    body.extend_from_slice(&sample_rate.to_le_bytes());
    body.extend_from_slice(&bytes_per_sec.to_le_bytes());
    body.extend_from_slice(&block_align.to_le_bytes());
    body.extend_from_slice(&bits.to_le_bytes());
    body
}

/// Assembles a RIFF/WAVE file from tagged chunk payloads, padding odd-sized
/// bodies per the RIFF convention.
fn wave_file(chunks: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (tag, payload) in chunks {
        body.extend_from_slice(*tag);
        body.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        body.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            body.push(0);
        }
    }

    let mut file = Vec::new();
    file.extend_from_slice(b"RIFF");
    file.extend_from_slice(&((body.len() + 4) as u32).to_le_bytes());
    file.extend_from_slice(b"WAVE");
    file.extend_from_slice(&body);
    file
}

fn stereo_s16_file(data: &[u8]) -> Vec<u8> {
    let fmt = fmt_body(1, 2, 44100, 16);
    wave_file(&[(b"fmt ", &fmt), (b"data", data)])
}

// =============================================================================
// Happy path
// =============================================================================

#[test]
fn round_trip_hound_stereo_s16() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let frames = 4410; // 100ms
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for t in 0..frames {
        let phase = t as f32 * 440.0 * 2.0 * std::f32::consts::PI / 44100.0;
        let sample = (phase.sin() * 0.5 * f32::from(i16::MAX)) as i16;
        writer.write_sample(sample).unwrap();
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();

    let decoded = wave::decode_file(&path).unwrap();
    assert_eq!(decoded.format, SampleFormat::S16Le);
    assert_eq!(decoded.sample_rate, 44100);
    assert_eq!(decoded.channels, 2);
    assert_eq!(decoded.pcm.len(), frames * 2 * 2);
}

#[test]
fn round_trip_hound_mono_u8() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone8.wav");

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 8,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for _ in 0..800 {
        writer.write_sample(0i8).unwrap();
    }
    writer.finalize().unwrap();

    let decoded = wave::decode_file(&path).unwrap();
    assert_eq!(decoded.format, SampleFormat::U8);
    assert_eq!(decoded.sample_rate, 8000);
    assert_eq!(decoded.channels, 1);
    assert_eq!(decoded.pcm.len(), 800);
}

#[test]
fn zero_length_data_chunk_decodes_empty() {
    let decoded = wave::decode(Cursor::new(stereo_s16_file(&[]))).unwrap();
    assert!(decoded.pcm.is_empty());
}

// =============================================================================
// Chunk ordering and unknown chunks
// =============================================================================

#[test]
fn unknown_chunks_are_skipped() {
    let fmt = fmt_body(1, 2, 44100, 16);
    let data = [1u8, 2, 3, 4];
    let file = wave_file(&[
        (b"LIST", &[0u8; 26]),
        (b"fmt ", &fmt),
        (b"junk", &[0u8; 9]), // odd-sized, exercises pad-byte skipping
        (b"data", &data),
    ]);

    let decoded = wave::decode(Cursor::new(file)).unwrap();
    assert_eq!(decoded.pcm.as_bytes(), &data);
}

#[test]
fn chunk_order_does_not_matter() {
    let fmt = fmt_body(1, 1, 22050, 16);
    let data = [5u8, 6, 7, 8];
    let file = wave_file(&[(b"data", &data), (b"fmt ", &fmt)]);

    let decoded = wave::decode(Cursor::new(file)).unwrap();
    assert_eq!(decoded.sample_rate, 22050);
    assert_eq!(decoded.pcm.as_bytes(), &data);
}

#[test]
fn data_length_is_declared_size_not_remaining_bytes() {
    let mut file = stereo_s16_file(&[9u8; 12]);
    file.extend_from_slice(&[0xAB; 40]); // trailing garbage past the last chunk

    let decoded = wave::decode(Cursor::new(file)).unwrap();
    assert_eq!(decoded.pcm.len(), 12);
    assert!(decoded.pcm.as_bytes().iter().all(|&b| b == 9));
}

// =============================================================================
// Malformed containers
// =============================================================================

#[test]
fn rejects_non_riff_file() {
    let mut file = stereo_s16_file(&[0; 4]);
    file[..4].copy_from_slice(b"JUNK");

    let err = wave::decode(Cursor::new(file)).unwrap_err();
    assert!(matches!(err, Error::BadRiffMagic));
}

#[test]
fn rejects_empty_stream() {
    let err = wave::decode(Cursor::new(Vec::new())).unwrap_err();
    assert!(matches!(err, Error::BadRiffMagic));
}

#[test]
fn rejects_wrong_form_type() {
    let mut file = stereo_s16_file(&[0; 4]);
    file[8..12].copy_from_slice(b"AVI ");

    let err = wave::decode(Cursor::new(file)).unwrap_err();
    assert!(matches!(err, Error::BadWaveMagic));
}

#[test]
fn missing_data_chunk_never_partially_succeeds() {
    let fmt = fmt_body(1, 2, 44100, 16);
    let file = wave_file(&[(b"fmt ", &fmt)]);

    let err = wave::decode(Cursor::new(file)).unwrap_err();
    assert!(matches!(err, Error::DataChunkMissing));
}

#[test]
fn missing_fmt_chunk_fails() {
    let file = wave_file(&[(b"data", &[0u8; 4])]);
    let err = wave::decode(Cursor::new(file)).unwrap_err();
    assert!(matches!(err, Error::FmtChunkMissing));
}

#[test]
fn truncated_data_chunk_fails() {
    let fmt = fmt_body(1, 2, 44100, 16);
    let mut file = wave_file(&[(b"fmt ", &fmt)]);
    // data chunk declaring 100 bytes with only 4 present
    file.extend_from_slice(b"data");
    file.extend_from_slice(&100u32.to_le_bytes());
    file.extend_from_slice(&[1, 2, 3, 4]);

    let err = wave::decode(Cursor::new(file)).unwrap_err();
    assert!(matches!(err, Error::DataChunkTruncated));
}

#[test]
fn stray_trailing_bytes_are_a_truncated_header() {
    let fmt = fmt_body(1, 2, 44100, 16);
    let mut file = wave_file(&[(b"fmt ", &fmt)]);
    file.extend_from_slice(b"dat"); // not a full chunk header

    let err = wave::decode(Cursor::new(file)).unwrap_err();
    assert!(matches!(err, Error::TruncatedHeader { .. }));
}

#[test]
fn open_failure_is_reported_with_path() {
    let err = wave::decode_file("/nonexistent/audio.wav").unwrap_err();
    assert!(matches!(err, Error::OpenFailed { .. }));
}
