//! Voice pipeline integration tests
//!
//! Tests segmentation and encoding without requiring audio hardware

use std::io::Cursor;

use murmur::voice::{
    DEFAULT_ENERGY_THRESHOLD, SAMPLE_RATE, SegmenterState, SpeechSegmenter, calibrate_threshold,
    samples_to_wav,
};

mod common;
use common::{silence, sine_samples};

#[test]
fn test_segmenter_starts_waiting() {
    let segmenter = SpeechSegmenter::with_threshold(DEFAULT_ENERGY_THRESHOLD);
    assert_eq!(segmenter.state(), SegmenterState::Waiting);
    assert!(!segmenter.speech_started());
    assert_eq!(segmenter.speech_len(), 0);
}

#[test]
fn test_silence_does_not_start_capture() {
    let mut segmenter = SpeechSegmenter::with_threshold(DEFAULT_ENERGY_THRESHOLD);

    assert!(!segmenter.push(&silence(0.1)));
    assert_eq!(segmenter.state(), SegmenterState::Waiting);
}

#[test]
fn test_speech_starts_capture() {
    let mut segmenter = SpeechSegmenter::with_threshold(DEFAULT_ENERGY_THRESHOLD);

    let speech = sine_samples(440.0, 0.5, 0.3);
    segmenter.push(&speech);
    assert_eq!(segmenter.state(), SegmenterState::Capturing);
    assert!(segmenter.speech_started());
}

#[test]
fn test_segment_completes_after_trailing_silence() {
    let mut segmenter = SpeechSegmenter::with_threshold(DEFAULT_ENERGY_THRESHOLD);

    segmenter.push(&sine_samples(440.0, 0.5, 0.3));
    segmenter.push(&sine_samples(440.0, 0.3, 0.3));

    let complete = segmenter.push(&silence(0.6));
    assert!(complete);
}

#[test]
fn test_segment_accumulates_chunks() {
    let mut segmenter = SpeechSegmenter::with_threshold(DEFAULT_ENERGY_THRESHOLD);

    let chunk1 = sine_samples(440.0, 0.1, 0.3);
    segmenter.push(&chunk1);

    let chunk2 = sine_samples(440.0, 0.1, 0.3);
    segmenter.push(&chunk2);

    assert_eq!(segmenter.speech_len(), chunk1.len() + chunk2.len());
}

#[test]
fn test_take_segment_clears_buffer() {
    let mut segmenter = SpeechSegmenter::with_threshold(DEFAULT_ENERGY_THRESHOLD);

    let speech = sine_samples(440.0, 0.1, 0.3);
    segmenter.push(&speech);

    let taken = segmenter.take_segment();
    assert_eq!(taken.len(), speech.len());
    assert_eq!(segmenter.speech_len(), 0);
}

#[test]
fn test_short_blip_resets_to_waiting() {
    let mut segmenter = SpeechSegmenter::with_threshold(DEFAULT_ENERGY_THRESHOLD);

    // 0.1s of sound is below the minimum speech duration
    segmenter.push(&sine_samples(440.0, 0.1, 0.3));
    assert_eq!(segmenter.state(), SegmenterState::Capturing);

    // Prolonged silence discards the false start
    segmenter.push(&silence(1.2));
    assert_eq!(segmenter.state(), SegmenterState::Waiting);
    assert_eq!(segmenter.speech_len(), 0);
}

#[test]
fn test_reset() {
    let mut segmenter = SpeechSegmenter::with_threshold(DEFAULT_ENERGY_THRESHOLD);

    segmenter.push(&sine_samples(440.0, 0.5, 0.3));
    segmenter.reset();

    assert_eq!(segmenter.state(), SegmenterState::Waiting);
    assert_eq!(segmenter.speech_len(), 0);
}

#[test]
fn test_calibration_floor_in_silent_room() {
    let threshold = calibrate_threshold(&silence(1.0));
    assert!(threshold > 0.0);
    assert!(threshold < DEFAULT_ENERGY_THRESHOLD);
}

#[test]
fn test_calibration_rises_with_ambient_noise() {
    let quiet = calibrate_threshold(&sine_samples(100.0, 1.0, 0.02));
    let noisy = calibrate_threshold(&sine_samples(100.0, 1.0, 0.2));
    assert!(noisy > quiet);
}

#[test]
fn test_calibrated_segmenter_ignores_ambient_level_sound() {
    // Calibrate against a noisy room, then feed sound at the ambient level
    let ambient = sine_samples(100.0, 1.0, 0.2);
    let threshold = calibrate_threshold(&ambient);

    let mut segmenter = SpeechSegmenter::with_threshold(threshold);
    assert!(!segmenter.push(&ambient));
    assert_eq!(segmenter.state(), SegmenterState::Waiting);

    // Louder speech still gets through
    segmenter.push(&sine_samples(440.0, 0.5, 0.8));
    assert_eq!(segmenter.state(), SegmenterState::Capturing);
}

#[test]
fn test_samples_to_wav() {
    let samples = sine_samples(440.0, 0.1, 0.5);
    let wav_data = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    // Check WAV header magic
    assert_eq!(&wav_data[0..4], b"RIFF");
    assert_eq!(&wav_data[8..12], b"WAVE");

    // WAV should have reasonable size
    assert!(wav_data.len() > 44); // WAV header is 44 bytes
}

#[test]
fn test_wav_spec_matches_capture() {
    let original_samples: Vec<f32> = vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25];
    let wav_data = samples_to_wav(&original_samples, SAMPLE_RATE).unwrap();

    let cursor = Cursor::new(wav_data);
    let mut reader = hound::WavReader::new(cursor).unwrap();

    let spec = reader.spec();
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);

    let read_samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(read_samples.len(), original_samples.len());
}
