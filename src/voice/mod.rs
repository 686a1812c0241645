//! Voice processing module
//!
//! Handles audio capture, speech segmentation, and playback.
//! STT and TTS calls live in `stt` and `tts`.

mod capture;
mod listener;
mod playback;
pub mod stt;
pub mod tts;

pub use capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
pub use listener::{
    DEFAULT_ENERGY_THRESHOLD, Listener, SegmenterState, SpeechSegmenter, calibrate_threshold,
};
pub use playback::AudioPlayback;
pub use stt::SpeechToText;
pub use tts::TextToSpeech;
