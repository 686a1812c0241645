//! Speech segmentation and bounded listening
//!
//! Turns the raw capture buffer into one bounded speech segment: calibrate
//! an energy threshold against ambient noise, wait for speech to start,
//! accumulate until trailing silence or the phrase limit ends the segment.

use std::time::{Duration, Instant};

use crate::config::ListenConfig;
use crate::voice::{AudioCapture, SAMPLE_RATE};
use crate::{Error, Result};

/// Energy threshold used when calibration is disabled
pub const DEFAULT_ENERGY_THRESHOLD: f32 = 0.03;

/// Floor for the calibrated threshold so a silent room never yields zero
const MIN_ENERGY_THRESHOLD: f32 = 0.01;

/// Margin applied to measured ambient energy when calibrating
const CALIBRATION_MARGIN: f32 = 2.5;

/// Minimum duration of speech to count as a segment (in samples at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800; // 0.3 seconds

/// Silence duration to consider end of utterance (in samples)
const SILENCE_SAMPLES: usize = 8000; // 0.5 seconds

/// Interval between capture buffer drains
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// State of the speech segmenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    /// Waiting for speech to start
    Waiting,
    /// Speech detected, accumulating the segment
    Capturing,
}

/// Derive an energy threshold from measured ambient noise
///
/// The analogue of the original ambient-noise adjustment step: the gate is
/// set a margin above the room's resting energy, floored so silence never
/// produces a zero threshold.
#[must_use]
pub fn calibrate_threshold(ambient: &[f32]) -> f32 {
    let ambient_energy = rms(ambient);
    (ambient_energy * CALIBRATION_MARGIN).max(MIN_ENERGY_THRESHOLD)
}

/// Segments one speech utterance out of a stream of audio chunks
pub struct SpeechSegmenter {
    threshold: f32,
    state: SegmenterState,
    speech_buffer: Vec<f32>,
    speech_samples: usize,
    silence_counter: usize,
}

impl SpeechSegmenter {
    /// Create a segmenter with the given energy threshold
    #[must_use]
    pub const fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold,
            state: SegmenterState::Waiting,
            speech_buffer: Vec::new(),
            speech_samples: 0,
            silence_counter: 0,
        }
    }

    /// Feed a chunk of samples; returns true when a segment is complete
    ///
    /// A segment completes once at least the minimum amount of speech has
    /// accumulated and trailing silence exceeds the end-of-utterance window.
    pub fn push(&mut self, samples: &[f32]) -> bool {
        if samples.is_empty() {
            return false;
        }

        let energy = rms(samples);
        let is_speech = energy > self.threshold;

        match self.state {
            SegmenterState::Waiting => {
                if is_speech {
                    self.state = SegmenterState::Capturing;
                    self.speech_buffer.clear();
                    self.speech_buffer.extend_from_slice(samples);
                    self.speech_samples = samples.len();
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech started");
                }
            }
            SegmenterState::Capturing => {
                self.speech_buffer.extend_from_slice(samples);

                if is_speech {
                    self.speech_samples += samples.len();
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                tracing::trace!(
                    buffer_len = self.speech_buffer.len(),
                    silence = self.silence_counter,
                    energy,
                    "capturing"
                );

                // Trailing silence only counts as end-of-utterance once
                // enough actual speech has accumulated
                if self.silence_counter > SILENCE_SAMPLES
                    && self.speech_samples > MIN_SPEECH_SAMPLES
                {
                    tracing::debug!(samples = self.speech_buffer.len(), "segment complete");
                    return true;
                }

                // A short blip followed by silence was not speech
                if self.silence_counter > SILENCE_SAMPLES * 2 {
                    tracing::trace!("false start, resetting");
                    self.reset();
                }
            }
        }

        false
    }

    /// Whether speech has started and is being accumulated
    #[must_use]
    pub fn speech_started(&self) -> bool {
        self.state == SegmenterState::Capturing
    }

    /// Length of the accumulated segment in samples
    #[must_use]
    pub fn speech_len(&self) -> usize {
        self.speech_buffer.len()
    }

    /// Take the accumulated segment, clearing the buffer
    pub fn take_segment(&mut self) -> Vec<f32> {
        self.speech_samples = 0;
        std::mem::take(&mut self.speech_buffer)
    }

    /// Reset to waiting for speech
    pub fn reset(&mut self) {
        self.state = SegmenterState::Waiting;
        self.speech_buffer.clear();
        self.speech_samples = 0;
        self.silence_counter = 0;
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> SegmenterState {
        self.state
    }

    /// Get the energy threshold in use
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }
}

/// Drives one bounded listen against the microphone
pub struct Listener {
    controls: ListenConfig,
}

impl Listener {
    /// Create a listener with the given controls
    #[must_use]
    pub const fn new(controls: ListenConfig) -> Self {
        Self { controls }
    }

    /// Capture one speech segment from the microphone
    ///
    /// Calibrates against ambient noise (when enabled), then polls the
    /// capture buffer until a segment completes, the phrase limit truncates
    /// it, or the timeout expires with no speech started.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ListenTimeout`] if no speech starts within the
    /// timeout, or an audio error if the device fails.
    pub async fn listen(&self, capture: &mut AudioCapture) -> Result<Vec<f32>> {
        capture.start()?;
        capture.clear_buffer();

        let result = self.listen_inner(capture).await;
        capture.stop();
        result
    }

    async fn listen_inner(&self, capture: &AudioCapture) -> Result<Vec<f32>> {
        let threshold = if self.controls.calibration_secs > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(self.controls.calibration_secs)).await;
            let ambient = capture.take_buffer();
            let threshold = calibrate_threshold(&ambient);
            tracing::debug!(
                ambient_samples = ambient.len(),
                threshold,
                "calibrated energy threshold"
            );
            threshold
        } else {
            DEFAULT_ENERGY_THRESHOLD
        };

        let mut segmenter = SpeechSegmenter::with_threshold(threshold);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let limit_samples = if self.controls.phrase_limit_secs > 0.0 {
            (self.controls.phrase_limit_secs * f64::from(SAMPLE_RATE)) as usize
        } else {
            usize::MAX
        };

        let timeout = (self.controls.timeout_secs > 0.0)
            .then(|| Duration::from_secs_f64(self.controls.timeout_secs));
        let started = Instant::now();

        loop {
            tokio::time::sleep(POLL_INTERVAL).await;

            let chunk = capture.take_buffer();
            if segmenter.push(&chunk) {
                return Ok(segmenter.take_segment());
            }

            if segmenter.speech_started() {
                // The phrase limit caps segment length; truncation is still
                // a successful listen
                if segmenter.speech_len() >= limit_samples {
                    tracing::debug!(limit_samples, "phrase limit reached");
                    let mut segment = segmenter.take_segment();
                    segment.truncate(limit_samples);
                    return Ok(segment);
                }
            } else if let Some(timeout) = timeout
                && started.elapsed() >= timeout
            {
                tracing::debug!(?timeout, "no speech before timeout");
                return Err(Error::ListenTimeout);
            }
        }
    }
}

/// Calculate RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms() {
        let silence = vec![0.0f32; 100];
        assert!(rms(&silence) < 0.001);

        let loud = vec![0.5f32; 100];
        assert!(rms(&loud) > 0.4);
    }

    #[test]
    fn test_calibration_floor() {
        let silence = vec![0.0f32; 1600];
        assert!((calibrate_threshold(&silence) - MIN_ENERGY_THRESHOLD).abs() < f32::EPSILON);
    }

    #[test]
    fn test_calibration_scales_with_ambient() {
        let noisy = vec![0.1f32; 1600];
        let threshold = calibrate_threshold(&noisy);
        assert!(threshold > 0.2 && threshold < 0.3);
    }

    #[test]
    fn test_segmenter_ignores_silence() {
        let mut segmenter = SpeechSegmenter::with_threshold(DEFAULT_ENERGY_THRESHOLD);
        let silence = vec![0.0f32; 1600];
        assert!(!segmenter.push(&silence));
        assert_eq!(segmenter.state(), SegmenterState::Waiting);
    }

    #[test]
    fn test_segmenter_completes_on_trailing_silence() {
        let mut segmenter = SpeechSegmenter::with_threshold(DEFAULT_ENERGY_THRESHOLD);

        // 0.5s of speech
        let speech = vec![0.3f32; 8000];
        assert!(!segmenter.push(&speech));
        assert_eq!(segmenter.state(), SegmenterState::Capturing);

        // 0.6s of silence ends the utterance
        let silence = vec![0.0f32; 9600];
        assert!(segmenter.push(&silence));
    }
}
