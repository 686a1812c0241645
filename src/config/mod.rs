//! Configuration management for the murmur console

pub mod file;

use std::path::PathBuf;

use crate::{Error, Result};

/// Slider range for ambient noise calibration, in seconds
pub const CALIBRATION_RANGE: (f64, f64) = (0.0, 3.0);

/// Slider range for the listen timeout, in seconds
pub const TIMEOUT_RANGE: (f64, f64) = (0.0, 10.0);

/// Slider range for the phrase time limit, in seconds
pub const PHRASE_LIMIT_RANGE: (f64, f64) = (0.0, 15.0);

/// Murmur console configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Listening controls
    pub listen: ListenConfig,

    /// Speech provider configuration
    pub speech: SpeechConfig,

    /// API keys
    pub api_keys: ApiKeys,

    /// Browser configuration
    pub browser: BrowserConfig,
}

/// User-adjustable listening controls
#[derive(Debug, Clone, Copy)]
pub struct ListenConfig {
    /// Ambient noise calibration duration in seconds (0 disables)
    pub calibration_secs: f64,

    /// Max seconds to wait for speech to start (0 disables)
    pub timeout_secs: f64,

    /// Max phrase duration in seconds (0 disables)
    pub phrase_limit_secs: f64,

    /// Speak recognized text back through TTS
    pub speak_back: bool,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            calibration_secs: 1.0,
            timeout_secs: 3.0,
            phrase_limit_secs: 6.0,
            speak_back: true,
        }
    }
}

/// Speech provider configuration
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// STT provider ("whisper" or "deepgram")
    pub stt_provider: String,

    /// STT model identifier
    pub stt_model: String,

    /// TTS provider ("openai" or "elevenlabs")
    pub tts_provider: String,

    /// TTS model identifier
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            stt_provider: "whisper".to_string(),
            stt_model: "whisper-1".to_string(),
            tts_provider: "openai".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            tts_speed: 1.0,
        }
    }
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper STT and TTS)
    pub openai: Option<String>,

    /// Deepgram API key (optional STT)
    pub deepgram: Option<String>,

    /// `ElevenLabs` API key (optional TTS)
    pub elevenlabs: Option<String>,
}

/// Browser configuration
#[derive(Debug, Clone, Default)]
pub struct BrowserConfig {
    /// Path to a specific browser executable; `None` uses the OS default
    pub executable: Option<PathBuf>,
}

impl Config {
    /// Load configuration with env > config file > default precedence
    ///
    /// # Errors
    ///
    /// Returns error if a configured value is out of range
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_overlay(&fc)
    }

    /// Build configuration from a TOML overlay plus environment variables
    ///
    /// # Errors
    ///
    /// Returns error if a configured value is out of range
    pub fn from_overlay(fc: &file::MurmurConfigFile) -> Result<Self> {
        let defaults = ListenConfig::default();
        let listen = ListenConfig {
            calibration_secs: fc
                .listen
                .calibration_secs
                .unwrap_or(defaults.calibration_secs),
            timeout_secs: fc.listen.timeout_secs.unwrap_or(defaults.timeout_secs),
            phrase_limit_secs: fc
                .listen
                .phrase_limit_secs
                .unwrap_or(defaults.phrase_limit_secs),
            speak_back: fc.listen.speak_back.unwrap_or(defaults.speak_back),
        };
        listen.validate()?;

        let speech_defaults = SpeechConfig::default();
        let speech = SpeechConfig {
            stt_provider: fc
                .speech
                .stt_provider
                .clone()
                .unwrap_or(speech_defaults.stt_provider),
            stt_model: fc
                .speech
                .stt_model
                .clone()
                .unwrap_or(speech_defaults.stt_model),
            tts_provider: fc
                .speech
                .tts_provider
                .clone()
                .unwrap_or(speech_defaults.tts_provider),
            tts_model: fc
                .speech
                .tts_model
                .clone()
                .unwrap_or(speech_defaults.tts_model),
            tts_voice: fc
                .speech
                .tts_voice
                .clone()
                .unwrap_or(speech_defaults.tts_voice),
            tts_speed: fc.speech.tts_speed.unwrap_or(speech_defaults.tts_speed),
        };

        let api_keys = ApiKeys {
            openai: std::env::var("OPENAI_API_KEY")
                .ok()
                .or_else(|| fc.api_keys.openai.clone()),
            deepgram: std::env::var("DEEPGRAM_API_KEY")
                .ok()
                .or_else(|| fc.api_keys.deepgram.clone()),
            elevenlabs: std::env::var("ELEVENLABS_API_KEY")
                .ok()
                .or_else(|| fc.api_keys.elevenlabs.clone()),
        };

        let browser = BrowserConfig {
            executable: fc.browser.executable.clone().map(PathBuf::from),
        };

        Ok(Self {
            listen,
            speech,
            api_keys,
            browser,
        })
    }
}

impl ListenConfig {
    /// Check all controls against their allowed ranges
    ///
    /// # Errors
    ///
    /// Returns error naming the out-of-range control
    pub fn validate(&self) -> Result<()> {
        check_range("calibration", self.calibration_secs, CALIBRATION_RANGE)?;
        check_range("timeout", self.timeout_secs, TIMEOUT_RANGE)?;
        check_range("phrase limit", self.phrase_limit_secs, PHRASE_LIMIT_RANGE)?;
        Ok(())
    }
}

/// Validate a control value against its allowed range
fn check_range(name: &str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(Error::Config(format!(
            "{name} must be between {min} and {max} seconds, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_controls() {
        let listen = ListenConfig::default();
        assert!((listen.calibration_secs - 1.0).abs() < f64::EPSILON);
        assert!((listen.timeout_secs - 3.0).abs() < f64::EPSILON);
        assert!((listen.phrase_limit_secs - 6.0).abs() < f64::EPSILON);
        assert!(listen.speak_back);
    }

    #[test]
    fn out_of_range_control_is_rejected() {
        let listen = ListenConfig {
            timeout_secs: 99.0,
            ..ListenConfig::default()
        };
        assert!(listen.validate().is_err());

        let listen = ListenConfig {
            calibration_secs: -1.0,
            ..ListenConfig::default()
        };
        assert!(listen.validate().is_err());
    }

    #[test]
    fn zero_disables_and_is_valid() {
        let listen = ListenConfig {
            calibration_secs: 0.0,
            timeout_secs: 0.0,
            phrase_limit_secs: 0.0,
            speak_back: false,
        };
        assert!(listen.validate().is_ok());
    }
}
