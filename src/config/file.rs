//! TOML configuration file loading
//!
//! Supports `~/.config/murmur/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct MurmurConfigFile {
    /// Listening controls
    #[serde(default)]
    pub listen: ListenFileConfig,

    /// Speech provider configuration
    #[serde(default)]
    pub speech: SpeechFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Browser configuration
    #[serde(default)]
    pub browser: BrowserFileConfig,
}

/// Listening controls
#[derive(Debug, Default, Deserialize)]
pub struct ListenFileConfig {
    /// Ambient noise calibration duration in seconds (0 disables)
    pub calibration_secs: Option<f64>,

    /// Max seconds to wait for speech to start (0 disables)
    pub timeout_secs: Option<f64>,

    /// Max phrase duration in seconds (0 disables)
    pub phrase_limit_secs: Option<f64>,

    /// Speak recognized text back through TTS
    pub speak_back: Option<bool>,
}

/// Speech provider configuration
#[derive(Debug, Default, Deserialize)]
pub struct SpeechFileConfig {
    /// STT provider ("whisper" or "deepgram")
    pub stt_provider: Option<String>,

    /// STT model (e.g. "whisper-1", "nova-2")
    pub stt_model: Option<String>,

    /// TTS provider ("openai" or "elevenlabs")
    pub tts_provider: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f32>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub deepgram: Option<String>,
    pub elevenlabs: Option<String>,
}

/// Browser configuration
#[derive(Debug, Default, Deserialize)]
pub struct BrowserFileConfig {
    /// Path to a specific browser executable; omit to use the OS default
    pub executable: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `MurmurConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> MurmurConfigFile {
    let Some(path) = config_file_path() else {
        return MurmurConfigFile::default();
    };

    load_config_from(&path)
}

/// Load a TOML config file from an explicit path
pub fn load_config_from(path: &PathBuf) -> MurmurConfigFile {
    if !path.exists() {
        return MurmurConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                MurmurConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            MurmurConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/murmur/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("murmur").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let path = PathBuf::from("/nonexistent/murmur/config.toml");
        let config = load_config_from(&path);
        assert!(config.listen.calibration_secs.is_none());
        assert!(config.api_keys.openai.is_none());
    }

    #[test]
    fn partial_overlay_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[listen]\ntimeout_secs = 5.0\n\n[api_keys]\nopenai = \"sk-test\"\n",
        )
        .unwrap();

        let config = load_config_from(&path);
        assert_eq!(config.listen.timeout_secs, Some(5.0));
        assert!(config.listen.calibration_secs.is_none());
        assert_eq!(config.api_keys.openai.as_deref(), Some("sk-test"));
    }

    #[test]
    fn unparsable_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").unwrap();

        let config = load_config_from(&path);
        assert!(config.speech.stt_model.is_none());
    }
}
