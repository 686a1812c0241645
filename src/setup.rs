//! Interactive first-run setup wizard (`murmur setup`)

use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};

use crate::config::ListenConfig;
use crate::config::file::{
    ApiKeysFileConfig, BrowserFileConfig, ListenFileConfig, MurmurConfigFile, SpeechFileConfig,
};

/// Run the interactive setup wizard
///
/// # Errors
///
/// Returns error if user input fails or config cannot be written
pub fn run_setup() -> anyhow::Result<()> {
    println!("murmur setup\n");

    let existing = crate::config::file::load_config_file();
    let config_path = crate::config::file::config_file_path()
        .unwrap_or_else(|| PathBuf::from("~/.config/murmur/config.toml"));

    if config_path.exists() {
        println!("Existing config found at {}\n", config_path.display());
    }

    // 1. STT provider + API key
    let stt_providers = ["OpenAI Whisper", "Deepgram"];
    let default_stt = existing
        .speech
        .stt_provider
        .as_deref()
        .and_then(|p| match p {
            "whisper" => Some(0),
            "deepgram" => Some(1),
            _ => None,
        })
        .unwrap_or(0);

    let stt_idx = Select::new()
        .with_prompt("Select a speech recognition provider")
        .items(&stt_providers)
        .default(default_stt)
        .interact()?;
    let (stt_provider, stt_default_model) = if stt_idx == 0 {
        ("whisper", "whisper-1")
    } else {
        ("deepgram", "nova-2")
    };

    let mut api_keys = ApiKeysFileConfig::default();
    match stt_provider {
        "whisper" => {
            api_keys.openai = prompt_key("OpenAI", "OPENAI_API_KEY", existing.api_keys.openai.clone())?;
        }
        _ => {
            api_keys.deepgram =
                prompt_key("Deepgram", "DEEPGRAM_API_KEY", existing.api_keys.deepgram.clone())?;
        }
    }

    let stt_model: String = Input::new()
        .with_prompt("STT model")
        .default(
            existing
                .speech
                .stt_model
                .unwrap_or_else(|| stt_default_model.to_string()),
        )
        .interact_text()?;

    // 2. Speak-back (optional)
    let speak_default = existing
        .listen
        .speak_back
        .unwrap_or(ListenConfig::default().speak_back);
    let speak_back = Confirm::new()
        .with_prompt("Speak recognized text back (TTS)?")
        .default(speak_default)
        .interact()?;

    let speech = if speak_back {
        // TTS rides on the OpenAI key unless ElevenLabs is chosen
        let tts_providers = ["OpenAI", "ElevenLabs"];
        let default_tts = existing
            .speech
            .tts_provider
            .as_deref()
            .and_then(|p| match p {
                "openai" => Some(0),
                "elevenlabs" => Some(1),
                _ => None,
            })
            .unwrap_or(0);

        let tts_idx = Select::new()
            .with_prompt("Select a speech synthesis provider")
            .items(&tts_providers)
            .default(default_tts)
            .interact()?;
        let tts_provider = if tts_idx == 0 { "openai" } else { "elevenlabs" };

        if tts_provider == "openai" && api_keys.openai.is_none() {
            api_keys.openai = prompt_key("OpenAI", "OPENAI_API_KEY", existing.api_keys.openai.clone())?;
        }
        if tts_provider == "elevenlabs" {
            api_keys.elevenlabs = prompt_key(
                "ElevenLabs",
                "ELEVENLABS_API_KEY",
                existing.api_keys.elevenlabs.clone(),
            )?;
        }

        let tts_voice: String = Input::new()
            .with_prompt("TTS voice")
            .default(
                existing
                    .speech
                    .tts_voice
                    .unwrap_or_else(|| "alloy".to_string()),
            )
            .interact_text()?;

        SpeechFileConfig {
            stt_provider: Some(stt_provider.to_string()),
            stt_model: Some(stt_model),
            tts_provider: Some(tts_provider.to_string()),
            tts_model: existing.speech.tts_model.or_else(|| Some("tts-1".to_string())),
            tts_voice: Some(tts_voice),
            tts_speed: existing.speech.tts_speed.or(Some(1.0)),
        }
    } else {
        SpeechFileConfig {
            stt_provider: Some(stt_provider.to_string()),
            stt_model: Some(stt_model),
            ..SpeechFileConfig::default()
        }
    };

    // 3. Browser (optional)
    let browser_prompt: String = Input::new()
        .with_prompt("Browser executable (leave blank for the OS default)")
        .allow_empty(true)
        .default(existing.browser.executable.unwrap_or_default())
        .interact_text()?;
    let browser = BrowserFileConfig {
        executable: (!browser_prompt.is_empty()).then_some(browser_prompt),
    };

    // 4. Build and write config
    let defaults = ListenConfig::default();
    let config_file = MurmurConfigFile {
        listen: ListenFileConfig {
            calibration_secs: existing
                .listen
                .calibration_secs
                .or(Some(defaults.calibration_secs)),
            timeout_secs: existing.listen.timeout_secs.or(Some(defaults.timeout_secs)),
            phrase_limit_secs: existing
                .listen
                .phrase_limit_secs
                .or(Some(defaults.phrase_limit_secs)),
            speak_back: Some(speak_back),
        },
        speech,
        api_keys,
        browser,
    };

    write_config(&config_path, &config_file)?;
    println!("\nConfig written to {}", config_path.display());
    println!("\nSetup complete! Run `murmur` to start the console.");

    Ok(())
}

/// Prompt for an API key, keeping the existing one when input is blank
fn prompt_key(
    provider: &str,
    env_hint: &str,
    existing: Option<String>,
) -> anyhow::Result<Option<String>> {
    let masked = existing.as_deref().map(|k| {
        if k.len() > 8 {
            format!("{}...{}", &k[..4], &k[k.len() - 4..])
        } else {
            "****".to_string()
        }
    });

    let prompt = masked.map_or_else(
        || format!("{provider} API key ({env_hint})"),
        |m| format!("{provider} API key (current: {m}, leave blank to keep)"),
    );

    let input: String = Input::new()
        .with_prompt(&prompt)
        .allow_empty(true)
        .interact_text()?;

    Ok(if input.is_empty() { existing } else { Some(input) })
}

/// Serialize and write the config file
fn write_config(path: &PathBuf, config: &MurmurConfigFile) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml = serialize_config(config);
    std::fs::write(path, toml)?;

    Ok(())
}

/// Serialize config to a readable TOML string
fn serialize_config(config: &MurmurConfigFile) -> String {
    let mut out = String::new();

    // [listen]
    let li = &config.listen;
    if li.calibration_secs.is_some()
        || li.timeout_secs.is_some()
        || li.phrase_limit_secs.is_some()
        || li.speak_back.is_some()
    {
        out.push_str("[listen]\n");
        if let Some(v) = li.calibration_secs {
            out.push_str(&format!("calibration_secs = {v}\n"));
        }
        if let Some(v) = li.timeout_secs {
            out.push_str(&format!("timeout_secs = {v}\n"));
        }
        if let Some(v) = li.phrase_limit_secs {
            out.push_str(&format!("phrase_limit_secs = {v}\n"));
        }
        if let Some(v) = li.speak_back {
            out.push_str(&format!("speak_back = {v}\n"));
        }
        out.push('\n');
    }

    // [speech]
    let sp = &config.speech;
    if sp.stt_provider.is_some() || sp.tts_provider.is_some() {
        out.push_str("[speech]\n");
        for (key, val) in [
            ("stt_provider", &sp.stt_provider),
            ("stt_model", &sp.stt_model),
            ("tts_provider", &sp.tts_provider),
            ("tts_model", &sp.tts_model),
            ("tts_voice", &sp.tts_voice),
        ] {
            if let Some(v) = val {
                out.push_str(&format!("{key} = \"{v}\"\n"));
            }
        }
        if let Some(v) = sp.tts_speed {
            out.push_str(&format!("tts_speed = {v}\n"));
        }
        out.push('\n');
    }

    // [api_keys]
    let ak = &config.api_keys;
    if ak.openai.is_some() || ak.deepgram.is_some() || ak.elevenlabs.is_some() {
        out.push_str("[api_keys]\n");
        for (key, val) in [
            ("openai", &ak.openai),
            ("deepgram", &ak.deepgram),
            ("elevenlabs", &ak.elevenlabs),
        ] {
            if let Some(v) = val {
                out.push_str(&format!("{key} = \"{v}\"\n"));
            }
        }
        out.push('\n');
    }

    // [browser]
    if let Some(ref exe) = config.browser.executable {
        out.push_str("[browser]\n");
        out.push_str(&format!("executable = \"{exe}\"\n"));
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_config_round_trips() {
        let config = MurmurConfigFile {
            listen: ListenFileConfig {
                calibration_secs: Some(1.0),
                timeout_secs: Some(3.0),
                phrase_limit_secs: Some(6.0),
                speak_back: Some(true),
            },
            speech: SpeechFileConfig {
                stt_provider: Some("whisper".to_string()),
                stt_model: Some("whisper-1".to_string()),
                tts_provider: Some("openai".to_string()),
                tts_model: Some("tts-1".to_string()),
                tts_voice: Some("alloy".to_string()),
                tts_speed: Some(1.0),
            },
            api_keys: ApiKeysFileConfig {
                openai: Some("sk-test".to_string()),
                deepgram: None,
                elevenlabs: None,
            },
            browser: BrowserFileConfig {
                executable: Some("firefox".to_string()),
            },
        };

        let toml = serialize_config(&config);
        let parsed: MurmurConfigFile = toml::from_str(&toml).unwrap();

        assert_eq!(parsed.listen.timeout_secs, Some(3.0));
        assert_eq!(parsed.speech.stt_provider.as_deref(), Some("whisper"));
        assert_eq!(parsed.api_keys.openai.as_deref(), Some("sk-test"));
        assert_eq!(parsed.browser.executable.as_deref(), Some("firefox"));
    }
}
