//! Interactive console loop
//!
//! One menu action per user request, each blocking until the external call
//! returns or times out. The only session state is the transcript history
//! and the adjustable listen controls.

use dialoguer::{Confirm, Input, Select};

use crate::browser;
use crate::config::{
    BrowserConfig, CALIBRATION_RANGE, Config, ListenConfig, PHRASE_LIMIT_RANGE, TIMEOUT_RANGE,
};
use crate::session::SessionHistory;
use crate::voice::{
    AudioCapture, AudioPlayback, Listener, SAMPLE_RATE, SpeechToText, TextToSpeech, samples_to_wav,
};
use crate::{Error, Result};

/// Menu entries, in display order
const MENU: [&str; 5] = [
    "Listen",
    "Listen and open in browser",
    "Show history",
    "Settings",
    "Quit",
];

/// The interactive voice console
pub struct Console {
    listen: ListenConfig,
    browser: BrowserConfig,
    stt: SpeechToText,
    tts: Option<TextToSpeech>,
    history: SessionHistory,
}

impl Console {
    /// Build a console from resolved configuration
    ///
    /// # Errors
    ///
    /// Returns error if the STT provider is not usable; a missing TTS key
    /// only disables speak-back.
    pub fn new(config: &Config) -> Result<Self> {
        let stt = SpeechToText::from_config(&config.speech, &config.api_keys)?;

        let tts = match TextToSpeech::from_config(&config.speech, &config.api_keys) {
            Ok(tts) => Some(tts),
            Err(e) => {
                tracing::warn!(error = %e, "TTS unavailable, speak-back disabled");
                None
            }
        };

        Ok(Self {
            listen: config.listen,
            browser: config.browser.clone(),
            stt,
            tts,
            history: SessionHistory::new(),
        })
    }

    /// Run the menu loop until the user quits
    ///
    /// # Errors
    ///
    /// Returns error if terminal interaction fails
    #[allow(clippy::future_not_send)] // cpal streams aren't Send
    pub async fn run(&mut self) -> anyhow::Result<()> {
        println!("murmur - press enter to pick an action, speak when prompted\n");

        loop {
            let choice = Select::new()
                .with_prompt("Action")
                .items(&MENU)
                .default(0)
                .interact()?;

            match choice {
                0 => self.action_listen().await,
                1 => self.action_listen_open().await,
                2 => self.show_history(),
                3 => self.adjust_settings()?,
                _ => break,
            }
            println!();
        }

        Ok(())
    }

    /// Capture one phrase and transcribe it
    #[allow(clippy::future_not_send)]
    async fn recognize_once(&self) -> Result<String> {
        let mut capture = AudioCapture::new()?;
        let listener = Listener::new(self.listen);
        let samples = listener.listen(&mut capture).await?;
        let wav = samples_to_wav(&samples, SAMPLE_RATE)?;
        self.stt.transcribe(&wav).await
    }

    /// Listen, show the transcript, record it, optionally speak it back
    #[allow(clippy::future_not_send)]
    async fn action_listen(&mut self) {
        println!("Listening...");

        let outcome = self.recognize_once().await;
        match apply_recognition(&mut self.history, outcome) {
            Ok(text) => {
                println!("You said: {text}");
                if self.listen.speak_back {
                    self.speak(&text).await;
                }
            }
            Err(message) => println!("{message}"),
        }
    }

    /// Listen for a destination and open it in the browser
    #[allow(clippy::future_not_send)]
    async fn action_listen_open(&mut self) {
        println!("Listening for a destination...");

        let destination = match self.recognize_once().await {
            Ok(text) => text,
            Err(e) => {
                println!("{}", failure_message(&e));
                return;
            }
        };

        let opened = browser::resolve_destination(&destination).and_then(|url| {
            browser::open_destination(&url, self.browser.executable.as_deref())?;
            Ok(url)
        });

        match opened {
            Ok(url) => {
                println!("Opened: {url}");
                if self.listen.speak_back {
                    self.speak(&destination).await;
                }
            }
            Err(e) => println!("{}", failure_message(&e)),
        }
    }

    /// Show the session history, most recent first
    fn show_history(&self) {
        if self.history.is_empty() {
            println!("No transcripts yet.");
            return;
        }

        for (idx, transcript) in self.history.recent().enumerate() {
            println!(
                "{}. [{}] {}",
                idx + 1,
                transcript.captured_at.format("%H:%M:%S"),
                transcript.text
            );
        }
    }

    /// Adjust the listen controls
    fn adjust_settings(&mut self) -> anyhow::Result<()> {
        let calibration_secs = prompt_seconds(
            "Noise calibration duration (s, 0 disables)",
            self.listen.calibration_secs,
            CALIBRATION_RANGE,
        )?;
        let timeout_secs = prompt_seconds(
            "Listen timeout (s, 0 disables)",
            self.listen.timeout_secs,
            TIMEOUT_RANGE,
        )?;
        let phrase_limit_secs = prompt_seconds(
            "Phrase time limit (s, 0 disables)",
            self.listen.phrase_limit_secs,
            PHRASE_LIMIT_RANGE,
        )?;
        let speak_back = Confirm::new()
            .with_prompt("Speak back the recognized text?")
            .default(self.listen.speak_back)
            .interact()?;

        self.listen = ListenConfig {
            calibration_secs,
            timeout_secs,
            phrase_limit_secs,
            speak_back,
        };
        self.listen.validate()?;

        println!("Settings updated.");
        Ok(())
    }

    /// Speak text through TTS; failure is reported, never fatal
    #[allow(clippy::future_not_send)]
    async fn speak(&self, text: &str) {
        let Some(tts) = &self.tts else {
            println!("Speak-back is on but TTS is not configured.");
            return;
        };

        if let Err(e) = speak_once(tts, text).await {
            println!("{}", failure_message(&e));
        }
    }
}

/// Synthesize and play one phrase
#[allow(clippy::future_not_send)]
async fn speak_once(tts: &TextToSpeech, text: &str) -> Result<()> {
    let audio = tts.synthesize(text).await?;
    let mut playback = AudioPlayback::new()?;
    playback.play_mp3(&audio).await
}

/// Apply a recognition outcome to the session history
///
/// Success appends exactly one transcript and returns the recognized text;
/// failure leaves the history untouched and returns the category message.
pub fn apply_recognition(
    history: &mut SessionHistory,
    outcome: Result<String>,
) -> std::result::Result<String, String> {
    match outcome {
        Ok(text) => {
            history.push(text.clone());
            Ok(text)
        }
        Err(e) => Err(failure_message(&e)),
    }
}

/// User-visible message for a failed action, one per error category
#[must_use]
pub fn failure_message(err: &Error) -> String {
    match err {
        Error::ListenTimeout => {
            "Listening timed out. Try increasing the timeout or speak sooner.".to_string()
        }
        Error::Unintelligible => "Sorry, I could not understand the audio.".to_string(),
        Error::Stt(e) => format!("Speech service error: {e}"),
        Error::Tts(e) => format!("Speech synthesis error: {e}"),
        Error::Browser(e) => format!("Could not open destination: {e}"),
        other => format!("Unexpected error: {other}"),
    }
}

/// Prompt for a seconds value within a range
fn prompt_seconds(prompt: &str, current: f64, (min, max): (f64, f64)) -> anyhow::Result<f64> {
    let value = Input::new()
        .with_prompt(prompt)
        .default(current)
        .validate_with(|v: &f64| {
            if (min..=max).contains(v) {
                Ok(())
            } else {
                Err(format!("must be between {min} and {max}"))
            }
        })
        .interact_text()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_appends_exactly_one() {
        let mut history = SessionHistory::new();
        let result = apply_recognition(&mut history, Ok("hello world".to_string()));

        assert_eq!(result.unwrap(), "hello world");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_timeout_leaves_history_unchanged() {
        let mut history = SessionHistory::new();
        history.push("earlier");

        let result = apply_recognition(&mut history, Err(Error::ListenTimeout));

        assert!(result.unwrap_err().contains("timed out"));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_failure_messages_by_category() {
        assert!(failure_message(&Error::Unintelligible).contains("could not understand"));
        assert!(failure_message(&Error::Stt("boom".to_string())).contains("Speech service error"));
        assert!(
            failure_message(&Error::Audio("no mic".to_string())).contains("Unexpected error")
        );
    }
}
