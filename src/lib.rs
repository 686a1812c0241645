//! murmur - interactive voice transcription console
//!
//! This library provides the pieces behind the `murmur` binary:
//! - Bounded microphone listening (calibration, timeout, phrase limit)
//! - Cloud STT/TTS clients
//! - Session transcript history
//! - Opening recognized text in a browser
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Console (menu)                 │
//! │  Listen │ Listen & open │ History │ Settings │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────┐
//! │   Listener (calibrate → segment → bound)     │
//! │   Capture │ Segmenter │ Playback             │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────┐
//! │        External services and OS              │
//! │   STT API │ TTS API │ Browser launcher       │
//! └─────────────────────────────────────────────┘
//! ```

pub mod browser;
pub mod config;
pub mod console;
pub mod error;
pub mod session;
pub mod setup;
pub mod voice;

pub use config::Config;
pub use console::Console;
pub use error::{Error, Result};
pub use session::{SessionHistory, Transcript};
