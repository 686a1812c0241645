//! Session transcript history
//!
//! The only stateful entity in the console: an in-memory ordered sequence of
//! transcripts scoped to one interactive session. Appended to on each
//! successful recognition, never persisted to storage.

use chrono::{DateTime, Utc};

/// One recognized utterance
#[derive(Debug, Clone)]
pub struct Transcript {
    /// Text produced by the recognition service
    pub text: String,

    /// When the recognition completed
    pub captured_at: DateTime<Utc>,
}

/// Ordered transcript history for one console session
#[derive(Debug, Default)]
pub struct SessionHistory {
    entries: Vec<Transcript>,
}

impl SessionHistory {
    /// Create an empty history
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append one transcript
    pub fn push(&mut self, text: impl Into<String>) {
        self.entries.push(Transcript {
            text: text.into(),
            captured_at: Utc::now(),
        });
    }

    /// Number of transcripts recorded this session
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any transcripts have been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate transcripts most-recent-first (display order)
    pub fn recent(&self) -> impl Iterator<Item = &Transcript> {
        self.entries.iter().rev()
    }

    /// Discard all transcripts
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_appends_in_order() {
        let mut history = SessionHistory::new();
        assert!(history.is_empty());

        history.push("first");
        history.push("second");

        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_recent_is_most_recent_first() {
        let mut history = SessionHistory::new();
        history.push("first");
        history.push("second");
        history.push("third");

        let texts: Vec<&str> = history.recent().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["third", "second", "first"]);
    }

    #[test]
    fn test_clear() {
        let mut history = SessionHistory::new();
        history.push("something");
        history.clear();
        assert!(history.is_empty());
    }
}
