//! Opening recognized text in a web browser
//!
//! Resolves a spoken phrase to an openable URL and launches it through a
//! configured browser executable or the OS default handler.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

/// Regex for detecting URLs
static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<>\[\](){}]+").expect("valid regex"));

/// Find the first URL in a string, with trailing punctuation trimmed
#[must_use]
pub fn detect_url(text: &str) -> Option<String> {
    URL_REGEX.find(text).map(|m| {
        m.as_str()
            .trim_end_matches(|c| matches!(c, '.' | ',' | '!' | '?' | ')' | ']' | '}'))
            .to_string()
    })
}

/// Resolve recognized text to an openable URL
///
/// An explicit URL inside the text wins. A domain-looking phrase (contains a
/// dot once whitespace is removed) becomes an https URL. Anything else
/// becomes a web search for the phrase.
///
/// # Errors
///
/// Returns error if the text is empty
pub fn resolve_destination(text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::Browser("no destination recognized".to_string()));
    }

    if let Some(url) = detect_url(text) {
        return Ok(url);
    }

    // Spoken domains arrive with spaces and capitals ("example dot com"
    // already resolved by the recognizer to "Example. Com" or similar)
    let despaced: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let despaced = despaced.trim_end_matches(['.', ',', '!', '?']);

    if despaced.contains('.') {
        let candidate = format!("https://{despaced}");
        if url::Url::parse(&candidate).is_ok() {
            return Ok(candidate);
        }
    }

    Ok(format!(
        "https://duckduckgo.com/?q={}",
        urlencoding::encode(text)
    ))
}

/// Open a URL in the configured browser, or the OS default when none is set
///
/// # Errors
///
/// Returns error if the configured executable cannot be resolved or the
/// launch fails
pub fn open_destination(url: &str, executable: Option<&Path>) -> Result<()> {
    match executable {
        Some(exe) => {
            let resolved = which::which(exe).map_err(|e| {
                Error::Browser(format!("browser executable {}: {e}", exe.display()))
            })?;

            tracing::info!(url, browser = %resolved.display(), "opening destination");
            open::with_detached(url, resolved.to_string_lossy().into_owned())
                .map_err(|e| Error::Browser(format!("failed to open {url}: {e}")))
        }
        None => {
            tracing::info!(url, "opening destination in default browser");
            open::that_detached(url)
                .map_err(|e| Error::Browser(format!("failed to open {url}: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_simple_url() {
        assert_eq!(
            detect_url("Check out https://example.com for more info").as_deref(),
            Some("https://example.com")
        );
    }

    #[test]
    fn test_detect_strips_trailing_punctuation() {
        assert_eq!(
            detect_url("See https://example.com.").as_deref(),
            Some("https://example.com")
        );
    }

    #[test]
    fn test_no_url() {
        assert!(detect_url("This has no URLs in it").is_none());
    }

    #[test]
    fn test_resolve_explicit_url_wins() {
        let url = resolve_destination("open https://example.com/page please").unwrap();
        assert_eq!(url, "https://example.com/page");
    }

    #[test]
    fn test_resolve_spoken_domain() {
        let url = resolve_destination("Example. Com").unwrap();
        assert_eq!(url, "https://example.com");
    }

    #[test]
    fn test_resolve_phrase_becomes_search() {
        let url = resolve_destination("weather in paris").unwrap();
        assert!(url.starts_with("https://duckduckgo.com/?q="));
        assert!(url.contains("weather"));
    }

    #[test]
    fn test_resolve_empty_is_error() {
        assert!(resolve_destination("   ").is_err());
    }
}
