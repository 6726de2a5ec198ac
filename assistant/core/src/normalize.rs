//! Text Normalization
//!
//! Pure text-to-key transforms shared by every catalog lookup.
//!
//! Two modes exist:
//!
//! - [`NormalizeMode::Strict`]: lowercase and collapse whitespace, keeping
//!   punctuation. Used for direct catalog-key lookup and for recognizing
//!   affirmative replies.
//! - [`NormalizeMode::Fuzzy`]: additionally strip everything outside
//!   `[a-z0-9 ]`. Used when comparing long-form answer prose, which may have
//!   been edited or truncated since it was shown.
//!
//! Both modes are total: any string is valid input, and the empty string
//! normalizes to the empty key (which matches nothing).

use serde::{Deserialize, Serialize};

/// The reply that confirms a pending code offer
pub const AFFIRMATIVE: &str = "yes";

/// Normalization mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizeMode {
    /// Lowercase + whitespace collapse, punctuation preserved
    Strict,
    /// Lowercase + `[a-z0-9 ]` only + whitespace collapse
    Fuzzy,
}

/// Normalize `text` according to `mode`
#[must_use]
pub fn normalize(text: &str, mode: NormalizeMode) -> String {
    match mode {
        NormalizeMode::Strict => strict_key(text),
        NormalizeMode::Fuzzy => fuzzy_key(text),
    }
}

/// Strict-mode key: lowercase, whitespace runs collapsed to one space, trimmed
#[must_use]
pub fn strict_key(text: &str) -> String {
    collapse_whitespace(&text.to_lowercase())
}

/// Fuzzy-mode key: lowercase, only `[a-z0-9 ]` kept, whitespace collapsed, trimmed
///
/// Characters are stripped before whitespace is collapsed, so a newline
/// between two words disappears rather than turning into a space.
#[must_use]
pub fn fuzzy_key(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .collect();
    collapse_whitespace(&kept)
}

/// Whether `text` is an affirmative reply ("yes", any case, surrounding whitespace ignored)
#[must_use]
pub fn is_affirmative(text: &str) -> bool {
    strict_key(text) == AFFIRMATIVE
}

/// Whether `text` contains `marker`, ignoring ASCII case
///
/// Markers are ASCII phrases, so an ASCII-lowercased haystack keeps byte
/// offsets aligned with the original text.
#[must_use]
pub fn contains_marker(text: &str, marker: &str) -> bool {
    find_marker(text, marker).is_some()
}

/// Byte offset of the first occurrence of `marker` in `text`, ignoring ASCII case
#[must_use]
pub fn find_marker(text: &str, marker: &str) -> Option<usize> {
    if marker.is_empty() {
        return None;
    }
    text.to_ascii_lowercase()
        .find(&marker.to_ascii_lowercase())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_collapses_and_lowercases() {
        assert_eq!(
            strict_key("  How do I   Enable\tGuardDuty \n"),
            "how do i enable guardduty"
        );
    }

    #[test]
    fn test_strict_preserves_punctuation() {
        assert_eq!(strict_key("Connect Jira to OrgBot?"), "connect jira to orgbot?");
    }

    #[test]
    fn test_fuzzy_strips_punctuation() {
        assert_eq!(
            fuzzy_key("To check for public S3 buckets, you can use Python (boto3)."),
            "to check for public s3 buckets you can use python boto3"
        );
    }

    #[test]
    fn test_fuzzy_joins_words_split_by_newline() {
        // Newlines are outside the kept set and vanish before collapsing
        assert_eq!(fuzzy_key("how:\n\n1. Define"), "how1 define");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(strict_key(""), "");
        assert_eq!(fuzzy_key("   "), "");
        assert_eq!(fuzzy_key("?!"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "",
            "  YES  ",
            "Check for public S3 buckets",
            "Would you like to see a sample script?",
            "Tabs\tand\nnewlines\r\n  everywhere",
            "Ünïcödé and émojis 🔧 too",
            "how do i assign different permission sets to two teams of users across multiple aws accounts",
        ];

        for mode in [NormalizeMode::Strict, NormalizeMode::Fuzzy] {
            for sample in samples {
                let once = normalize(sample, mode);
                assert_eq!(normalize(&once, mode), once, "mode {mode:?}, input {sample:?}");
            }
        }
    }

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("yes"));
        assert!(is_affirmative("  YES \n"));
        assert!(is_affirmative("Yes"));
        assert!(!is_affirmative("yes please"));
        assert!(!is_affirmative("yes."));
        assert!(!is_affirmative("y"));
        assert!(!is_affirmative(""));
    }

    #[test]
    fn test_marker_detection_ignores_case() {
        let text = "Here's how. Would you like to see a sample script?";
        assert!(contains_marker(text, "would you like"));
        assert_eq!(find_marker(text, "WOULD YOU LIKE"), Some(12));
        assert!(!contains_marker("No offer here.", "would you like"));
        assert!(!contains_marker(text, ""));
    }
}
