//! Small text helpers shared by the domains.

use std::collections::HashSet;

/// Entries of `vocabulary` that occur as whole words in `text`, compared
/// case-insensitively and returned in vocabulary order.
pub fn terms_in(text: &str, vocabulary: &[&str]) -> Vec<String> {
    let lowered = text.to_lowercase();
    let words: HashSet<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    vocabulary
        .iter()
        .filter(|term| words.contains(**term))
        .map(|term| term.to_string())
        .collect()
}

/// `text` cut to `max` characters, with "..." appended when shortened.
pub fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{cut}...")
}
