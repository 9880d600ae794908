//! Scripture-reference extraction from generated devotional text.

use regex::Regex;
use std::sync::OnceLock;

/// Matches `Book Chapter:Verse` with an optional leading ordinal ("1 John")
/// and an optional verse range ("Romans 8:28-30"). Multi-word books like
/// "Song of Solomon" are covered by the `of` branch.
fn reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?:[1-3]\s+)?[A-Z][A-Za-z]+(?:\s+of\s+[A-Z][A-Za-z]+)?\s+\d{1,3}:\d{1,3}(?:\s*[-\x{2013}]\s*\d{1,3})?",
        )
        .expect("scripture reference regex is valid")
    })
}

/// Extract the first scripture reference from `text`, normalized to single
/// spaces. Returns `None` when no reference is present.
pub fn extract_reference(text: &str) -> Option<String> {
    let m = reference_regex().find(text)?;
    Some(normalize(m.as_str()))
}

fn normalize(reference: &str) -> String {
    reference.split_whitespace().collect::<Vec<_>>().join(" ")
}
