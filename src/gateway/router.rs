//! Fixed-priority command routing.
//!
//! Matching is done on trimmed, lower-cased text; payloads keep the original
//! casing. The order below is deliberate — some command texts are prefixes
//! of longer phrases, and the first match wins.

/// A recognized command. `None` from [`parse`] means open conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Command {
    /// `/journal <text>` — body may be empty (yields a usage hint).
    JournalWrite(String),
    /// `/myjournal`
    JournalRead,
    /// `/deletejournal`
    JournalDeleteLatest,
    /// `/pray <text>` — body may be empty (yields a usage hint).
    PrayerWrite(String),
    /// `/myprayers`
    PrayerRead,
    /// `/deleteprayer`
    PrayerDeleteLatest,
    /// `/devo`
    Devotional,
    /// Natural-language "give me another verse" synonyms.
    AnotherVerse,
    /// `/meditate`
    Meditate,
    /// `/start`
    Start,
    /// `/help`
    Help,
}

/// Exact-match synonyms for the additional-verse request.
const ANOTHER_VERSE_SYNONYMS: &[&str] = &[
    "another verse",
    "give me another verse",
    "one more verse",
    "more scripture",
    "another scripture",
];

/// Route text to a command, or `None` for conversational fallback.
/// Evaluated in fixed priority order; exactly one branch applies.
pub(super) fn parse(text: &str) -> Option<Command> {
    let trimmed = text.trim();
    let lowered = trimmed.to_lowercase();

    if lowered.starts_with("/journal") {
        let body = trimmed["/journal".len()..].trim();
        return Some(Command::JournalWrite(body.to_string()));
    }
    if lowered == "/myjournal" {
        return Some(Command::JournalRead);
    }
    if lowered == "/deletejournal" {
        return Some(Command::JournalDeleteLatest);
    }
    if lowered.starts_with("/pray") {
        let body = trimmed["/pray".len()..].trim();
        return Some(Command::PrayerWrite(body.to_string()));
    }
    if lowered == "/myprayers" {
        return Some(Command::PrayerRead);
    }
    if lowered == "/deleteprayer" {
        return Some(Command::PrayerDeleteLatest);
    }
    if lowered == "/devo" {
        return Some(Command::Devotional);
    }
    if ANOTHER_VERSE_SYNONYMS.contains(&lowered.as_str()) {
        return Some(Command::AnotherVerse);
    }
    if lowered == "/meditate" {
        return Some(Command::Meditate);
    }
    if lowered == "/start" {
        return Some(Command::Start);
    }
    if lowered == "/help" {
        return Some(Command::Help);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journal_write_with_body() {
        assert_eq!(
            parse("/journal Today I felt grateful"),
            Some(Command::JournalWrite("Today I felt grateful".into()))
        );
    }

    #[test]
    fn test_bare_journal_is_write_with_empty_body() {
        // Must route to the journal handler (usage hint), not fall through
        // to conversation.
        assert_eq!(parse("/journal"), Some(Command::JournalWrite(String::new())));
        assert_eq!(
            parse("  /journal   "),
            Some(Command::JournalWrite(String::new()))
        );
    }

    #[test]
    fn test_payload_keeps_original_casing() {
        assert_eq!(
            parse("/JOURNAL Bless the LORD"),
            Some(Command::JournalWrite("Bless the LORD".into()))
        );
        assert_eq!(
            parse("/pray For my Mother"),
            Some(Command::PrayerWrite("For my Mother".into()))
        );
    }

    #[test]
    fn test_exact_commands() {
        assert_eq!(parse("/myjournal"), Some(Command::JournalRead));
        assert_eq!(parse("/deletejournal"), Some(Command::JournalDeleteLatest));
        assert_eq!(parse("/myprayers"), Some(Command::PrayerRead));
        assert_eq!(parse("/deleteprayer"), Some(Command::PrayerDeleteLatest));
        assert_eq!(parse("/devo"), Some(Command::Devotional));
        assert_eq!(parse("/meditate"), Some(Command::Meditate));
        assert_eq!(parse("/start"), Some(Command::Start));
        assert_eq!(parse("/help"), Some(Command::Help));
    }

    #[test]
    fn test_exact_commands_are_case_insensitive() {
        assert_eq!(parse("/MyJournal"), Some(Command::JournalRead));
        assert_eq!(parse("/DEVO"), Some(Command::Devotional));
    }

    #[test]
    fn test_another_verse_synonyms_exact_only() {
        assert_eq!(parse("another verse"), Some(Command::AnotherVerse));
        assert_eq!(parse("Give me another verse"), Some(Command::AnotherVerse));
        // Substrings don't count — this is open conversation.
        assert_eq!(parse("could you give me another verse please"), None);
    }

    #[test]
    fn test_no_match_falls_through() {
        assert_eq!(parse("I had a rough day"), None);
        assert_eq!(parse("/unknown"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_devo_with_argument_is_not_devo() {
        // /devo is exact-match; trailing text means conversation.
        assert_eq!(parse("/devo please"), None);
    }

    #[test]
    fn test_priority_journal_prefix_before_exacts() {
        // "/journaling today" hits the /journal prefix branch first.
        assert_eq!(
            parse("/journaling today"),
            Some(Command::JournalWrite("ing today".into()))
        );
    }
}
