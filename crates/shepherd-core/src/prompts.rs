//! Fixed prompt text and user-facing reply strings.
//!
//! Every pastoral fallback string lives here so the apology path is written
//! once, not per call site.

/// Persona instruction for open conversation.
pub const PERSONA: &str = "You are Shepherd, a deeply wise and Spirit-filled Christian counselor. \
     You speak with clarity, compassion, and theological depth. Respond with empathy, \
     quoting Scripture where appropriate. Keep replies warm and concise.";

/// Structural prompt for devotional generation.
pub const DEVOTIONAL: &str = "Write a short daily devotional with exactly this structure:\n\
     1. A scripture citation (book, chapter:verse) on its own line.\n\
     2. A reflection of two or three paragraphs on that passage.\n\
     3. A short prayer.\n\
     4. One question for the reader to carry through the day.";

/// Prompt for the "another verse" request — direct call, no persistence.
pub const ANOTHER_VERSE: &str = "Share one encouraging Bible verse with its citation, \
     followed by a single sentence of encouragement drawn from it.";

/// Build the meditation prompt from the user's latest devotional.
pub fn meditation(devotional: &str) -> String {
    format!(
        "Here is today's devotional:\n\n{devotional}\n\n\
         Guide the reader through a short, calming meditation on its scripture \
         passage. Slow pace, simple language, two or three breathing pauses."
    )
}

// --- Fixed replies ---

pub const CHAT_APOLOGY: &str = "I'm having trouble connecting to my spiritual guidance center. \
     Please try again soon.";

pub const STORE_APOLOGY: &str = "I couldn't reach your records just now. \
     Please try again in a little while.";

pub const DEVOTIONAL_APOLOGY: &str = "I wasn't able to prepare a fresh devotional right now. \
     Please ask me again in a little while.";

pub const DEVOTIONAL_QUEUED: &str = "Preparing your devotional — I'll send it in a moment. 🙏";

pub const JOURNAL_SAVED: &str = "Your journal entry is saved. 📖";
pub const JOURNAL_USAGE: &str = "Write something after the command, like:\n/journal Today I felt grateful";
pub const JOURNAL_EMPTY: &str = "Your journal has no entries yet. Start one with /journal followed by your thoughts.";
pub const JOURNAL_DELETED: &str = "Your most recent journal entry has been removed.";
pub const JOURNAL_DELETE_EMPTY: &str = "There are no journal entries to remove.";

pub const PRAYER_SAVED: &str = "Your prayer is lifted up and saved. 🙏";
pub const PRAYER_USAGE: &str = "Write your prayer after the command, like:\n/pray For peace in my family";
pub const PRAYER_EMPTY: &str = "You haven't saved any prayers yet. Add one with /pray followed by your prayer.";
pub const PRAYER_DELETED: &str = "Your most recent prayer has been removed.";
pub const PRAYER_DELETE_EMPTY: &str = "There are no prayers to remove.";

pub const MEDITATE_NO_DEVOTIONAL: &str =
    "There's no devotional to meditate on yet. Ask for one first with /devo.";

/// Default crisis-support reply, configurable via `[classifier] crisis_message`.
pub const CRISIS_DEFAULT: &str = "I hear how much pain you're carrying right now, and I'm glad you reached out. \
     You don't have to face this alone. Please talk to someone who can help right away: \
     call or text 988 (Suicide & Crisis Lifeline), any time, day or night. \
     You are deeply loved, and your life matters.";

pub const WELCOME: &str = "Welcome — I'm Shepherd, your pastoral companion. 🕊\n\n\
     You can talk to me about anything on your heart, or use the commands below:\n\n\
     /journal <text> — save a journal entry\n\
     /myjournal — your last 5 entries\n\
     /deletejournal — remove the latest entry\n\
     /pray <text> — save a prayer\n\
     /myprayers — your last 5 prayers\n\
     /deleteprayer — remove the latest prayer\n\
     /devo — today's devotional\n\
     /meditate — meditate on your latest devotional\n\
     /help — this message";

pub const HELP: &str = "Shepherd commands:\n\n\
     /journal <text> — save a journal entry\n\
     /myjournal — your last 5 entries\n\
     /deletejournal — remove the latest entry\n\
     /pray <text> — save a prayer\n\
     /myprayers — your last 5 prayers\n\
     /deleteprayer — remove the latest prayer\n\
     /devo — today's devotional\n\
     /meditate — meditate on your latest devotional\n\n\
     Anything else you send, we simply talk about together.";
