use super::Gateway;
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use shepherd_core::{
    config::{ConversationConfig, DevotionalConfig},
    context::Context,
    error::ShepherdError,
    message::{IncomingMessage, OutgoingMessage},
    prompts,
    traits::{Channel, Classifier, Provider, Verdict},
};
use shepherd_store::{devotional_key, journal_key, verse_set_key, MemoryStore, RecordStore};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Provider that replays scripted responses and records every context it saw.
struct MockProvider {
    responses: Mutex<VecDeque<String>>,
    contexts: Mutex<Vec<Context>>,
    fail: bool,
}

impl MockProvider {
    fn scripted(responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            contexts: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            contexts: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    fn calls(&self) -> usize {
        self.contexts.lock().unwrap().len()
    }

    fn context_at(&self, i: usize) -> Context {
        self.contexts.lock().unwrap()[i].clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, context: &Context) -> Result<OutgoingMessage, ShepherdError> {
        self.contexts.lock().unwrap().push(context.clone());
        if self.fail {
            return Err(ShepherdError::Provider("mock provider down".to_string()));
        }
        let text = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "Peace be with you.".to_string());
        Ok(OutgoingMessage {
            text,
            ..Default::default()
        })
    }

    async fn is_available(&self) -> bool {
        !self.fail
    }
}

struct MockClassifier {
    verdict: Option<Verdict>,
}

impl MockClassifier {
    fn safe() -> Arc<Self> {
        Arc::new(Self {
            verdict: Some(Verdict::Safe),
        })
    }

    fn crisis(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            verdict: Some(Verdict::Crisis(reply.to_string())),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { verdict: None })
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn classify(&self, _text: &str) -> Result<Verdict, ShepherdError> {
        match &self.verdict {
            Some(v) => Ok(v.clone()),
            None => Err(ShepherdError::Classifier("mock classifier down".to_string())),
        }
    }
}

/// Channel that records everything sent through it.
struct MockChannel {
    sent: Mutex<Vec<OutgoingMessage>>,
}

impl MockChannel {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Channel for MockChannel {
    fn name(&self) -> &str {
        "test"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, ShepherdError> {
        let (_tx, rx) = mpsc::channel(1);
        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), ShepherdError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

struct Fixture {
    gateway: Gateway,
    channel: Arc<MockChannel>,
    store: Arc<MemoryStore>,
}

fn fixture(
    provider: Arc<MockProvider>,
    classifier: Arc<MockClassifier>,
    devotional: DevotionalConfig,
) -> Fixture {
    let channel = MockChannel::new();
    let store = Arc::new(MemoryStore::new());

    let mut channels: HashMap<String, Arc<dyn Channel>> = HashMap::new();
    channels.insert("test".to_string(), channel.clone());

    let gateway = Gateway::new(
        provider,
        classifier,
        channels,
        store.clone(),
        devotional,
        ConversationConfig { turn_window: 5 },
    );

    Fixture {
        gateway,
        channel,
        store,
    }
}

fn incoming(sender_id: &str, text: &str) -> IncomingMessage {
    IncomingMessage {
        id: Uuid::new_v4(),
        channel: "test".to_string(),
        sender_id: sender_id.to_string(),
        sender_name: None,
        text: text.to_string(),
        timestamp: Utc::now(),
        reply_target: Some(sender_id.to_string()),
    }
}

#[tokio::test]
async fn test_crisis_short_circuits_everything() {
    let provider = MockProvider::scripted(&[]);
    let f = fixture(
        provider.clone(),
        MockClassifier::crisis("please call 988"),
        DevotionalConfig::default(),
    );

    // Even a command is preempted by the crisis verdict.
    f.gateway.handle_message(incoming("42", "/journal dark thoughts")).await;

    let sent = f.channel.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, "please call 988");
    assert_eq!(provider.calls(), 0);
    let entries = f.store.peek_range(&journal_key("42"), 0, 4).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_classifier_outage_fails_open() {
    let f = fixture(
        MockProvider::scripted(&[]),
        MockClassifier::failing(),
        DevotionalConfig::default(),
    );

    f.gateway
        .handle_message(incoming("42", "/journal Today I felt grateful"))
        .await;

    let sent = f.channel.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, prompts::JOURNAL_SAVED);
}

#[tokio::test]
async fn test_journal_write_then_read() {
    let f = fixture(
        MockProvider::scripted(&[]),
        MockClassifier::safe(),
        DevotionalConfig::default(),
    );

    f.gateway
        .handle_message(incoming("42", "/journal Today I felt grateful"))
        .await;
    f.gateway.handle_message(incoming("42", "/myjournal")).await;

    let sent = f.channel.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].text, prompts::JOURNAL_SAVED);
    assert!(sent[1].text.contains("Today I felt grateful"));
}

#[tokio::test]
async fn test_empty_journal_read() {
    let f = fixture(
        MockProvider::scripted(&[]),
        MockClassifier::safe(),
        DevotionalConfig::default(),
    );

    f.gateway.handle_message(incoming("42", "/myjournal")).await;

    assert_eq!(f.channel.sent()[0].text, prompts::JOURNAL_EMPTY);
}

#[tokio::test]
async fn test_journal_read_caps_at_five_newest_first() {
    let f = fixture(
        MockProvider::scripted(&[]),
        MockClassifier::safe(),
        DevotionalConfig::default(),
    );

    for i in 1..=6 {
        f.gateway
            .handle_message(incoming("42", &format!("/journal entry number {i}")))
            .await;
    }
    f.gateway.handle_message(incoming("42", "/myjournal")).await;

    let listing = f.channel.sent().last().unwrap().text.clone();
    assert!(listing.contains("1. ") && listing.contains("entry number 6"));
    assert!(listing.contains("entry number 2"));
    assert!(!listing.contains("entry number 1"));
}

#[tokio::test]
async fn test_delete_latest_journal_entry() {
    let f = fixture(
        MockProvider::scripted(&[]),
        MockClassifier::safe(),
        DevotionalConfig::default(),
    );

    f.gateway.handle_message(incoming("42", "/journal first")).await;
    f.gateway.handle_message(incoming("42", "/journal second")).await;
    f.gateway.handle_message(incoming("42", "/deletejournal")).await;
    f.gateway.handle_message(incoming("42", "/myjournal")).await;

    let sent = f.channel.sent();
    assert_eq!(sent[2].text, prompts::JOURNAL_DELETED);
    assert!(sent[3].text.contains("first"));
    assert!(!sent[3].text.contains("second"));
}

#[tokio::test]
async fn test_delete_on_empty_journal() {
    let f = fixture(
        MockProvider::scripted(&[]),
        MockClassifier::safe(),
        DevotionalConfig::default(),
    );

    f.gateway.handle_message(incoming("42", "/deletejournal")).await;

    assert_eq!(f.channel.sent()[0].text, prompts::JOURNAL_DELETE_EMPTY);
}

#[tokio::test]
async fn test_bare_journal_gives_usage_hint() {
    let f = fixture(
        MockProvider::scripted(&[]),
        MockClassifier::safe(),
        DevotionalConfig::default(),
    );

    f.gateway.handle_message(incoming("42", "/journal")).await;

    assert_eq!(f.channel.sent()[0].text, prompts::JOURNAL_USAGE);
    let entries = f.store.peek_range(&journal_key("42"), 0, 4).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_prayer_flow() {
    let f = fixture(
        MockProvider::scripted(&[]),
        MockClassifier::safe(),
        DevotionalConfig::default(),
    );

    f.gateway
        .handle_message(incoming("42", "/pray For peace in my family"))
        .await;
    f.gateway.handle_message(incoming("42", "/myprayers")).await;

    let sent = f.channel.sent();
    assert_eq!(sent[0].text, prompts::PRAYER_SAVED);
    assert!(sent[1].text.contains("For peace in my family"));
    // Prayers don't leak into the journal.
    let entries = f.store.peek_range(&journal_key("42"), 0, 4).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_meditate_without_devotional_makes_no_model_call() {
    let provider = MockProvider::scripted(&[]);
    let f = fixture(
        provider.clone(),
        MockClassifier::safe(),
        DevotionalConfig::default(),
    );

    f.gateway.handle_message(incoming("42", "/meditate")).await;

    assert_eq!(f.channel.sent()[0].text, prompts::MEDITATE_NO_DEVOTIONAL);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_meditate_uses_latest_devotional() {
    let provider = MockProvider::scripted(&["Breathe in... breathe out..."]);
    let f = fixture(
        provider.clone(),
        MockClassifier::safe(),
        DevotionalConfig::default(),
    );

    f.store
        .set_value(&devotional_key("42"), "John 3:16\n\nFor God so loved the world...")
        .await
        .unwrap();

    f.gateway.handle_message(incoming("42", "/meditate")).await;

    assert_eq!(f.channel.sent()[0].text, "Breathe in... breathe out...");
    assert!(provider.context_at(0).current_message.contains("John 3:16"));
}

#[tokio::test]
async fn test_devotional_saved_and_verse_recorded() {
    let devo = "John 3:16\n\nFor God so loved the world, that he gave his only Son.";
    let provider = MockProvider::scripted(&[devo]);
    let f = fixture(
        provider,
        MockClassifier::safe(),
        DevotionalConfig::default(),
    );

    f.gateway.handle_message(incoming("42", "/devo")).await;

    assert_eq!(f.channel.sent()[0].text, devo);
    assert_eq!(
        f.store.get_value(&devotional_key("42")).await.unwrap(),
        Some(devo.to_string())
    );
    let set_key = verse_set_key(Utc::now().year());
    assert!(f.store.is_member(&set_key, "John 3:16").await.unwrap());
}

#[tokio::test]
async fn test_devotional_retries_past_used_verse() {
    let used = "John 3:16\n\nFor God so loved the world.";
    let fresh = "Psalm 23:1\n\nThe Lord is my shepherd.";
    let provider = MockProvider::scripted(&[used, fresh]);
    let f = fixture(
        provider.clone(),
        MockClassifier::safe(),
        DevotionalConfig::default(),
    );

    let set_key = verse_set_key(Utc::now().year());
    f.store.add_to_set(&set_key, "John 3:16").await.unwrap();

    f.gateway.handle_message(incoming("42", "/devo")).await;

    assert_eq!(f.channel.sent()[0].text, fresh);
    assert_eq!(provider.calls(), 2);
    assert!(f.store.is_member(&set_key, "Psalm 23:1").await.unwrap());
}

#[tokio::test]
async fn test_devotional_exhausted_attempts_leaves_slot_unchanged() {
    let dup = "John 3:16\n\nFor God so loved the world.";
    let provider = MockProvider::scripted(&[dup, dup, dup, dup, dup]);
    let f = fixture(
        provider.clone(),
        MockClassifier::safe(),
        DevotionalConfig {
            deferred: false,
            max_attempts: 5,
        },
    );

    let set_key = verse_set_key(Utc::now().year());
    f.store.add_to_set(&set_key, "John 3:16").await.unwrap();

    f.gateway.handle_message(incoming("42", "/devo")).await;

    assert_eq!(f.channel.sent()[0].text, prompts::DEVOTIONAL_APOLOGY);
    assert_eq!(provider.calls(), 5);
    assert_eq!(f.store.get_value(&devotional_key("42")).await.unwrap(), None);
}

#[tokio::test]
async fn test_deferred_devotional_acks_immediately() {
    let provider = MockProvider::scripted(&[]);
    let f = fixture(
        provider.clone(),
        MockClassifier::safe(),
        DevotionalConfig {
            deferred: true,
            max_attempts: 5,
        },
    );

    f.gateway.handle_message(incoming("42", "/devo")).await;

    // The worker isn't running in this test; only the ack goes out.
    assert_eq!(f.channel.sent()[0].text, prompts::DEVOTIONAL_QUEUED);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_fallback_conversation_touches_no_records() {
    let provider = MockProvider::scripted(&["The Lord is near to the brokenhearted."]);
    let f = fixture(
        provider.clone(),
        MockClassifier::safe(),
        DevotionalConfig::default(),
    );

    f.gateway.handle_message(incoming("42", "I had a rough day")).await;

    assert_eq!(
        f.channel.sent()[0].text,
        "The Lord is near to the brokenhearted."
    );
    assert_eq!(provider.context_at(0).system_prompt, prompts::PERSONA);
    let entries = f.store.peek_range(&journal_key("42"), 0, 4).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_fallback_history_is_bounded_per_user() {
    let provider = MockProvider::scripted(&[]);
    let f = fixture(
        provider.clone(),
        MockClassifier::safe(),
        DevotionalConfig::default(),
    );

    for i in 1..=7 {
        f.gateway
            .handle_message(incoming("42", &format!("turn {i}")))
            .await;
    }

    // Seventh call sees at most turn_window (5) prior turns, oldest dropped.
    let ctx = provider.context_at(6);
    assert_eq!(ctx.history.len(), 5);
    assert_eq!(ctx.history[0].content, "turn 2");
    assert_eq!(ctx.current_message, "turn 7");

    // Another user starts with a clean window.
    f.gateway.handle_message(incoming("7", "hello")).await;
    assert!(provider.context_at(7).history.is_empty());
}

#[tokio::test]
async fn test_provider_outage_yields_apology() {
    let f = fixture(
        MockProvider::failing(),
        MockClassifier::safe(),
        DevotionalConfig::default(),
    );

    f.gateway.handle_message(incoming("42", "I had a rough day")).await;

    assert_eq!(f.channel.sent()[0].text, prompts::CHAT_APOLOGY);
}

#[tokio::test]
async fn test_start_and_help_attach_command_keyboard() {
    let f = fixture(
        MockProvider::scripted(&[]),
        MockClassifier::safe(),
        DevotionalConfig::default(),
    );

    f.gateway.handle_message(incoming("42", "/start")).await;
    f.gateway.handle_message(incoming("42", "/help")).await;

    let sent = f.channel.sent();
    assert_eq!(sent[0].text, prompts::WELCOME);
    assert!(sent[0].keyboard.is_some());
    assert_eq!(sent[1].text, prompts::HELP);
    assert!(sent[1].keyboard.is_some());
}

#[tokio::test]
async fn test_another_verse_persists_nothing() {
    let provider = MockProvider::scripted(&["Philippians 4:13 — I can do all things."]);
    let f = fixture(
        provider.clone(),
        MockClassifier::safe(),
        DevotionalConfig::default(),
    );

    f.gateway.handle_message(incoming("42", "another verse")).await;

    assert_eq!(
        f.channel.sent()[0].text,
        "Philippians 4:13 — I can do all things."
    );
    assert_eq!(provider.context_at(0).current_message, prompts::ANOTHER_VERSE);
    // Not recorded against the yearly verse set and no devotional slot.
    let set_key = verse_set_key(Utc::now().year());
    assert!(!f
        .store
        .is_member(&set_key, "Philippians 4:13")
        .await
        .unwrap());
    assert_eq!(f.store.get_value(&devotional_key("42")).await.unwrap(), None);
}
