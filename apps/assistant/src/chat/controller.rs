//! Conversation controller — one message log, one turn in flight at a time.
//!
//! The log is append-only and strictly causally ordered: the user message of
//! a turn always precedes the bot message it produced, and because only one
//! transport call can be outstanding, replies can never be reordered.

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::error;
use uuid::Uuid;

use crate::chat::normalizer::normalize;
use crate::chat::transport::ChatTransport;
use crate::models::message::Message;

/// Greeting seeded into every new conversation.
pub const GREETING: &str = "Hello! How can I help you today?";

/// Bot message shown in place of a reply when the transport fails.
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong. Please try again.";

/// Turn state. `Waiting` means a transport call is outstanding; further
/// submits are ignored until it resolves. Serialized into API responses so
/// the widget can show its typing indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatState {
    Idle,
    Waiting,
}

/// Result of a submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The turn ran to completion. The reply — or the fixed fallback if the
    /// transport failed — is in the log.
    Completed,
    /// Whitespace-only input; nothing was appended.
    EmptyInput,
    /// A turn was already in flight; this submit was ignored.
    Busy,
}

/// One chat conversation: its id, message log, and turn state.
#[derive(Debug)]
pub struct Conversation {
    id: Uuid,
    messages: Vec<Message>,
    state: ChatState,
}

impl Conversation {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            messages: vec![Message::bot(GREETING)],
            state: ChatState::Idle,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The full log, in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    /// Validates and records the user's side of a turn. On success the
    /// conversation is `Waiting` and the returned snapshot is the history to
    /// hand to the transport.
    fn begin_turn(&mut self, text: &str) -> Result<Vec<Message>, SubmitOutcome> {
        if text.trim().is_empty() {
            return Err(SubmitOutcome::EmptyInput);
        }
        if self.state == ChatState::Waiting {
            return Err(SubmitOutcome::Busy);
        }
        self.state = ChatState::Waiting;
        self.messages.push(Message::user(text));
        Ok(self.messages.clone())
    }

    /// Records the normalized reply and returns to `Idle`.
    fn complete_turn(&mut self, raw_reply: &str) {
        self.messages.push(Message::bot(normalize(raw_reply)));
        self.state = ChatState::Idle;
    }

    /// Records the fixed fallback reply and returns to `Idle`, so the user
    /// can retry.
    fn fail_turn(&mut self) {
        self.messages.push(Message::bot(FALLBACK_REPLY));
        self.state = ChatState::Idle;
    }
}

/// Runs one full turn against the transport.
///
/// The lock is NOT held across the transport await: a concurrent submit must
/// observe `Waiting` and be ignored, not queue behind the in-flight call.
pub async fn run_turn(
    conversation: &Mutex<Conversation>,
    transport: &dyn ChatTransport,
    text: &str,
) -> SubmitOutcome {
    let history = {
        let mut guard = conversation.lock().await;
        match guard.begin_turn(text) {
            Ok(history) => history,
            Err(outcome) => return outcome,
        }
    };

    match transport.send(&history).await {
        Ok(raw_reply) => {
            conversation.lock().await.complete_turn(&raw_reply);
        }
        Err(e) => {
            let mut guard = conversation.lock().await;
            error!(conversation_id = %guard.id(), "chat transport failed: {e}");
            guard.fail_turn();
        }
    }
    SubmitOutcome::Completed
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::chat::transport::TransportError;
    use crate::models::message::Sender;

    /// Replies with a fixed string, counting invocations.
    struct StaticTransport {
        reply: &'static str,
        calls: AtomicUsize,
    }

    impl StaticTransport {
        fn new(reply: &'static str) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ChatTransport for StaticTransport {
        async fn send(&self, _history: &[Message]) -> Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.to_string())
        }
    }

    /// Always fails, counting invocations.
    struct FailingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatTransport for FailingTransport {
        async fn send(&self, _history: &[Message]) -> Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(TransportError::Failed("boom".to_string()))
        }
    }

    /// Blocks inside `send` until released, so tests can observe the Waiting
    /// state deterministically.
    #[derive(Default)]
    struct GatedTransport {
        calls: AtomicUsize,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ChatTransport for GatedTransport {
        async fn send(&self, _history: &[Message]) -> Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok("All done.".to_string())
        }
    }

    fn conversation() -> Arc<Mutex<Conversation>> {
        Arc::new(Mutex::new(Conversation::new(Uuid::new_v4())))
    }

    #[tokio::test]
    async fn test_new_conversation_starts_with_greeting() {
        let conversation = Conversation::new(Uuid::new_v4());
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].sender, Sender::Bot);
        assert_eq!(conversation.messages()[0].text, GREETING);
        assert_eq!(conversation.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn test_turn_appends_user_then_bot_in_order() {
        let conversation = conversation();
        let transport = StaticTransport::new("Lead with impact.");

        let outcome = run_turn(&conversation, &transport, "How do I start bullets?").await;
        assert_eq!(outcome, SubmitOutcome::Completed);

        let guard = conversation.lock().await;
        let messages = guard.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].sender, Sender::User);
        assert_eq!(messages[1].text, "How do I start bullets?");
        assert_eq!(messages[2].sender, Sender::Bot);
        assert_eq!(messages[2].text, "Lead with impact.");
        assert_eq!(guard.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn test_bot_messages_are_normalized_before_logging() {
        let conversation = conversation();
        let transport = StaticTransport::new(r#"{"message":"Use strong verbs."}"#);

        run_turn(&conversation, &transport, "tips?").await;

        let guard = conversation.lock().await;
        // The raw JSON never enters the log.
        assert_eq!(guard.messages()[2].text, "Use strong verbs.");
    }

    #[tokio::test]
    async fn test_blank_input_is_a_no_op() {
        let conversation = conversation();
        let transport = StaticTransport::new("unused");

        let outcome = run_turn(&conversation, &transport, "   ").await;
        assert_eq!(outcome, SubmitOutcome::EmptyInput);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
        assert_eq!(conversation.lock().await.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_second_submit_while_waiting_is_ignored() {
        let conversation = conversation();
        let transport = Arc::new(GatedTransport::default());

        let first = tokio::spawn({
            let conversation = Arc::clone(&conversation);
            let transport = Arc::clone(&transport);
            async move { run_turn(&conversation, transport.as_ref(), "first").await }
        });

        // Once the transport has been entered, the conversation is Waiting.
        transport.entered.notified().await;
        assert_eq!(conversation.lock().await.state(), ChatState::Waiting);

        let outcome = run_turn(&conversation, transport.as_ref(), "second").await;
        assert_eq!(outcome, SubmitOutcome::Busy);

        transport.release.notify_one();
        assert_eq!(first.await.unwrap(), SubmitOutcome::Completed);

        // Exactly one transport call, and no trace of the ignored submit.
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        let guard = conversation.lock().await;
        assert_eq!(guard.messages().len(), 3);
        assert_eq!(guard.messages()[1].text, "first");
        assert_eq!(guard.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn test_transport_failure_appends_fallback_and_returns_to_idle() {
        let conversation = conversation();
        let failing = FailingTransport {
            calls: AtomicUsize::new(0),
        };

        let outcome = run_turn(&conversation, &failing, "hello?").await;
        assert_eq!(outcome, SubmitOutcome::Completed);

        {
            let guard = conversation.lock().await;
            let messages = guard.messages();
            assert_eq!(messages.len(), 3);
            assert_eq!(messages[2].sender, Sender::Bot);
            assert_eq!(messages[2].text, FALLBACK_REPLY);
            assert_eq!(guard.state(), ChatState::Idle);
        }

        // Back to Idle means a retry is accepted.
        let transport = StaticTransport::new("Recovered.");
        let outcome = run_turn(&conversation, &transport, "retry").await;
        assert_eq!(outcome, SubmitOutcome::Completed);
        assert_eq!(conversation.lock().await.messages().len(), 5);
    }

    #[tokio::test]
    async fn test_transport_receives_history_including_new_user_message() {
        struct CapturingTransport {
            seen: std::sync::Mutex<Vec<Message>>,
        }

        #[async_trait]
        impl ChatTransport for CapturingTransport {
            async fn send(&self, history: &[Message]) -> Result<String, TransportError> {
                *self.seen.lock().unwrap() = history.to_vec();
                Ok("ok".to_string())
            }
        }

        let conversation = conversation();
        let transport = CapturingTransport {
            seen: std::sync::Mutex::new(Vec::new()),
        };

        run_turn(&conversation, &transport, "question").await;

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 2); // greeting + the new user message
        assert_eq!(seen[1].sender, Sender::User);
        assert_eq!(seen[1].text, "question");
    }
}
