//! Transport boundary — the collaborator that exchanges conversation history
//! for an AI reply.
//!
//! The controller only ever sees a successful reply string or a
//! [`TransportError`]; retry, auth, and wire concerns stay behind this trait.

use async_trait::async_trait;
use thiserror::Error;

use crate::chat::prompts::CHAT_SYSTEM;
use crate::llm_client::{ChatTurn, LlmClient};
use crate::models::message::{Message, Sender};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("chat transport failed: {0}")]
    Failed(String),
}

/// Opaque request/response boundary to the AI backend. Mocked in controller
/// tests; implemented by [`LlmTransport`] in production.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends the accumulated conversation and returns the raw reply text.
    async fn send(&self, history: &[Message]) -> Result<String, TransportError>;
}

/// Production transport backed by the shared LLM client.
pub struct LlmTransport {
    client: LlmClient,
}

impl LlmTransport {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatTransport for LlmTransport {
    async fn send(&self, history: &[Message]) -> Result<String, TransportError> {
        // The Messages API requires the first turn to be the user's, so the
        // seeded greeting (and any other leading bot text) is dropped.
        let turns: Vec<ChatTurn<'_>> = history
            .iter()
            .skip_while(|message| message.sender == Sender::Bot)
            .map(|message| ChatTurn {
                role: match message.sender {
                    Sender::User => "user",
                    Sender::Bot => "assistant",
                },
                content: &message.text,
            })
            .collect();

        self.client
            .chat(&turns, CHAT_SYSTEM)
            .await
            .map_err(|e| TransportError::Failed(e.to_string()))
    }
}
