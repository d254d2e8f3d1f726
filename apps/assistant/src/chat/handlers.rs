//! Axum route handlers for the Chat API.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::controller::{run_turn, ChatState, SubmitOutcome};
use crate::chat::renderer::{render, DisplayBlock};
use crate::chat::store::SharedConversation;
use crate::errors::AppError;
use crate::models::message::{Message, Sender};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

/// A message as the widget consumes it. Bot messages carry their display
/// blocks, derived from the canonical text at response time — blocks are
/// cheap to recompute and never stored.
#[derive(Debug, Serialize)]
pub struct MessageView {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<DisplayBlock>>,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        let blocks =
            (message.sender == Sender::Bot).then(|| render(&message.text).collect());
        Self {
            sender: message.sender,
            text: message.text.clone(),
            timestamp: message.timestamp,
            blocks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub conversation_id: Uuid,
    /// `waiting` while a reply is being generated — drives the widget's
    /// typing indicator.
    pub state: ChatState,
    pub messages: Vec<MessageView>,
}

async fn conversation_response(id: Uuid, conversation: &SharedConversation) -> ConversationResponse {
    let guard = conversation.lock().await;
    ConversationResponse {
        conversation_id: id,
        state: guard.state(),
        messages: guard.messages().iter().map(MessageView::from).collect(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/chat/conversations
///
/// Opens a conversation and returns its id plus the seeded greeting.
pub async fn handle_create_conversation(
    State(state): State<AppState>,
) -> Json<ConversationResponse> {
    let (id, conversation) = state.conversations.create().await;
    Json(conversation_response(id, &conversation).await)
}

/// GET /api/v1/chat/conversations/:id
///
/// Full message log in insertion order.
pub async fn handle_get_conversation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConversationResponse>, AppError> {
    let conversation = state
        .conversations
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("conversation {id}")))?;
    Ok(Json(conversation_response(id, &conversation).await))
}

/// POST /api/v1/chat/conversations/:id/messages
///
/// Submits one user turn and waits for the reply; the bot message — or the
/// fixed fallback if the transport fails — is already in the returned log.
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ConversationResponse>, AppError> {
    let conversation = state
        .conversations
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("conversation {id}")))?;

    match run_turn(&conversation, state.transport.as_ref(), &request.text).await {
        SubmitOutcome::Completed => {}
        SubmitOutcome::EmptyInput => {
            return Err(AppError::Validation("message text cannot be empty".to_string()));
        }
        SubmitOutcome::Busy => {
            return Err(AppError::Conflict(
                "a reply is already being generated for this conversation".to_string(),
            ));
        }
    }

    Ok(Json(conversation_response(id, &conversation).await))
}
