//! In-memory conversation registry.
//!
//! Conversations live for the process lifetime and are never persisted —
//! resume data persistence is someone else's job; chat logs are ephemeral.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::chat::controller::Conversation;

/// Shared handle to one conversation. The inner mutex serializes log
/// mutations; it is never held across a transport call.
pub type SharedConversation = Arc<Mutex<Conversation>>;

#[derive(Clone, Default)]
pub struct ConversationStore {
    inner: Arc<RwLock<HashMap<Uuid, SharedConversation>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new conversation, seeded with the assistant greeting.
    pub async fn create(&self) -> (Uuid, SharedConversation) {
        let id = Uuid::new_v4();
        let conversation = Arc::new(Mutex::new(Conversation::new(id)));
        self.inner
            .write()
            .await
            .insert(id, Arc::clone(&conversation));
        (id, conversation)
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedConversation> {
        self.inner.read().await.get(&id).cloned()
    }
}
