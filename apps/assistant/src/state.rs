use std::sync::Arc;

use crate::chat::store::ConversationStore;
use crate::chat::transport::ChatTransport;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable AI transport. Production: `LlmTransport` over the Anthropic
    /// client; tests swap in mocks.
    pub transport: Arc<dyn ChatTransport>,
    /// Process-local conversation registry. Nothing is persisted.
    pub conversations: ConversationStore,
    #[allow(dead_code)]
    pub config: Config,
}
