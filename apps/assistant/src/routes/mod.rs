pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::chat::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Chat API
        .route(
            "/api/v1/chat/conversations",
            post(handlers::handle_create_conversation),
        )
        .route(
            "/api/v1/chat/conversations/:id",
            get(handlers::handle_get_conversation),
        )
        .route(
            "/api/v1/chat/conversations/:id/messages",
            post(handlers::handle_send_message),
        )
        .with_state(state)
}
