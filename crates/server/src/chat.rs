//! The chat endpoint fronting the agent router.
//!
//! - `POST /chat` accepts `{session_id?, message}` and returns
//!   `{session_id, reply, cart}`.
//!   A missing session id is minted as a UUID and echoed back so the caller
//!   can keep the conversation on one cart.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use shoptalk_agent::Router as AgentRouter;
use shoptalk_core::domain::cart::Cart;
use shoptalk_core::domain::session::SessionId;

#[derive(Clone)]
pub struct ChatState {
    pub router: Arc<AgentRouter>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
    pub cart: Cart,
}

#[derive(Debug, Serialize)]
pub struct ChatError {
    pub error: String,
}

pub fn router(state: ChatState) -> Router {
    Router::new().route("/chat", post(chat)).with_state(state)
}

pub async fn chat(
    State(state): State<ChatState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ChatError>)> {
    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let session = SessionId(session_id.clone());

    let reply = state.router.dispatch(&session, &request.message).await.map_err(|error| {
        error!(
            event_name = "chat.dispatch.failed",
            session_id = %session,
            error = %error,
            "agent dispatch failed"
        );
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ChatError { error: error.user_message().to_string() }),
        )
    })?;

    // Best effort; a reply without the sidebar cart beats a failed reply.
    let cart = state.router.cart_snapshot(&session).await.unwrap_or_default();

    Ok(Json(ChatResponse { session_id, reply, cart }))
}
