//! JSON endpoint for the support-chat widget.
//!
//! Inbound validation is the only hard-failure path: a malformed body or an
//! empty query is a 400. Everything past that point is fail-soft; see the
//! chat module.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::chat::resolve_reply;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub success: bool,
    pub response: String,
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ChatRejected {
    pub success: bool,
    pub error: String,
}

fn client_error(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ChatRejected {
            success: false,
            error: message.to_string(),
        }),
    )
        .into_response()
}

pub async fn chatbot_query(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return client_error("Invalid JSON format");
    };

    let query = request.query.trim().to_string();
    if query.is_empty() {
        return client_error("Query cannot be empty");
    }

    let response = resolve_reply(state.chat.complete(&query).await);

    Json(ChatReply {
        success: true,
        response,
        query,
    })
    .into_response()
}
