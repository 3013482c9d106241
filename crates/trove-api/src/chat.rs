use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use trove_types::api::{ChatRequest, ChatResponse, ErrorResponse};

use crate::AppState;

/// Assistant chat endpoint. Upstream model failures are absorbed inside the
/// assistant (it degrades to canned replies), so the only client-visible
/// error here is an empty message.
pub async fn ai_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    if req.message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: "Message is required".into(), status: "error" }),
        )
            .into_response();
    }

    let response = state.assistant.get_response(&req.message, &req.history).await;
    Json(ChatResponse { response, status: "success" }).into_response()
}

pub async fn quick_help(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> impl IntoResponse {
    let response = state.assistant.quick_help(&topic).to_string();
    Json(ChatResponse { response, status: "success" })
}
