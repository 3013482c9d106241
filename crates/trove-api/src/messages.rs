use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use trove_types::api::{Claims, MailboxResponse, SendMessageRequest};

use crate::{ApiError, AppState, blocking, dto};

pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.body.is_empty() {
        return Err(ApiError::bad_request("message body is required"));
    }
    if req.recipient_id == claims.sub {
        return Err(ApiError::bad_request("you cannot message yourself"));
    }

    let sender_id = claims.sub.to_string();
    let recipient_id = req.recipient_id.to_string();
    let product_id = req.product_id.map(|id| id.to_string());

    let message = blocking(&state, move |db| {
        db.send_message(
            &sender_id,
            &recipient_id,
            product_id.as_deref(),
            req.subject.as_deref(),
            &req.body,
        )
    })
    .await?;

    Ok((StatusCode::CREATED, Json(dto::message_response(&message))))
}

pub async fn mailbox(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let (received, sent) = blocking(&state, move |db| db.mailbox(&user_id)).await?;

    Ok(Json(MailboxResponse {
        received: received.iter().map(dto::message_response).collect(),
        sent: sent.iter().map(dto::message_response).collect(),
    }))
}

pub async fn mark_message_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let id = message_id.to_string();
    blocking(&state, move |db| db.mark_message_read(&user_id, &id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
