use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use trove_types::api::{Claims, MarkReadResponse};

use crate::{ApiError, AppState, blocking, dto};

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let rows = blocking(&state, move |db| db.notifications_for_user(&user_id)).await?;
    Ok(Json(
        rows.iter().map(dto::notification_response).collect::<Vec<_>>(),
    ))
}

/// Flip one notification to read and hand back its link so the client can
/// navigate to whatever the notification was about.
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let id = notification_id.to_string();
    let link = blocking(&state, move |db| db.mark_notification_read(&user_id, &id)).await?;
    Ok(Json(MarkReadResponse { link }))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let marked = blocking(&state, move |db| db.mark_all_notifications_read(&user_id)).await?;
    Ok(Json(json!({ "marked": marked })))
}
