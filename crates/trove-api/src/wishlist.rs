use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use trove_types::api::Claims;

use crate::{ApiError, AppState, blocking, dto};

pub async fn add_to_wishlist(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let id = product_id.to_string();
    blocking(&state, move |db| db.add_to_wishlist(&user_id, &id)).await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let id = product_id.to_string();
    blocking(&state, move |db| db.remove_from_wishlist(&user_id, &id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn view_wishlist(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let items = blocking(&state, move |db| db.wishlist_items(&user_id)).await?;
    Ok(Json(
        items.iter().map(dto::wishlist_item_response).collect::<Vec<_>>(),
    ))
}
