use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use trove_types::api::{CartResponse, CheckoutResponse, Claims};

use crate::{ApiError, AppState, blocking, dto};

pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let id = product_id.to_string();
    blocking(&state, move |db| db.add_to_cart(&user_id, &id)).await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let id = product_id.to_string();
    blocking(&state, move |db| db.remove_from_cart(&user_id, &id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The cart with its running total. Items already sold elsewhere still show
/// up (so the client can render them as unavailable) but do not count toward
/// the total.
pub async fn view_cart(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let items = blocking(&state, move |db| db.cart_items(&user_id)).await?;

    let total = items
        .iter()
        .filter(|item| !item.product.is_sold)
        .map(|item| item.product.price)
        .sum();

    Ok(Json(CartResponse {
        items: items.iter().map(dto::cart_item_response).collect(),
        total,
    }))
}

/// Convert the whole cart into purchases. Stale entries (sold through some
/// other path) are dropped silently; everything else is bought at the
/// current price in one transaction.
pub async fn checkout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let purchases = blocking(&state, move |db| db.checkout(&user_id)).await?;

    Ok(Json(CheckoutResponse {
        purchases: purchases.iter().map(dto::purchase_response).collect(),
    }))
}

pub async fn purchase_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let purchases = blocking(&state, move |db| db.purchases_for_user(&user_id)).await?;
    Ok(Json(
        purchases.iter().map(dto::purchase_response).collect::<Vec<_>>(),
    ))
}
