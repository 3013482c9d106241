use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use trove_types::api::{AddReviewRequest, Claims};

use crate::{AppState, ApiError, blocking, dto};

pub async fn add_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<Uuid>,
    Json(req): Json<AddReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let reviewer_id = claims.sub.to_string();
    let id = product_id.to_string();

    let review = blocking(&state, move |db| {
        db.add_review(&reviewer_id, &id, req.rating, &req.comment)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(dto::review_response(&review))))
}

pub async fn reviews_for_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let id = product_id.to_string();
    let reviews = blocking(&state, move |db| db.reviews_for_product(&id)).await?;
    Ok(Json(
        reviews.iter().map(dto::review_response).collect::<Vec<_>>(),
    ))
}
