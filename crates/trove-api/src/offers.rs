use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use trove_db::queries::offers::OfferAction;
use trove_types::api::{Claims, MakeOfferRequest};

use crate::{ApiError, AppState, blocking, dto};

pub async fn make_offer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<Uuid>,
    Json(req): Json<MakeOfferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.amount <= 0.0 {
        return Err(ApiError::bad_request("offer amount must be positive"));
    }

    let buyer_id = claims.sub.to_string();
    let id = product_id.to_string();
    let offer = blocking(&state, move |db| {
        db.make_offer(&buyer_id, &id, req.amount, &req.message)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(dto::offer_response(&offer))))
}

/// One route for all three transitions out of `pending`: the owner accepts
/// or rejects, the buyer withdraws.
pub async fn act_on_offer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((offer_id, action)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = claims.sub.to_string();
    let id = offer_id.to_string();

    let offer = match action.as_str() {
        "accept" => {
            blocking(&state, move |db| db.respond_to_offer(&caller, &id, OfferAction::Accept))
                .await?
        }
        "reject" => {
            blocking(&state, move |db| db.respond_to_offer(&caller, &id, OfferAction::Reject))
                .await?
        }
        "withdraw" => blocking(&state, move |db| db.withdraw_offer(&caller, &id)).await?,
        _ => return Err(ApiError::bad_request("action must be accept, reject, or withdraw")),
    };

    Ok(Json(dto::offer_response(&offer)))
}

/// Offers on one of the caller's listings.
pub async fn offers_for_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = claims.sub.to_string();
    let id = product_id.to_string();

    let offers = blocking(&state, move |db| {
        let product = db.get_product(&id)?.ok_or(trove_db::Error::NotFound("product"))?;
        if product.owner_id != caller {
            return Err(trove_db::Error::NotOwner);
        }
        db.offers_for_product(&id)
    })
    .await?;

    Ok(Json(
        offers.iter().map(dto::offer_response).collect::<Vec<_>>(),
    ))
}
