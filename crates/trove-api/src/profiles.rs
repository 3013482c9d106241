use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use trove_types::api::{AnalyticsResponse, CategoryStat, Claims, MonthlySales, ProfileResponse};

use crate::{ApiError, AppState, blocking, dto};

/// Public seller page: account info, live listings, and the seller-wide
/// rating aggregate.
pub async fn user_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, rating, products) = blocking(&state, move |db| {
        let user = db
            .get_user_by_username(&username)?
            .ok_or(trove_db::Error::NotFound("user"))?;
        let rating = db.seller_rating(&user.id)?;
        let products = db.listings_for_owner(&user.id, true)?;
        Ok((user, rating, products))
    })
    .await?;

    Ok(Json(ProfileResponse {
        user: dto::user_response(&user),
        seller_rating: rating,
        products: products.iter().map(dto::product_response).collect(),
    }))
}

/// The caller's selling dashboard, all numbers aggregated in the store.
pub async fn analytics(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let stats = blocking(&state, move |db| db.seller_analytics(&user_id)).await?;

    Ok(Json(AnalyticsResponse {
        total_listings: stats.total_listings,
        active_listings: stats.active_listings,
        sold_listings: stats.sold_listings,
        total_views: stats.total_views,
        total_revenue: stats.total_revenue,
        monthly_sales: stats
            .monthly_sales
            .into_iter()
            .map(|(month, sales)| MonthlySales { month, sales })
            .collect(),
        categories: stats
            .categories
            .into_iter()
            .map(|(category, total, sold)| CategoryStat { category, total, sold })
            .collect(),
    }))
}
