use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use trove_db::models::{NewProduct, ProductFilter, ProductUpdate, SortBy};
use trove_types::api::{
    Claims, CreateProductRequest, ProductDetailResponse, ProductPage, UpdateProductRequest,
};

use crate::middleware::OptionalClaims;
use crate::{ApiError, AppState, blocking, dto};

const SIMILAR_LIMIT: u32 = 4;
const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub location: Option<String>,
    #[serde(default)]
    pub sort_by: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    12
}

/// Browse the catalog. Only unsold listings are returned.
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.page.max(1);
    let per_page = query.per_page.clamp(1, MAX_PER_PAGE);

    let filter = ProductFilter {
        search: query.search,
        category: query.category,
        condition: query.condition,
        min_price: query.min_price,
        max_price: query.max_price,
        location: query.location,
        sort: SortBy::parse(&query.sort_by),
        limit: per_page,
        offset: (page - 1) * per_page,
    };

    let (rows, total) = blocking(&state, move |db| db.list_products(&filter)).await?;

    Ok(Json(ProductPage {
        products: rows.iter().map(dto::product_response).collect(),
        page,
        per_page,
        total,
    }))
}

/// Product page. Bumps the view counter on every hit. Signed-in callers
/// additionally see their wishlist flag; the owner sees the offer list.
pub async fn product_detail(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Extension(OptionalClaims(claims)): Extension<OptionalClaims>,
) -> Result<impl IntoResponse, ApiError> {
    let id = product_id.to_string();
    let caller = claims.map(|c| c.sub.to_string());

    let detail = blocking(&state, move |db| {
        let product = db.get_product(&id)?.ok_or(trove_db::Error::NotFound("product"))?;
        db.increment_views(&id)?;

        let images = db.product_images(&id)?;
        let rating = db.product_rating(&id)?;
        let reviews = db.reviews_for_product(&id)?;
        let similar = db.similar_products(&product, SIMILAR_LIMIT)?;

        let in_wishlist = match &caller {
            Some(user_id) => db.in_wishlist(user_id, &id)?,
            None => false,
        };
        let offers = match &caller {
            Some(user_id) if *user_id == product.owner_id => db.offers_for_product(&id)?,
            _ => Vec::new(),
        };

        Ok((product, images, rating, reviews, similar, in_wishlist, offers))
    })
    .await?;

    let (product, images, rating, reviews, similar, in_wishlist, offers) = detail;
    let mut product = dto::product_response(&product);
    product.views += 1;

    Ok(Json(ProductDetailResponse {
        product,
        images,
        rating,
        reviews: reviews.iter().map(dto::review_response).collect(),
        in_wishlist,
        offers: offers.iter().map(dto::offer_response).collect(),
        similar: similar.iter().map(dto::product_response).collect(),
    }))
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.is_empty() || req.title.len() > 200 {
        return Err(ApiError::bad_request("title must be 1-200 characters"));
    }
    if req.description.is_empty() {
        return Err(ApiError::bad_request("description is required"));
    }
    if req.price <= 0.0 {
        return Err(ApiError::bad_request("price must be positive"));
    }

    let owner_id = claims.sub.to_string();
    let new = NewProduct {
        title: req.title,
        description: req.description,
        category: req.category,
        condition: req.condition,
        price: req.price,
        location: req.location,
        image_url: req.image_url,
        extra_images: req.extra_images,
        is_featured: req.is_featured,
    };

    let product = blocking(&state, move |db| {
        let id = db.create_product(&owner_id, &new)?;
        db.get_product(&id)?.ok_or(trove_db::Error::NotFound("product"))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(dto::product_response(&product))))
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.price <= 0.0 {
        return Err(ApiError::bad_request("price must be positive"));
    }

    let owner_id = claims.sub.to_string();
    let id = product_id.to_string();
    let update = ProductUpdate {
        title: req.title,
        description: req.description,
        category: req.category,
        price: req.price,
        image_url: req.image_url,
    };

    let product = blocking(&state, move |db| {
        db.update_product(&owner_id, &id, &update)?;
        db.get_product(&id)?.ok_or(trove_db::Error::NotFound("product"))
    })
    .await?;

    Ok(Json(dto::product_response(&product)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id = claims.sub.to_string();
    let id = product_id.to_string();
    blocking(&state, move |db| db.delete_product(&owner_id, &id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's own listings, sold included.
pub async fn my_listings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id = claims.sub.to_string();
    let rows = blocking(&state, move |db| db.listings_for_owner(&owner_id, false)).await?;
    Ok(Json(
        rows.iter().map(dto::product_response).collect::<Vec<_>>(),
    ))
}
