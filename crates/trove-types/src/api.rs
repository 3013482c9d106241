use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{OfferStatus, RatingSummary};

// -- JWT Claims --

/// JWT claims shared between trove-api's REST middleware and the auth
/// handlers that mint tokens. Canonical definition lives here in trove-types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub total_sales: i64,
    pub total_purchases: i64,
    pub created_at: DateTime<Utc>,
}

// -- Products --

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub condition: String,
    pub price: f64,
    #[serde(default)]
    pub location: String,
    /// Relative path previously returned by the upload endpoint; empty when
    /// the listing has no image.
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub extra_images: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner_username: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub condition: String,
    pub price: f64,
    pub location: String,
    pub image_url: String,
    pub is_featured: bool,
    pub views: i64,
    pub is_sold: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub products: Vec<ProductResponse>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct ProductDetailResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    pub images: Vec<String>,
    pub rating: RatingSummary,
    pub reviews: Vec<ReviewResponse>,
    pub in_wishlist: bool,
    /// Offers on this product; only populated when the caller is the owner.
    pub offers: Vec<OfferResponse>,
    pub similar: Vec<ProductResponse>,
}

// -- Cart / checkout --

#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    pub product: ProductResponse,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    /// Sum of prices of items whose product is still available.
    pub total: f64,
}

#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_title: String,
    pub price_paid: f64,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub purchases: Vec<PurchaseResponse>,
}

// -- Offers --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MakeOfferRequest {
    pub amount: f64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OfferResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub buyer_id: Uuid,
    pub buyer_username: String,
    pub amount: f64,
    pub message: String,
    pub status: OfferStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// -- Reviews --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddReviewRequest {
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewer_username: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

// -- Wishlist --

#[derive(Debug, Serialize)]
pub struct WishlistItemResponse {
    pub product: ProductResponse,
    pub added_at: DateTime<Utc>,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub recipient_id: Uuid,
    pub product_id: Option<Uuid>,
    pub subject: Option<String>,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_username: String,
    pub recipient_id: Uuid,
    pub recipient_username: String,
    pub product_id: Option<Uuid>,
    pub subject: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MailboxResponse {
    pub received: Vec<MessageResponse>,
    pub sent: Vec<MessageResponse>,
}

// -- Notifications --

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub kind: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Returned by mark-read so the client can follow the notification's link.
#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub link: Option<String>,
}

// -- Profiles / analytics --

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub seller_rating: RatingSummary,
    pub products: Vec<ProductResponse>,
}

#[derive(Debug, Serialize)]
pub struct MonthlySales {
    /// Calendar month in `YYYY-MM` form.
    pub month: String,
    pub sales: i64,
}

#[derive(Debug, Serialize)]
pub struct CategoryStat {
    pub category: String,
    pub total: i64,
    pub sold: i64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub total_listings: i64,
    pub active_listings: i64,
    pub sold_listings: i64,
    pub total_views: i64,
    pub total_revenue: f64,
    pub monthly_sales: Vec<MonthlySales>,
    pub categories: Vec<CategoryStat>,
}

// -- Uploads --

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Relative path of the stored image, or "" when the upload could not be
    /// saved. Saving is best effort; this endpoint never errors.
    pub image_url: String,
}

// -- Assistant chat --

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub status: &'static str,
}

/// Error body shared by the chat endpoints and the generic API error path.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: &'static str,
}
