use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub total_sales: i64,
    pub total_purchases: i64,
    pub created_at: String,
}

/// Product joined with its owner's username.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub owner_id: String,
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
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct CartItemRow {
    pub product: ProductRow,
    pub added_at: String,
}

#[derive(Debug, Clone)]
pub struct WishlistItemRow {
    pub product: ProductRow,
    pub added_at: String,
}

#[derive(Debug, Clone)]
pub struct OfferRow {
    pub id: String,
    pub product_id: String,
    pub buyer_id: String,
    pub buyer_username: String,
    pub amount: f64,
    pub message: String,
    pub status: String,
    pub expires_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct PurchaseRow {
    pub id: String,
    pub buyer_id: String,
    pub product_id: String,
    pub product_title: String,
    pub price_paid: f64,
    pub purchased_at: String,
}

#[derive(Debug, Clone)]
pub struct ReviewRow {
    pub id: String,
    pub product_id: String,
    pub reviewer_id: String,
    pub reviewer_username: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: String,
    pub sender_id: String,
    pub sender_username: String,
    pub recipient_id: String,
    pub recipient_username: String,
    pub product_id: Option<String>,
    pub subject: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NotificationRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub kind: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

/// Seller dashboard numbers, all computed in SQL.
#[derive(Debug, Clone)]
pub struct AnalyticsRow {
    pub total_listings: i64,
    pub active_listings: i64,
    pub sold_listings: i64,
    pub total_views: i64,
    pub total_revenue: f64,
    pub monthly_sales: Vec<(String, i64)>,
    pub categories: Vec<(String, i64, i64)>,
}

/// Fields for a new listing.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub category: String,
    pub condition: String,
    pub price: f64,
    pub location: String,
    pub image_url: String,
    pub extra_images: Vec<String>,
    pub is_featured: bool,
}

/// Fields an owner may change on an existing listing.
#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    /// `None` keeps the current image.
    pub image_url: Option<String>,
}

/// Sort orders accepted by the product listing query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Newest,
    Oldest,
    PriceLow,
    PriceHigh,
    Popular,
}

impl SortBy {
    pub fn parse(s: &str) -> Self {
        match s {
            "oldest" => SortBy::Oldest,
            "price_low" => SortBy::PriceLow,
            "price_high" => SortBy::PriceHigh,
            "popular" => SortBy::Popular,
            _ => SortBy::Newest,
        }
    }

    pub(crate) fn order_clause(&self) -> &'static str {
        match self {
            SortBy::Newest => "p.created_at DESC, p.rowid DESC",
            SortBy::Oldest => "p.created_at ASC, p.rowid ASC",
            SortBy::PriceLow => "p.price ASC",
            SortBy::PriceHigh => "p.price DESC",
            SortBy::Popular => "p.views DESC",
        }
    }
}

/// Filters for the catalog listing. Empty/None fields are not applied.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub location: Option<String>,
    pub sort: SortBy,
    pub limit: u32,
    pub offset: u32,
}

/// SQLite stores timestamps either as RFC 3339 or as the bare
/// "YYYY-MM-DD HH:MM:SS" produced by datetime('now'). Parse both, falling
/// back to the epoch on corrupt data rather than failing a whole listing.
pub fn parse_timestamp(s: &str) -> DateTime<Utc> {
    s.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::warn!("Corrupt timestamp '{}': {}", s, e);
            DateTime::default()
        })
}
