//! Row-to-response conversions shared by the handlers.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use trove_db::models::{
    CartItemRow, MessageRow, NotificationRow, OfferRow, ProductRow, PurchaseRow, ReviewRow,
    UserRow, WishlistItemRow, parse_timestamp,
};
use trove_types::api::{
    CartItemResponse, MessageResponse, NotificationResponse, OfferResponse, ProductResponse,
    PurchaseResponse, ReviewResponse, UserResponse, WishlistItemResponse,
};
use trove_types::models::OfferStatus;

pub(crate) fn parse_id(id: &str) -> Uuid {
    id.parse().unwrap_or_else(|e| {
        warn!("Corrupt id '{}': {}", id, e);
        Uuid::default()
    })
}

fn timestamp(s: &str) -> DateTime<Utc> {
    parse_timestamp(s)
}

pub fn user_response(row: &UserRow) -> UserResponse {
    UserResponse {
        id: parse_id(&row.id),
        username: row.username.clone(),
        total_sales: row.total_sales,
        total_purchases: row.total_purchases,
        created_at: timestamp(&row.created_at),
    }
}

pub fn product_response(row: &ProductRow) -> ProductResponse {
    ProductResponse {
        id: parse_id(&row.id),
        owner_id: parse_id(&row.owner_id),
        owner_username: row.owner_username.clone(),
        title: row.title.clone(),
        description: row.description.clone(),
        category: row.category.clone(),
        condition: row.condition.clone(),
        price: row.price,
        location: row.location.clone(),
        image_url: row.image_url.clone(),
        is_featured: row.is_featured,
        views: row.views,
        is_sold: row.is_sold,
        created_at: timestamp(&row.created_at),
    }
}

pub fn cart_item_response(row: &CartItemRow) -> CartItemResponse {
    CartItemResponse {
        product: product_response(&row.product),
        added_at: timestamp(&row.added_at),
    }
}

pub fn wishlist_item_response(row: &WishlistItemRow) -> WishlistItemResponse {
    WishlistItemResponse {
        product: product_response(&row.product),
        added_at: timestamp(&row.added_at),
    }
}

pub fn purchase_response(row: &PurchaseRow) -> PurchaseResponse {
    PurchaseResponse {
        id: parse_id(&row.id),
        product_id: parse_id(&row.product_id),
        product_title: row.product_title.clone(),
        price_paid: row.price_paid,
        purchased_at: timestamp(&row.purchased_at),
    }
}

pub fn offer_response(row: &OfferRow) -> OfferResponse {
    OfferResponse {
        id: parse_id(&row.id),
        product_id: parse_id(&row.product_id),
        buyer_id: parse_id(&row.buyer_id),
        buyer_username: row.buyer_username.clone(),
        amount: row.amount,
        message: row.message.clone(),
        status: OfferStatus::parse(&row.status).unwrap_or_else(|| {
            warn!("Corrupt offer status '{}' on offer '{}'", row.status, row.id);
            OfferStatus::Pending
        }),
        expires_at: row.expires_at.as_deref().map(timestamp),
        created_at: timestamp(&row.created_at),
    }
}

pub fn review_response(row: &ReviewRow) -> ReviewResponse {
    ReviewResponse {
        id: parse_id(&row.id),
        product_id: parse_id(&row.product_id),
        reviewer_id: parse_id(&row.reviewer_id),
        reviewer_username: row.reviewer_username.clone(),
        rating: row.rating,
        comment: row.comment.clone(),
        created_at: timestamp(&row.created_at),
    }
}

pub fn message_response(row: &MessageRow) -> MessageResponse {
    MessageResponse {
        id: parse_id(&row.id),
        sender_id: parse_id(&row.sender_id),
        sender_username: row.sender_username.clone(),
        recipient_id: parse_id(&row.recipient_id),
        recipient_username: row.recipient_username.clone(),
        product_id: row.product_id.as_deref().map(parse_id),
        subject: row.subject.clone(),
        body: row.body.clone(),
        is_read: row.is_read,
        created_at: timestamp(&row.created_at),
    }
}

pub fn notification_response(row: &NotificationRow) -> NotificationResponse {
    NotificationResponse {
        id: parse_id(&row.id),
        title: row.title.clone(),
        body: row.body.clone(),
        kind: row.kind.clone(),
        link: row.link.clone(),
        is_read: row.is_read,
        created_at: timestamp(&row.created_at),
    }
}
