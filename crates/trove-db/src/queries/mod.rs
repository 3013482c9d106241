pub mod analytics;
pub mod cart;
pub mod messages;
pub mod notifications;
pub mod offers;
pub mod products;
pub mod purchases;
pub mod reviews;
pub mod users;
pub mod wishlist;

use rusqlite::Row;

use crate::models::ProductRow;

/// Column list shared by every query that returns products joined with the
/// owner's username. Keep in sync with [`map_product`]; callers may append
/// extra columns after these fourteen.
pub(crate) const PRODUCT_COLUMNS: &str = "p.id, p.owner_id, u.username, p.title, \
     p.description, p.category, p.condition, p.price, p.location, p.image_url, \
     p.is_featured, p.views, p.is_sold, p.created_at";

pub(crate) const PRODUCT_FROM: &str = "FROM products p JOIN users u ON p.owner_id = u.id";

pub(crate) fn map_product(row: &Row<'_>) -> rusqlite::Result<ProductRow> {
    Ok(ProductRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        owner_username: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        category: row.get(5)?,
        condition: row.get(6)?,
        price: row.get(7)?,
        location: row.get(8)?,
        image_url: row.get(9)?,
        is_featured: row.get(10)?,
        views: row.get(11)?,
        is_sold: row.get(12)?,
        created_at: row.get(13)?,
    })
}

/// Extension trait for optional query results.
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> crate::Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> crate::Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
