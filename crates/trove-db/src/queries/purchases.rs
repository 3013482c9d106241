use rusqlite::Connection;
use uuid::Uuid;

use crate::models::PurchaseRow;
use crate::{Database, Result};

/// Record a completed sale. Free function taking a connection so it composes
/// into the caller's transaction; checkout and offer acceptance share it.
pub(crate) fn insert_purchase(
    conn: &Connection,
    buyer_id: &str,
    product_id: &str,
    product_title: &str,
    price_paid: f64,
) -> Result<PurchaseRow> {
    let id = Uuid::new_v4().to_string();
    let purchased_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    conn.execute(
        "INSERT INTO purchases (id, buyer_id, product_id, price_paid, purchased_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![id, buyer_id, product_id, price_paid, purchased_at],
    )?;
    Ok(PurchaseRow {
        id,
        buyer_id: buyer_id.to_string(),
        product_id: product_id.to_string(),
        product_title: product_title.to_string(),
        price_paid,
        purchased_at,
    })
}

pub(crate) fn has_purchased(conn: &Connection, buyer_id: &str, product_id: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM purchases WHERE buyer_id = ?1 AND product_id = ?2",
        [buyer_id, product_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

impl Database {
    /// The buyer's purchase history, newest first. Products may have been
    /// deleted since the sale; the ledger row survives with a placeholder
    /// title.
    pub fn purchases_for_user(&self, buyer_id: &str) -> Result<Vec<PurchaseRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT ph.id, ph.buyer_id, ph.product_id, COALESCE(p.title, '[deleted]'), \
                 ph.price_paid, ph.purchased_at \
                 FROM purchases ph LEFT JOIN products p ON ph.product_id = p.id \
                 WHERE ph.buyer_id = ?1 ORDER BY ph.purchased_at DESC, ph.rowid DESC",
            )?;
            let rows = stmt
                .query_map([buyer_id], |row| {
                    Ok(PurchaseRow {
                        id: row.get(0)?,
                        buyer_id: row.get(1)?,
                        product_id: row.get(2)?,
                        product_title: row.get(3)?,
                        price_paid: row.get(4)?,
                        purchased_at: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Purchase count for a product. The sold invariant means this is 0 or 1.
    pub fn purchase_count_for_product(&self, product_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM purchases WHERE product_id = ?1",
                [product_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }
}
