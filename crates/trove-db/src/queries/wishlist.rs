use uuid::Uuid;

use crate::models::WishlistItemRow;
use crate::queries::products::query_product;
use crate::queries::{PRODUCT_COLUMNS, PRODUCT_FROM, map_product};
use crate::{Database, Error, Result};

impl Database {
    pub fn add_to_wishlist(&self, user_id: &str, product_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            let product = query_product(conn, product_id)?.ok_or(Error::NotFound("product"))?;
            if product.owner_id == user_id {
                return Err(Error::AlreadyOwned);
            }

            let existing: i64 = conn.query_row(
                "SELECT COUNT(*) FROM wishlist_items WHERE user_id = ?1 AND product_id = ?2",
                [user_id, product_id],
                |row| row.get(0),
            )?;
            if existing > 0 {
                return Err(Error::Duplicate);
            }

            conn.execute(
                "INSERT INTO wishlist_items (id, user_id, product_id) VALUES (?1, ?2, ?3)",
                [&Uuid::new_v4().to_string(), user_id, product_id],
            )?;
            Ok(())
        })
    }

    pub fn remove_from_wishlist(&self, user_id: &str, product_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM wishlist_items WHERE user_id = ?1 AND product_id = ?2",
                [user_id, product_id],
            )?;
            if deleted == 0 {
                return Err(Error::NotFound("wishlist item"));
            }
            Ok(())
        })
    }

    pub fn wishlist_items(&self, user_id: &str) -> Result<Vec<WishlistItemRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLUMNS}, w.added_at {PRODUCT_FROM} \
                 JOIN wishlist_items w ON w.product_id = p.id \
                 WHERE w.user_id = ?1 ORDER BY w.added_at DESC, w.rowid DESC"
            ))?;
            let items = stmt
                .query_map([user_id], |row| {
                    Ok(WishlistItemRow { product: map_product(row)?, added_at: row.get(14)? })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(items)
        })
    }

    pub fn in_wishlist(&self, user_id: &str, product_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM wishlist_items WHERE user_id = ?1 AND product_id = ?2",
                [user_id, product_id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::models::NewProduct;
    use crate::{Database, Error};

    #[test]
    fn wishlist_lifecycle() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("seller", "sally", "sally@example.com", "hash").unwrap();
        db.create_user("buyer", "bob", "bob@example.com", "hash").unwrap();
        let product_id = db
            .create_product(
                "seller",
                &NewProduct {
                    title: "Novel".into(),
                    description: "paperback".into(),
                    category: "Books".into(),
                    condition: "Used".into(),
                    price: 5.0,
                    ..Default::default()
                },
            )
            .unwrap();

        let err = db.add_to_wishlist("seller", &product_id).unwrap_err();
        assert!(matches!(err, Error::AlreadyOwned));

        db.add_to_wishlist("buyer", &product_id).unwrap();
        assert!(db.in_wishlist("buyer", &product_id).unwrap());

        let items = db.wishlist_items("buyer").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product.title, "Novel");
        assert!(!items[0].added_at.is_empty());

        let err = db.add_to_wishlist("buyer", &product_id).unwrap_err();
        assert!(matches!(err, Error::Duplicate));

        db.remove_from_wishlist("buyer", &product_id).unwrap();
        assert!(!db.in_wishlist("buyer", &product_id).unwrap());

        let err = db.remove_from_wishlist("buyer", &product_id).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
