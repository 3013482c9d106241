use uuid::Uuid;

use crate::models::{CartItemRow, PurchaseRow};
use crate::queries::products::query_product;
use crate::queries::purchases::insert_purchase;
use crate::queries::{PRODUCT_COLUMNS, PRODUCT_FROM, map_product};
use crate::{Database, Error, Result};

impl Database {
    pub fn add_to_cart(&self, user_id: &str, product_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            let product = query_product(conn, product_id)?.ok_or(Error::NotFound("product"))?;
            if product.owner_id == user_id {
                return Err(Error::AlreadyOwned);
            }
            if product.is_sold {
                return Err(Error::AlreadySold);
            }

            let existing: i64 = conn.query_row(
                "SELECT COUNT(*) FROM cart_items WHERE user_id = ?1 AND product_id = ?2",
                [user_id, product_id],
                |row| row.get(0),
            )?;
            if existing > 0 {
                return Err(Error::Duplicate);
            }

            conn.execute(
                "INSERT INTO cart_items (id, user_id, product_id) VALUES (?1, ?2, ?3)",
                [&Uuid::new_v4().to_string(), user_id, product_id],
            )?;
            Ok(())
        })
    }

    pub fn remove_from_cart(&self, user_id: &str, product_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM cart_items WHERE user_id = ?1 AND product_id = ?2",
                [user_id, product_id],
            )?;
            if deleted == 0 {
                return Err(Error::NotFound("cart item"));
            }
            Ok(())
        })
    }

    pub fn cart_items(&self, user_id: &str) -> Result<Vec<CartItemRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLUMNS}, c.added_at {PRODUCT_FROM} \
                 JOIN cart_items c ON c.product_id = p.id \
                 WHERE c.user_id = ?1 ORDER BY c.added_at DESC, c.rowid DESC"
            ))?;
            let items = stmt
                .query_map([user_id], |row| {
                    Ok(CartItemRow { product: map_product(row)?, added_at: row.get(14)? })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(items)
        })
    }

    /// Convert the cart into purchases in one transaction.
    ///
    /// Entries whose product is still available are bought at the product's
    /// current price; entries whose product was sold through another path
    /// are dropped silently (stale-cart cleanup). The sold flag is claimed
    /// with a conditional UPDATE so two concurrent buyers can never both
    /// record a purchase for the same product.
    pub fn checkout(&self, user_id: &str) -> Result<Vec<PurchaseRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let entries: Vec<(String, String, f64, String)> = {
                let mut stmt = tx.prepare(
                    "SELECT c.id, p.id, p.price, p.title FROM cart_items c \
                     JOIN products p ON c.product_id = p.id WHERE c.user_id = ?1",
                )?;
                let rows = stmt
                    .query_map([user_id], |row| {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            };

            if entries.is_empty() {
                return Err(Error::EmptyCart);
            }

            let mut purchases = Vec::new();
            for (cart_id, product_id, price, title) in entries {
                let claimed = tx.execute(
                    "UPDATE products SET is_sold = 1 WHERE id = ?1 AND is_sold = 0",
                    [&product_id],
                )?;
                if claimed == 1 {
                    let purchase = insert_purchase(&tx, user_id, &product_id, &title, price)?;
                    purchases.push(purchase);
                }
                // Sold through another path: drop the stale entry, no
                // charge, no error.
                tx.execute("DELETE FROM cart_items WHERE id = ?1", [&cart_id])?;
            }

            tx.commit()?;
            Ok(purchases)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::models::NewProduct;
    use crate::{Database, Error};

    fn setup() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        db.create_user("seller", "sally", "sally@example.com", "hash").unwrap();
        db.create_user("buyer", "bob", "bob@example.com", "hash").unwrap();
        let product_id = db
            .create_product(
                "seller",
                &NewProduct {
                    title: "Camera".into(),
                    description: "35mm film camera".into(),
                    category: "Electronics".into(),
                    condition: "Used".into(),
                    price: 120.0,
                    ..Default::default()
                },
            )
            .unwrap();
        (db, product_id)
    }

    #[test]
    fn add_to_cart_rejections() {
        let (db, product_id) = setup();

        let err = db.add_to_cart("seller", &product_id).unwrap_err();
        assert!(matches!(err, Error::AlreadyOwned));

        db.add_to_cart("buyer", &product_id).unwrap();
        let err = db.add_to_cart("buyer", &product_id).unwrap_err();
        assert!(matches!(err, Error::Duplicate));
    }

    #[test]
    fn cart_listing_carries_product_and_added_at() {
        let (db, product_id) = setup();
        db.add_to_cart("buyer", &product_id).unwrap();

        let items = db.cart_items("buyer").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product.title, "Camera");
        assert_eq!(items[0].product.owner_username, "sally");
        assert!(!items[0].added_at.is_empty());
    }

    #[test]
    fn empty_cart_checkout_fails() {
        let (db, _) = setup();
        let err = db.checkout("buyer").unwrap_err();
        assert!(matches!(err, Error::EmptyCart));
    }

    #[test]
    fn checkout_buys_at_current_price() {
        let (db, product_id) = setup();
        db.add_to_cart("buyer", &product_id).unwrap();

        // Seller reprices after the item entered the cart; checkout charges
        // the current price, not the price at add-to-cart time.
        db.update_product(
            "seller",
            &product_id,
            &crate::models::ProductUpdate {
                title: "Camera".into(),
                description: "35mm film camera".into(),
                category: "Electronics".into(),
                price: 100.0,
                image_url: None,
            },
        )
        .unwrap();

        let purchases = db.checkout("buyer").unwrap();
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].price_paid, 100.0);

        let product = db.get_product(&product_id).unwrap().unwrap();
        assert!(product.is_sold);
        assert!(db.cart_items("buyer").unwrap().is_empty());
    }

    #[test]
    fn stale_entry_skipped_without_error() {
        let (db, fresh_id) = setup();
        db.create_user("other", "olga", "olga@example.com", "hash").unwrap();
        let stale_id = db
            .create_product(
                "seller",
                &NewProduct {
                    title: "Chair".into(),
                    description: "oak chair".into(),
                    category: "Furniture".into(),
                    condition: "Used".into(),
                    price: 30.0,
                    ..Default::default()
                },
            )
            .unwrap();

        db.add_to_cart("buyer", &fresh_id).unwrap();
        db.add_to_cart("buyer", &stale_id).unwrap();

        // Another buyer takes the chair first.
        db.add_to_cart("other", &stale_id).unwrap();
        db.checkout("other").unwrap();

        let purchases = db.checkout("buyer").unwrap();
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].product_id, fresh_id);
        assert!(db.cart_items("buyer").unwrap().is_empty());

        // Exactly one purchase row exists for the chair.
        let chair_buyers = db.purchases_for_user("other").unwrap();
        assert_eq!(chair_buyers.len(), 1);
    }

    #[test]
    fn sold_product_cannot_be_recarted() {
        let (db, product_id) = setup();
        db.add_to_cart("buyer", &product_id).unwrap();
        db.checkout("buyer").unwrap();

        db.create_user("other", "olga", "olga@example.com", "hash").unwrap();
        let err = db.add_to_cart("other", &product_id).unwrap_err();
        assert!(matches!(err, Error::AlreadySold));
    }
}
