use rusqlite::{Connection, ToSql};
use uuid::Uuid;

use crate::models::{NewProduct, ProductFilter, ProductRow, ProductUpdate};
use crate::queries::{OptionalExt, PRODUCT_COLUMNS, PRODUCT_FROM, map_product};
use crate::{Database, Error, Result};

impl Database {
    /// Insert a listing together with its extra images. Returns the new id.
    pub fn create_product(&self, owner_id: &str, new: &NewProduct) -> Result<String> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let id = Uuid::new_v4().to_string();

            tx.execute(
                "INSERT INTO products (id, owner_id, title, description, category, condition, \
                 price, location, image_url, is_featured) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    id,
                    owner_id,
                    new.title,
                    new.description,
                    new.category,
                    new.condition,
                    new.price,
                    new.location,
                    new.image_url,
                    new.is_featured,
                ],
            )?;

            for (i, image_url) in new.extra_images.iter().enumerate() {
                tx.execute(
                    "INSERT INTO product_images (id, product_id, image_url, order_index) \
                     VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![Uuid::new_v4().to_string(), id, image_url, i as i64 + 1],
                )?;
            }

            tx.commit()?;
            Ok(id)
        })
    }

    pub fn get_product(&self, id: &str) -> Result<Option<ProductRow>> {
        self.with_conn(|conn| query_product(conn, id))
    }

    /// Bump the view counter; monotonic, no upper bound.
    pub fn increment_views(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE products SET views = views + 1 WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn product_images(&self, product_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT image_url FROM product_images WHERE product_id = ?1 ORDER BY order_index",
            )?;
            let rows = stmt
                .query_map([product_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(rows)
        })
    }

    /// Unsold products in the same category from other sellers.
    pub fn similar_products(&self, product: &ProductRow, limit: u32) -> Result<Vec<ProductRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLUMNS} {PRODUCT_FROM} \
                 WHERE p.category = ?1 AND p.id != ?2 \
                 AND p.owner_id != ?3 AND p.is_sold = 0 LIMIT ?4"
            ))?;
            let rows = stmt
                .query_map(
                    rusqlite::params![product.category, product.id, product.owner_id, limit],
                    map_product,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Browse unsold listings with the filter applied. Returns the page of
    /// rows plus the total match count for pagination.
    pub fn list_products(&self, filter: &ProductFilter) -> Result<(Vec<ProductRow>, u64)> {
        self.with_conn(|conn| {
            let mut clauses: Vec<String> = vec!["p.is_sold = 0".into()];
            let mut params: Vec<Box<dyn ToSql>> = Vec::new();

            if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
                params.push(Box::new(format!("%{search}%")));
                clauses.push(format!(
                    "(p.title LIKE ?{n} OR p.description LIKE ?{n})",
                    n = params.len()
                ));
            }
            if let Some(category) = filter.category.as_deref().filter(|s| !s.is_empty()) {
                params.push(Box::new(category.to_string()));
                clauses.push(format!("p.category = ?{}", params.len()));
            }
            if let Some(condition) = filter.condition.as_deref().filter(|s| !s.is_empty()) {
                params.push(Box::new(condition.to_string()));
                clauses.push(format!("p.condition = ?{}", params.len()));
            }
            if let Some(min) = filter.min_price {
                params.push(Box::new(min));
                clauses.push(format!("p.price >= ?{}", params.len()));
            }
            if let Some(max) = filter.max_price {
                params.push(Box::new(max));
                clauses.push(format!("p.price <= ?{}", params.len()));
            }
            if let Some(location) = filter.location.as_deref().filter(|s| !s.is_empty()) {
                params.push(Box::new(format!("%{location}%")));
                clauses.push(format!("p.location LIKE ?{}", params.len()));
            }

            let where_clause = clauses.join(" AND ");
            let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();

            let total: u64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM products p WHERE {where_clause}"),
                param_refs.as_slice(),
                |row| row.get(0),
            )?;

            let sql = format!(
                "SELECT {PRODUCT_COLUMNS} {PRODUCT_FROM} WHERE {where_clause} \
                 ORDER BY {} LIMIT {} OFFSET {}",
                filter.sort.order_clause(),
                filter.limit,
                filter.offset,
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(param_refs.as_slice(), map_product)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok((rows, total))
        })
    }

    /// All of a seller's listings, sold included, newest first.
    pub fn listings_for_owner(&self, owner_id: &str, only_unsold: bool) -> Result<Vec<ProductRow>> {
        self.with_conn(|conn| {
            let sold_clause = if only_unsold { " AND p.is_sold = 0" } else { "" };
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLUMNS} {PRODUCT_FROM} WHERE p.owner_id = ?1{sold_clause} \
                 ORDER BY p.created_at DESC, p.rowid DESC"
            ))?;
            let rows = stmt
                .query_map([owner_id], map_product)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_product(
        &self,
        owner_id: &str,
        product_id: &str,
        update: &ProductUpdate,
    ) -> Result<()> {
        self.with_conn(|conn| {
            let product = query_product(conn, product_id)?.ok_or(Error::NotFound("product"))?;
            if product.owner_id != owner_id {
                return Err(Error::NotOwner);
            }

            conn.execute(
                "UPDATE products SET title = ?1, description = ?2, category = ?3, price = ?4, \
                 image_url = ?5 WHERE id = ?6",
                rusqlite::params![
                    update.title,
                    update.description,
                    update.category,
                    update.price,
                    update.image_url.as_deref().unwrap_or(&product.image_url),
                    product_id,
                ],
            )?;
            Ok(())
        })
    }

    /// Remove a listing and its dependent rows in one transaction. The
    /// cascade is explicit: cart entries, wishlist entries, offers, reviews
    /// and extra images go with the product. Purchases are history and stay.
    pub fn delete_product(&self, owner_id: &str, product_id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let owner: Option<String> = tx
                .query_row(
                    "SELECT owner_id FROM products WHERE id = ?1",
                    [product_id],
                    |row| row.get(0),
                )
                .optional()?;
            match owner {
                None => return Err(Error::NotFound("product")),
                Some(o) if o != owner_id => return Err(Error::NotOwner),
                Some(_) => {}
            }

            for table in ["cart_items", "wishlist_items", "offers", "reviews", "product_images"] {
                tx.execute(&format!("DELETE FROM {table} WHERE product_id = ?1"), [product_id])?;
            }
            // Conversations about the listing survive, just unlinked.
            tx.execute(
                "UPDATE messages SET product_id = NULL WHERE product_id = ?1",
                [product_id],
            )?;
            tx.execute("DELETE FROM products WHERE id = ?1", [product_id])?;

            tx.commit()?;
            Ok(())
        })
    }
}

pub(crate) fn query_product(conn: &Connection, id: &str) -> Result<Option<ProductRow>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {PRODUCT_COLUMNS} {PRODUCT_FROM} WHERE p.id = ?1"))?;
    let row = stmt.query_row([id], map_product).optional()?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use crate::models::{NewProduct, ProductFilter, SortBy};
    use crate::{Database, Error};

    fn seed(db: &Database) {
        db.create_user("seller", "sally", "sally@example.com", "hash").unwrap();
        db.create_user("buyer", "bob", "bob@example.com", "hash").unwrap();
    }

    fn listing(title: &str, category: &str, price: f64) -> NewProduct {
        NewProduct {
            title: title.into(),
            description: format!("{title} in good shape"),
            category: category.into(),
            condition: "Used".into(),
            price,
            ..Default::default()
        }
    }

    #[test]
    fn listing_filter_and_sort() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        db.create_product("seller", &listing("Old bike", "Sports", 80.0)).unwrap();
        db.create_product("seller", &listing("Bookshelf", "Furniture", 40.0)).unwrap();
        db.create_product("seller", &listing("Road bike", "Sports", 250.0)).unwrap();

        let (rows, total) = db
            .list_products(&ProductFilter {
                search: Some("bike".into()),
                sort: SortBy::PriceLow,
                limit: 12,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(rows[0].title, "Old bike");
        assert_eq!(rows[1].title, "Road bike");

        let (rows, total) = db
            .list_products(&ProductFilter {
                category: Some("Furniture".into()),
                max_price: Some(50.0),
                limit: 12,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].title, "Bookshelf");
    }

    #[test]
    fn update_requires_ownership() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        let id = db.create_product("seller", &listing("Lamp", "Other", 10.0)).unwrap();

        let update = crate::models::ProductUpdate {
            title: "Desk lamp".into(),
            description: "still works".into(),
            category: "Other".into(),
            price: 12.0,
            image_url: None,
        };
        let err = db.update_product("buyer", &id, &update).unwrap_err();
        assert!(matches!(err, Error::NotOwner));

        db.update_product("seller", &id, &update).unwrap();
        let product = db.get_product(&id).unwrap().unwrap();
        assert_eq!(product.title, "Desk lamp");
        assert_eq!(product.price, 12.0);
    }

    #[test]
    fn delete_cascades_dependents() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        let id = db.create_product("seller", &listing("Lamp", "Other", 10.0)).unwrap();
        db.add_to_cart("buyer", &id).unwrap();
        db.add_to_wishlist("buyer", &id).unwrap();
        db.make_offer("buyer", &id, 8.0, "").unwrap();

        db.delete_product("seller", &id).unwrap();

        assert!(db.get_product(&id).unwrap().is_none());
        assert!(db.cart_items("buyer").unwrap().is_empty());
        assert!(db.wishlist_items("buyer").unwrap().is_empty());
        assert!(db.offers_for_product(&id).unwrap().is_empty());
    }

    #[test]
    fn deleting_account_keeps_purchase_history() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        let id = db.create_product("seller", &listing("Lamp", "Other", 10.0)).unwrap();
        db.add_to_cart("buyer", &id).unwrap();
        db.checkout("buyer").unwrap();

        db.delete_user("seller").unwrap();

        assert!(db.get_user_by_id("seller").unwrap().is_none());
        assert!(db.get_product(&id).unwrap().is_none());
        let purchases = db.purchases_for_user("buyer").unwrap();
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].price_paid, 10.0);
    }
}
