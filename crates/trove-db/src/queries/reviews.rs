use trove_types::models::RatingSummary;
use uuid::Uuid;

use crate::models::ReviewRow;
use crate::queries::OptionalExt;
use crate::queries::notifications::insert_notification;
use crate::queries::purchases::has_purchased;
use crate::{Database, Error, Result};

impl Database {
    /// Leave a rating on a purchased product. Gated on proof of purchase and
    /// one-review-per-buyer; the product owner gets a notification.
    pub fn add_review(
        &self,
        reviewer_id: &str,
        product_id: &str,
        rating: i64,
        comment: &str,
    ) -> Result<ReviewRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if !(1..=5).contains(&rating) {
                return Err(Error::InvalidRating);
            }

            let (owner_id, title): (String, String) = tx
                .query_row(
                    "SELECT owner_id, title FROM products WHERE id = ?1",
                    [product_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?
                .ok_or(Error::NotFound("product"))?;

            if !has_purchased(&tx, reviewer_id, product_id)? {
                return Err(Error::NoPurchaseProof);
            }

            let existing: i64 = tx.query_row(
                "SELECT COUNT(*) FROM reviews WHERE reviewer_id = ?1 AND product_id = ?2",
                [reviewer_id, product_id],
                |row| row.get(0),
            )?;
            if existing > 0 {
                return Err(Error::DuplicateReview);
            }

            let id = Uuid::new_v4().to_string();
            tx.execute(
                "INSERT INTO reviews (id, product_id, reviewer_id, rating, comment) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, product_id, reviewer_id, rating, comment],
            )?;

            let reviewer_username: String = tx.query_row(
                "SELECT username FROM users WHERE id = ?1",
                [reviewer_id],
                |row| row.get(0),
            )?;
            insert_notification(
                &tx,
                &owner_id,
                "New Review",
                &format!("{reviewer_username} reviewed your product \"{title}\""),
                "info",
                Some(&format!("/products/{product_id}")),
            )?;

            let review = ReviewRow {
                id,
                product_id: product_id.to_string(),
                reviewer_id: reviewer_id.to_string(),
                reviewer_username,
                rating,
                comment: comment.to_string(),
                created_at: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            };
            tx.commit()?;
            Ok(review)
        })
    }

    pub fn reviews_for_product(&self, product_id: &str) -> Result<Vec<ReviewRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT r.id, r.product_id, r.reviewer_id, u.username, r.rating, r.comment, \
                 r.created_at FROM reviews r JOIN users u ON r.reviewer_id = u.id \
                 WHERE r.product_id = ?1 ORDER BY r.created_at DESC, r.rowid DESC",
            )?;
            let rows = stmt
                .query_map([product_id], |row| {
                    Ok(ReviewRow {
                        id: row.get(0)?,
                        product_id: row.get(1)?,
                        reviewer_id: row.get(2)?,
                        reviewer_username: row.get(3)?,
                        rating: row.get(4)?,
                        comment: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Mean rating and review count in a single aggregate query. The mean is
    /// 0.0 when there are no reviews; callers distinguish "no rating" from a
    /// true zero by the count.
    pub fn product_rating(&self, product_id: &str) -> Result<RatingSummary> {
        self.with_conn(|conn| {
            let (average, count): (f64, u32) = conn.query_row(
                "SELECT COALESCE(AVG(rating), 0.0), COUNT(*) FROM reviews WHERE product_id = ?1",
                [product_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            Ok(RatingSummary { average, count })
        })
    }

    /// Seller-wide rating across all their listings, aggregated in SQL
    /// rather than by walking the object graph in memory.
    pub fn seller_rating(&self, owner_id: &str) -> Result<RatingSummary> {
        self.with_conn(|conn| {
            let (average, count): (f64, u32) = conn.query_row(
                "SELECT COALESCE(AVG(r.rating), 0.0), COUNT(*) \
                 FROM reviews r JOIN products p ON r.product_id = p.id \
                 WHERE p.owner_id = ?1",
                [owner_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            Ok(RatingSummary { average, count })
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
        db.create_user("rival", "rita", "rita@example.com", "hash").unwrap();
        let product_id = db
            .create_product(
                "seller",
                &NewProduct {
                    title: "Kettle".into(),
                    description: "electric kettle".into(),
                    category: "Home & Garden".into(),
                    condition: "Used".into(),
                    price: 15.0,
                    ..Default::default()
                },
            )
            .unwrap();
        (db, product_id)
    }

    fn buy(db: &Database, buyer: &str, product_id: &str) {
        db.add_to_cart(buyer, product_id).unwrap();
        db.checkout(buyer).unwrap();
    }

    #[test]
    fn review_requires_purchase_proof() {
        let (db, product_id) = setup();

        let err = db.add_review("buyer", &product_id, 5, "great").unwrap_err();
        assert!(matches!(err, Error::NoPurchaseProof));

        buy(&db, "buyer", &product_id);

        db.add_review("buyer", &product_id, 5, "great").unwrap();
        let err = db.add_review("buyer", &product_id, 4, "again").unwrap_err();
        assert!(matches!(err, Error::DuplicateReview));
    }

    #[test]
    fn rating_bounds_enforced() {
        let (db, product_id) = setup();
        buy(&db, "buyer", &product_id);

        assert!(matches!(
            db.add_review("buyer", &product_id, 0, "").unwrap_err(),
            Error::InvalidRating
        ));
        assert!(matches!(
            db.add_review("buyer", &product_id, 6, "").unwrap_err(),
            Error::InvalidRating
        ));
    }

    #[test]
    fn average_of_five_and_three_is_four() {
        let (db, product_id) = setup();
        buy(&db, "buyer", &product_id);

        // Synthesize the second buyer's purchase proof directly in the
        // ledger; the product itself is already sold.
        db.with_conn(|conn| {
            crate::queries::purchases::insert_purchase(conn, "rival", &product_id, "Kettle", 15.0)?;
            Ok(())
        })
        .unwrap();

        db.add_review("buyer", &product_id, 5, "").unwrap();
        db.add_review("rival", &product_id, 3, "").unwrap();

        let rating = db.product_rating(&product_id).unwrap();
        assert_eq!(rating.average, 4.0);
        assert_eq!(rating.count, 2);
    }

    #[test]
    fn no_reviews_reads_as_no_rating_not_zero_stars() {
        let (db, product_id) = setup();
        let rating = db.product_rating(&product_id).unwrap();
        assert_eq!(rating.count, 0);
        assert_eq!(rating.average, 0.0);
    }

    #[test]
    fn seller_rating_spans_all_listings() {
        let (db, first) = setup();
        let second = db
            .create_product(
                "seller",
                &NewProduct {
                    title: "Toaster".into(),
                    description: "two slots".into(),
                    category: "Home & Garden".into(),
                    condition: "Used".into(),
                    price: 20.0,
                    ..Default::default()
                },
            )
            .unwrap();

        buy(&db, "buyer", &first);
        buy(&db, "rival", &second);
        db.add_review("buyer", &first, 5, "").unwrap();
        db.add_review("rival", &second, 2, "").unwrap();

        let rating = db.seller_rating("seller").unwrap();
        assert_eq!(rating.count, 2);
        assert_eq!(rating.average, 3.5);
    }
}
