use chrono::{Datelike, Utc};

use crate::models::AnalyticsRow;
use crate::{Database, Result};

impl Database {
    /// Seller dashboard numbers. Everything is aggregated in SQL; nothing
    /// walks the seller's listings in memory.
    pub fn seller_analytics(&self, owner_id: &str) -> Result<AnalyticsRow> {
        self.with_conn(|conn| {
            let (total_listings, sold_listings, total_views): (i64, i64, i64) = conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(is_sold), 0), COALESCE(SUM(views), 0) \
                 FROM products WHERE owner_id = ?1",
                [owner_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;

            let total_revenue: f64 = conn.query_row(
                "SELECT COALESCE(SUM(ph.price_paid), 0.0) \
                 FROM purchases ph JOIN products p ON ph.product_id = p.id \
                 WHERE p.owner_id = ?1",
                [owner_id],
                |row| row.get(0),
            )?;

            let mut sales_by_month: Vec<(String, i64)> = {
                let mut stmt = conn.prepare(
                    "SELECT strftime('%Y-%m', ph.purchased_at) AS month, COUNT(*) \
                     FROM purchases ph JOIN products p ON ph.product_id = p.id \
                     WHERE p.owner_id = ?1 GROUP BY month",
                )?;
                let rows = stmt
                    .query_map([owner_id], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            };

            // Last six calendar months, zero-filled, newest first.
            let monthly_sales = last_six_months(Utc::now().year(), Utc::now().month())
                .into_iter()
                .map(|label| {
                    let count = sales_by_month
                        .iter()
                        .position(|(m, _)| *m == label)
                        .map(|i| sales_by_month.swap_remove(i).1)
                        .unwrap_or(0);
                    (label, count)
                })
                .collect();

            let categories: Vec<(String, i64, i64)> = {
                let mut stmt = conn.prepare(
                    "SELECT category, COUNT(*), COALESCE(SUM(is_sold), 0) \
                     FROM products WHERE owner_id = ?1 GROUP BY category ORDER BY category",
                )?;
                let rows = stmt
                    .query_map([owner_id], |row| {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            };

            Ok(AnalyticsRow {
                total_listings,
                active_listings: total_listings - sold_listings,
                sold_listings,
                total_views,
                total_revenue,
                monthly_sales,
                categories,
            })
        })
    }
}

fn last_six_months(mut year: i32, mut month: u32) -> Vec<String> {
    let mut labels = Vec::with_capacity(6);
    for _ in 0..6 {
        labels.push(format!("{year:04}-{month:02}"));
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::last_six_months;
    use crate::models::NewProduct;
    use crate::Database;

    #[test]
    fn month_labels_wrap_the_year() {
        let labels = last_six_months(2026, 2);
        assert_eq!(
            labels,
            vec!["2026-02", "2026-01", "2025-12", "2025-11", "2025-10", "2025-09"]
        );
    }

    #[test]
    fn analytics_aggregates_revenue_and_categories() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("seller", "sally", "sally@example.com", "hash").unwrap();
        db.create_user("buyer", "bob", "bob@example.com", "hash").unwrap();

        let sold = db
            .create_product(
                "seller",
                &NewProduct {
                    title: "Desk".into(),
                    description: "oak desk".into(),
                    category: "Furniture".into(),
                    condition: "Used".into(),
                    price: 75.0,
                    ..Default::default()
                },
            )
            .unwrap();
        db.create_product(
            "seller",
            &NewProduct {
                title: "Monitor".into(),
                description: "24 inch".into(),
                category: "Electronics".into(),
                condition: "Used".into(),
                price: 90.0,
                ..Default::default()
            },
        )
        .unwrap();

        db.add_to_cart("buyer", &sold).unwrap();
        db.checkout("buyer").unwrap();

        let stats = db.seller_analytics("seller").unwrap();
        assert_eq!(stats.total_listings, 2);
        assert_eq!(stats.sold_listings, 1);
        assert_eq!(stats.active_listings, 1);
        assert_eq!(stats.total_revenue, 75.0);
        assert_eq!(stats.monthly_sales.len(), 6);
        assert_eq!(stats.monthly_sales[0].1, 1);
        assert_eq!(
            stats.categories,
            vec![
                ("Electronics".to_string(), 1, 0),
                ("Furniture".to_string(), 1, 1),
            ]
        );
    }
}
