use rusqlite::Connection;
use trove_types::models::OfferStatus;
use uuid::Uuid;

use crate::models::OfferRow;
use crate::queries::OptionalExt;
use crate::queries::notifications::insert_notification;
use crate::queries::purchases::insert_purchase;
use crate::{Database, Error, Result};

/// Owner's decision on a pending offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferAction {
    Accept,
    Reject,
}

impl Database {
    /// Submit a bid on someone else's unsold product and notify the owner.
    /// A buyer may hold several pending offers on the same product; that is
    /// permitted by the data model, not a bug.
    pub fn make_offer(
        &self,
        buyer_id: &str,
        product_id: &str,
        amount: f64,
        message: &str,
    ) -> Result<OfferRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let (owner_id, title, is_sold): (String, String, bool) = tx
                .query_row(
                    "SELECT owner_id, title, is_sold FROM products WHERE id = ?1",
                    [product_id],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()?
                .ok_or(Error::NotFound("product"))?;

            if owner_id == buyer_id {
                return Err(Error::SelfOffer);
            }
            if is_sold {
                return Err(Error::AlreadySold);
            }

            let buyer_username: String = tx
                .query_row("SELECT username FROM users WHERE id = ?1", [buyer_id], |row| {
                    row.get(0)
                })
                .optional()?
                .ok_or(Error::NotFound("user"))?;

            let id = Uuid::new_v4().to_string();
            tx.execute(
                "INSERT INTO offers (id, product_id, buyer_id, amount, message) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, product_id, buyer_id, amount, message],
            )?;

            insert_notification(
                &tx,
                &owner_id,
                "New Offer",
                &format!("{buyer_username} made an offer of ${amount:.2} for \"{title}\""),
                "info",
                Some(&format!("/products/{product_id}")),
            )?;

            let offer = query_offer(&tx, &id)?.ok_or(Error::NotFound("offer"))?;
            tx.commit()?;
            Ok(offer)
        })
    }

    /// Accept or reject a pending offer. Every effect of acceptance (offer
    /// status, sold flag, purchase record, seller/buyer counters, buyer
    /// notification) lands in one transaction or not at all.
    ///
    /// Accepting does not touch sibling pending offers on the same product;
    /// they stay pending against a now-sold product. Known gap, kept as is.
    pub fn respond_to_offer(
        &self,
        owner_id: &str,
        offer_id: &str,
        action: OfferAction,
    ) -> Result<OfferRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let offer = query_offer(&tx, offer_id)?.ok_or(Error::NotFound("offer"))?;

            let (product_owner, title): (String, String) = tx
                .query_row(
                    "SELECT owner_id, title FROM products WHERE id = ?1",
                    [&offer.product_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?
                .ok_or(Error::NotFound("product"))?;

            if product_owner != owner_id {
                return Err(Error::NotOwner);
            }
            // Terminal states are final; re-accepting must never create a
            // second purchase record.
            if OfferStatus::parse(&offer.status).is_none_or(|s| s.is_terminal()) {
                return Err(Error::OfferClosed);
            }

            match action {
                OfferAction::Accept => {
                    let claimed = tx.execute(
                        "UPDATE products SET is_sold = 1 WHERE id = ?1 AND is_sold = 0",
                        [&offer.product_id],
                    )?;
                    if claimed == 0 {
                        // Sold through checkout or another accepted offer
                        // while this one sat pending.
                        return Err(Error::AlreadySold);
                    }

                    tx.execute(
                        "UPDATE offers SET status = 'accepted' WHERE id = ?1",
                        [offer_id],
                    )?;
                    insert_purchase(&tx, &offer.buyer_id, &offer.product_id, &title, offer.amount)?;
                    tx.execute(
                        "UPDATE users SET total_sales = total_sales + 1 WHERE id = ?1",
                        [owner_id],
                    )?;
                    tx.execute(
                        "UPDATE users SET total_purchases = total_purchases + 1 WHERE id = ?1",
                        [&offer.buyer_id],
                    )?;
                    insert_notification(
                        &tx,
                        &offer.buyer_id,
                        "Offer Accepted!",
                        &format!("Your offer for \"{title}\" has been accepted!"),
                        "success",
                        Some("/purchases"),
                    )?;
                }
                OfferAction::Reject => {
                    tx.execute(
                        "UPDATE offers SET status = 'rejected' WHERE id = ?1",
                        [offer_id],
                    )?;
                    insert_notification(
                        &tx,
                        &offer.buyer_id,
                        "Offer Declined",
                        &format!("Your offer for \"{title}\" was declined."),
                        "info",
                        Some(&format!("/products/{}", offer.product_id)),
                    )?;
                }
            }

            let updated = query_offer(&tx, offer_id)?.ok_or(Error::NotFound("offer"))?;
            tx.commit()?;
            Ok(updated)
        })
    }

    /// Buyer-initiated `pending -> withdrawn`. The write only fires while the
    /// offer is still pending, so an accept committed by another process
    /// between read and write cannot be overwritten.
    pub fn withdraw_offer(&self, buyer_id: &str, offer_id: &str) -> Result<OfferRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let offer = query_offer(&tx, offer_id)?.ok_or(Error::NotFound("offer"))?;
            if offer.buyer_id != buyer_id {
                return Err(Error::NotOwner);
            }

            let changed = tx.execute(
                "UPDATE offers SET status = 'withdrawn' WHERE id = ?1 AND status = 'pending'",
                [offer_id],
            )?;
            if changed == 0 {
                return Err(Error::OfferClosed);
            }

            let updated = query_offer(&tx, offer_id)?.ok_or(Error::NotFound("offer"))?;
            tx.commit()?;
            Ok(updated)
        })
    }

    pub fn offers_for_product(&self, product_id: &str) -> Result<Vec<OfferRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{OFFER_SELECT} WHERE o.product_id = ?1 ORDER BY o.created_at DESC, o.rowid DESC"
            ))?;
            let rows = stmt
                .query_map([product_id], map_offer)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_offer(&self, offer_id: &str) -> Result<Option<OfferRow>> {
        self.with_conn(|conn| query_offer(conn, offer_id))
    }
}

const OFFER_SELECT: &str = "SELECT o.id, o.product_id, o.buyer_id, u.username, o.amount, \
     o.message, o.status, o.expires_at, o.created_at \
     FROM offers o JOIN users u ON o.buyer_id = u.id";

fn map_offer(row: &rusqlite::Row<'_>) -> rusqlite::Result<OfferRow> {
    Ok(OfferRow {
        id: row.get(0)?,
        product_id: row.get(1)?,
        buyer_id: row.get(2)?,
        buyer_username: row.get(3)?,
        amount: row.get(4)?,
        message: row.get(5)?,
        status: row.get(6)?,
        expires_at: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn query_offer(conn: &Connection, id: &str) -> Result<Option<OfferRow>> {
    let mut stmt = conn.prepare(&format!("{OFFER_SELECT} WHERE o.id = ?1"))?;
    let row = stmt.query_row([id], map_offer).optional()?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::OfferAction;
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
                    title: "Turntable".into(),
                    description: "belt drive".into(),
                    category: "Electronics".into(),
                    condition: "Used".into(),
                    price: 200.0,
                    ..Default::default()
                },
            )
            .unwrap();
        (db, product_id)
    }

    #[test]
    fn self_offer_rejected() {
        let (db, product_id) = setup();
        let err = db.make_offer("seller", &product_id, 150.0, "").unwrap_err();
        assert!(matches!(err, Error::SelfOffer));
    }

    #[test]
    fn offer_notifies_owner() {
        let (db, product_id) = setup();
        db.make_offer("buyer", &product_id, 150.0, "would 150 work?").unwrap();

        let notes = db.notifications_for_user("seller").unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "New Offer");
        assert!(notes[0].body.contains("$150.00"));
    }

    #[test]
    fn accept_sells_and_records_purchase_at_offer_amount() {
        let (db, product_id) = setup();
        let offer = db.make_offer("buyer", &product_id, 150.0, "").unwrap();

        let updated = db.respond_to_offer("seller", &offer.id, OfferAction::Accept).unwrap();
        assert_eq!(updated.status, "accepted");

        let product = db.get_product(&product_id).unwrap().unwrap();
        assert!(product.is_sold);

        let purchases = db.purchases_for_user("buyer").unwrap();
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].price_paid, 150.0);

        let seller = db.get_user_by_id("seller").unwrap().unwrap();
        let buyer = db.get_user_by_id("buyer").unwrap().unwrap();
        assert_eq!(seller.total_sales, 1);
        assert_eq!(buyer.total_purchases, 1);

        let notes = db.notifications_for_user("buyer").unwrap();
        assert_eq!(notes[0].title, "Offer Accepted!");
    }

    #[test]
    fn accept_is_not_repeatable() {
        let (db, product_id) = setup();
        let offer = db.make_offer("buyer", &product_id, 150.0, "").unwrap();
        db.respond_to_offer("seller", &offer.id, OfferAction::Accept).unwrap();

        let err = db.respond_to_offer("seller", &offer.id, OfferAction::Accept).unwrap_err();
        assert!(matches!(err, Error::OfferClosed));

        // Still exactly one purchase row for the product.
        assert_eq!(db.purchase_count_for_product(&product_id).unwrap(), 1);
    }

    #[test]
    fn reject_is_terminal_and_notifies() {
        let (db, product_id) = setup();
        let offer = db.make_offer("buyer", &product_id, 90.0, "").unwrap();

        let updated = db.respond_to_offer("seller", &offer.id, OfferAction::Reject).unwrap();
        assert_eq!(updated.status, "rejected");

        let err = db.respond_to_offer("seller", &offer.id, OfferAction::Accept).unwrap_err();
        assert!(matches!(err, Error::OfferClosed));

        let notes = db.notifications_for_user("buyer").unwrap();
        assert_eq!(notes[0].title, "Offer Declined");
    }

    #[test]
    fn only_the_owner_may_respond() {
        let (db, product_id) = setup();
        let offer = db.make_offer("buyer", &product_id, 150.0, "").unwrap();

        let err = db.respond_to_offer("rival", &offer.id, OfferAction::Accept).unwrap_err();
        assert!(matches!(err, Error::NotOwner));
    }

    #[test]
    fn sibling_pending_offer_stays_pending_after_accept() {
        let (db, product_id) = setup();
        let first = db.make_offer("buyer", &product_id, 150.0, "").unwrap();
        let second = db.make_offer("rival", &product_id, 180.0, "").unwrap();
        assert_eq!(second.status, "pending");

        db.respond_to_offer("seller", &first.id, OfferAction::Accept).unwrap();

        // Known gap, kept deliberately: the losing offer dangles as pending
        // on a sold product.
        let second = db.get_offer(&second.id).unwrap().unwrap();
        assert_eq!(second.status, "pending");

        // But acting on it can no longer produce a second sale.
        let err = db.respond_to_offer("seller", &second.id, OfferAction::Accept).unwrap_err();
        assert!(matches!(err, Error::AlreadySold));
        assert_eq!(db.purchase_count_for_product(&product_id).unwrap(), 1);
    }

    #[test]
    fn offer_on_sold_product_rejected() {
        let (db, product_id) = setup();
        let offer = db.make_offer("buyer", &product_id, 150.0, "").unwrap();
        db.respond_to_offer("seller", &offer.id, OfferAction::Accept).unwrap();

        let err = db.make_offer("rival", &product_id, 300.0, "").unwrap_err();
        assert!(matches!(err, Error::AlreadySold));
    }

    #[test]
    fn withdraw_cannot_reopen_an_accepted_offer() {
        let (db, product_id) = setup();
        let offer = db.make_offer("buyer", &product_id, 150.0, "").unwrap();
        db.respond_to_offer("seller", &offer.id, OfferAction::Accept).unwrap();

        // The guarded update refuses once the status left pending, so the
        // sale and its purchase row stand even if the buyer's withdraw lands
        // after the accept.
        let err = db.withdraw_offer("buyer", &offer.id).unwrap_err();
        assert!(matches!(err, Error::OfferClosed));

        let offer = db.get_offer(&offer.id).unwrap().unwrap();
        assert_eq!(offer.status, "accepted");
        assert_eq!(db.purchase_count_for_product(&product_id).unwrap(), 1);
    }

    #[test]
    fn withdraw_is_buyer_only_and_one_way() {
        let (db, product_id) = setup();
        let offer = db.make_offer("buyer", &product_id, 150.0, "").unwrap();

        let err = db.withdraw_offer("rival", &offer.id).unwrap_err();
        assert!(matches!(err, Error::NotOwner));

        let updated = db.withdraw_offer("buyer", &offer.id).unwrap();
        assert_eq!(updated.status, "withdrawn");

        let err = db.respond_to_offer("seller", &offer.id, OfferAction::Accept).unwrap_err();
        assert!(matches!(err, Error::OfferClosed));
    }
}
