use rusqlite::Connection;

use crate::models::UserRow;
use crate::queries::OptionalExt;
use crate::{Database, Error, Result};

impl Database {
    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            if query_user_by_username(conn, username)?.is_some() {
                return Err(Error::UsernameTaken);
            }
            if query_user_by_email(conn, email)?.is_some() {
                return Err(Error::EmailTaken);
            }
            conn.execute(
                "INSERT INTO users (id, username, email, password) VALUES (?1, ?2, ?3, ?4)",
                (id, username, email, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Update username/email, enforcing uniqueness against everyone else.
    pub fn update_profile(&self, user_id: &str, username: &str, email: &str) -> Result<()> {
        self.with_conn(|conn| {
            if let Some(other) = query_user_by_username(conn, username)? {
                if other.id != user_id {
                    return Err(Error::UsernameTaken);
                }
            }
            if let Some(other) = query_user_by_email(conn, email)? {
                if other.id != user_id {
                    return Err(Error::EmailTaken);
                }
            }
            let changed = conn.execute(
                "UPDATE users SET username = ?1, email = ?2 WHERE id = ?3",
                (username, email, user_id),
            )?;
            if changed == 0 {
                return Err(Error::NotFound("user"));
            }
            Ok(())
        })
    }

    pub fn update_password(&self, user_id: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET password = ?1 WHERE id = ?2",
                (password_hash, user_id),
            )?;
            if changed == 0 {
                return Err(Error::NotFound("user"));
            }
            Ok(())
        })
    }

    /// Delete an account and everything hanging off it in one transaction.
    /// Cascades are explicit: dependent rows of the user's own listings go
    /// first, then the user's rows in other tables, then the listings and
    /// the account itself. Purchase records are history and stay.
    pub fn delete_user(&self, user_id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let exists: Option<String> = tx
                .query_row("SELECT id FROM users WHERE id = ?1", [user_id], |row| {
                    row.get(0)
                })
                .optional()?;
            if exists.is_none() {
                return Err(Error::NotFound("user"));
            }

            for table in ["cart_items", "wishlist_items", "offers", "reviews", "product_images"] {
                tx.execute(
                    &format!(
                        "DELETE FROM {table} WHERE product_id IN \
                         (SELECT id FROM products WHERE owner_id = ?1)"
                    ),
                    [user_id],
                )?;
            }

            tx.execute("DELETE FROM cart_items WHERE user_id = ?1", [user_id])?;
            tx.execute("DELETE FROM wishlist_items WHERE user_id = ?1", [user_id])?;
            tx.execute("DELETE FROM offers WHERE buyer_id = ?1", [user_id])?;
            tx.execute("DELETE FROM reviews WHERE reviewer_id = ?1", [user_id])?;
            tx.execute(
                "DELETE FROM messages WHERE sender_id = ?1 OR recipient_id = ?1",
                [user_id],
            )?;
            // Remaining third-party conversations about the user's listings
            // survive, just unlinked.
            tx.execute(
                "UPDATE messages SET product_id = NULL WHERE product_id IN \
                 (SELECT id FROM products WHERE owner_id = ?1)",
                [user_id],
            )?;
            tx.execute("DELETE FROM notifications WHERE user_id = ?1", [user_id])?;
            tx.execute("DELETE FROM products WHERE owner_id = ?1", [user_id])?;
            tx.execute("DELETE FROM users WHERE id = ?1", [user_id])?;

            tx.commit()?;
            Ok(())
        })
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    query_user(conn, "username", username)
}

fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>> {
    query_user(conn, "email", email)
}

pub(crate) fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, username, email, password, total_sales, total_purchases, created_at \
         FROM users WHERE {column} = ?1"
    ))?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                total_sales: row.get(4)?,
                total_purchases: row.get(5)?,
                created_at: row.get(6)?,
            })
        })
        .optional()?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use crate::Error;

    #[test]
    fn duplicate_username_and_email_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "alice", "alice@example.com", "hash").unwrap();

        let err = db.create_user("u2", "alice", "other@example.com", "hash").unwrap_err();
        assert!(matches!(err, Error::UsernameTaken));

        let err = db.create_user("u2", "bob", "alice@example.com", "hash").unwrap_err();
        assert!(matches!(err, Error::EmailTaken));
    }

    #[test]
    fn update_profile_allows_own_values() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "alice", "alice@example.com", "hash").unwrap();

        // Re-submitting the current username with a new email is fine.
        db.update_profile("u1", "alice", "new@example.com").unwrap();
        let user = db.get_user_by_id("u1").unwrap().unwrap();
        assert_eq!(user.email, "new@example.com");
    }
}
