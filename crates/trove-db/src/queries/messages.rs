use uuid::Uuid;

use crate::models::MessageRow;
use crate::queries::OptionalExt;
use crate::queries::notifications::insert_notification;
use crate::{Database, Error, Result};

impl Database {
    /// Send a direct message, optionally tied to a listing. When no subject
    /// is given and a product is referenced, the subject defaults to an
    /// inquiry line about that product. The recipient is notified in the
    /// same transaction.
    pub fn send_message(
        &self,
        sender_id: &str,
        recipient_id: &str,
        product_id: Option<&str>,
        subject: Option<&str>,
        body: &str,
    ) -> Result<MessageRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let sender_username: String = tx
                .query_row("SELECT username FROM users WHERE id = ?1", [sender_id], |row| {
                    row.get(0)
                })
                .optional()?
                .ok_or(Error::NotFound("user"))?;
            let recipient_username: String = tx
                .query_row("SELECT username FROM users WHERE id = ?1", [recipient_id], |row| {
                    row.get(0)
                })
                .optional()?
                .ok_or(Error::NotFound("user"))?;

            let product_title: Option<String> = match product_id {
                Some(pid) => Some(
                    tx.query_row("SELECT title FROM products WHERE id = ?1", [pid], |row| {
                        row.get(0)
                    })
                    .optional()?
                    .ok_or(Error::NotFound("product"))?,
                ),
                None => None,
            };

            let subject = match (subject, &product_title) {
                (Some(s), _) if !s.is_empty() => s.to_string(),
                (_, Some(title)) => format!("Inquiry about: {title}"),
                _ => String::new(),
            };

            let id = Uuid::new_v4().to_string();
            tx.execute(
                "INSERT INTO messages (id, sender_id, recipient_id, product_id, subject, body) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, sender_id, recipient_id, product_id, subject, body],
            )?;

            insert_notification(
                &tx,
                recipient_id,
                "New Message",
                &format!("{sender_username} sent you a message"),
                "info",
                Some("/messages"),
            )?;

            let message = MessageRow {
                id,
                sender_id: sender_id.to_string(),
                sender_username,
                recipient_id: recipient_id.to_string(),
                recipient_username,
                product_id: product_id.map(str::to_string),
                subject,
                body: body.to_string(),
                is_read: false,
                created_at: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            };
            tx.commit()?;
            Ok(message)
        })
    }

    /// Received and sent messages for a user, newest first.
    pub fn mailbox(&self, user_id: &str) -> Result<(Vec<MessageRow>, Vec<MessageRow>)> {
        self.with_conn(|conn| {
            let received = query_messages(conn, "m.recipient_id", user_id)?;
            let sent = query_messages(conn, "m.sender_id", user_id)?;
            Ok((received, sent))
        })
    }

    /// Only the recipient may mark a message read.
    pub fn mark_message_read(&self, user_id: &str, message_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            let recipient: Option<String> = conn
                .query_row(
                    "SELECT recipient_id FROM messages WHERE id = ?1",
                    [message_id],
                    |row| row.get(0),
                )
                .optional()?;

            match recipient {
                None => Err(Error::NotFound("message")),
                Some(r) if r != user_id => Err(Error::NotOwner),
                Some(_) => {
                    conn.execute("UPDATE messages SET is_read = 1 WHERE id = ?1", [message_id])?;
                    Ok(())
                }
            }
        })
    }
}

fn query_messages(
    conn: &rusqlite::Connection,
    column: &str,
    user_id: &str,
) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT m.id, m.sender_id, s.username, m.recipient_id, r.username, m.product_id, \
         m.subject, m.body, m.is_read, m.created_at \
         FROM messages m \
         JOIN users s ON m.sender_id = s.id \
         JOIN users r ON m.recipient_id = r.id \
         WHERE {column} = ?1 ORDER BY m.created_at DESC, m.rowid DESC"
    ))?;
    let rows = stmt
        .query_map([user_id], |row| {
            Ok(MessageRow {
                id: row.get(0)?,
                sender_id: row.get(1)?,
                sender_username: row.get(2)?,
                recipient_id: row.get(3)?,
                recipient_username: row.get(4)?,
                product_id: row.get(5)?,
                subject: row.get(6)?,
                body: row.get(7)?,
                is_read: row.get(8)?,
                created_at: row.get(9)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use crate::models::NewProduct;
    use crate::{Database, Error};

    #[test]
    fn message_defaults_subject_and_notifies() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("seller", "sally", "sally@example.com", "hash").unwrap();
        db.create_user("buyer", "bob", "bob@example.com", "hash").unwrap();
        let product_id = db
            .create_product(
                "seller",
                &NewProduct {
                    title: "Skis".into(),
                    description: "downhill skis".into(),
                    category: "Sports".into(),
                    condition: "Used".into(),
                    price: 60.0,
                    ..Default::default()
                },
            )
            .unwrap();

        let message = db
            .send_message("buyer", "seller", Some(&product_id), None, "Are these still available?")
            .unwrap();
        assert_eq!(message.subject, "Inquiry about: Skis");

        let (received, sent) = db.mailbox("seller").unwrap();
        assert_eq!(received.len(), 1);
        assert!(sent.is_empty());
        assert!(!received[0].is_read);

        let notes = db.notifications_for_user("seller").unwrap();
        assert_eq!(notes[0].title, "New Message");

        // Only the recipient can mark it read.
        let err = db.mark_message_read("buyer", &message.id).unwrap_err();
        assert!(matches!(err, Error::NotOwner));
        db.mark_message_read("seller", &message.id).unwrap();
        let (received, _) = db.mailbox("seller").unwrap();
        assert!(received[0].is_read);
    }
}
