use rusqlite::Connection;
use uuid::Uuid;

use crate::models::NotificationRow;
use crate::queries::OptionalExt;
use crate::{Database, Error, Result};

/// Emit a one-way advisory to a user. Free function over a connection so the
/// write joins whatever transaction the caller has open; persistence failure
/// is the only error path and always propagates. No dedup, no rate limiting.
pub fn insert_notification(
    conn: &Connection,
    user_id: &str,
    title: &str,
    body: &str,
    kind: &str,
    link: Option<&str>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO notifications (id, user_id, title, body, kind, link) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![Uuid::new_v4().to_string(), user_id, title, body, kind, link],
    )?;
    Ok(())
}

impl Database {
    pub fn notifications_for_user(&self, user_id: &str) -> Result<Vec<NotificationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, title, body, kind, link, is_read, created_at \
                 FROM notifications WHERE user_id = ?1 \
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map([user_id], map_notification)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Mark one notification read. Only the recipient may do this. Returns
    /// the navigation link, if any, so the caller can redirect.
    pub fn mark_notification_read(
        &self,
        user_id: &str,
        notification_id: &str,
    ) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let row: Option<(String, Option<String>)> = conn
                .query_row(
                    "SELECT user_id, link FROM notifications WHERE id = ?1",
                    [notification_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let (owner, link) = row.ok_or(Error::NotFound("notification"))?;
            if owner != user_id {
                return Err(Error::NotOwner);
            }

            conn.execute(
                "UPDATE notifications SET is_read = 1 WHERE id = ?1",
                [notification_id],
            )?;
            Ok(link)
        })
    }

    /// Returns how many notifications were flipped to read.
    pub fn mark_all_notifications_read(&self, user_id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE notifications SET is_read = 1 WHERE user_id = ?1 AND is_read = 0",
                [user_id],
            )?;
            Ok(changed)
        })
    }
}

fn map_notification(row: &rusqlite::Row<'_>) -> rusqlite::Result<NotificationRow> {
    Ok(NotificationRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        body: row.get(3)?,
        kind: row.get(4)?,
        link: row.get(5)?,
        is_read: row.get(6)?,
        created_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::insert_notification;
    use crate::{Database, Error};

    #[test]
    fn emit_and_mark_read() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "alice", "alice@example.com", "hash").unwrap();
        db.create_user("u2", "bob", "bob@example.com", "hash").unwrap();

        db.with_conn(|conn| {
            insert_notification(conn, "u1", "Welcome", "Hello!", "info", Some("/dashboard"))
        })
        .unwrap();

        let rows = db.notifications_for_user("u1").unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_read);

        // Someone else's notification cannot be marked.
        let err = db.mark_notification_read("u2", &rows[0].id).unwrap_err();
        assert!(matches!(err, Error::NotOwner));

        let link = db.mark_notification_read("u1", &rows[0].id).unwrap();
        assert_eq!(link.as_deref(), Some("/dashboard"));
        assert!(db.notifications_for_user("u1").unwrap()[0].is_read);
    }

    #[test]
    fn mark_all_counts_unread_only() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "alice", "alice@example.com", "hash").unwrap();
        db.with_conn(|conn| {
            insert_notification(conn, "u1", "A", "a", "info", None)?;
            insert_notification(conn, "u1", "B", "b", "info", None)
        })
        .unwrap();

        assert_eq!(db.mark_all_notifications_read("u1").unwrap(), 2);
        assert_eq!(db.mark_all_notifications_read("u1").unwrap(), 0);
    }
}
