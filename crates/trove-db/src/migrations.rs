use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              TEXT PRIMARY KEY,
            username        TEXT NOT NULL UNIQUE,
            email           TEXT NOT NULL UNIQUE,
            password        TEXT NOT NULL,
            total_sales     INTEGER NOT NULL DEFAULT 0,
            total_purchases INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS products (
            id          TEXT PRIMARY KEY,
            owner_id    TEXT NOT NULL REFERENCES users(id),
            title       TEXT NOT NULL,
            description TEXT NOT NULL,
            category    TEXT NOT NULL,
            condition   TEXT NOT NULL DEFAULT '',
            price       REAL NOT NULL,
            location    TEXT NOT NULL DEFAULT '',
            image_url   TEXT NOT NULL DEFAULT '',
            is_featured INTEGER NOT NULL DEFAULT 0,
            views       INTEGER NOT NULL DEFAULT 0,
            is_sold     INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_products_owner
            ON products(owner_id);
        CREATE INDEX IF NOT EXISTS idx_products_category
            ON products(category, is_sold);

        CREATE TABLE IF NOT EXISTS product_images (
            id          TEXT PRIMARY KEY,
            product_id  TEXT NOT NULL REFERENCES products(id),
            image_url   TEXT NOT NULL,
            order_index INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS cart_items (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            product_id  TEXT NOT NULL REFERENCES products(id),
            added_at    TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(user_id, product_id)
        );

        CREATE TABLE IF NOT EXISTS wishlist_items (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            product_id  TEXT NOT NULL REFERENCES products(id),
            added_at    TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(user_id, product_id)
        );

        CREATE TABLE IF NOT EXISTS offers (
            id          TEXT PRIMARY KEY,
            product_id  TEXT NOT NULL REFERENCES products(id),
            buyer_id    TEXT NOT NULL REFERENCES users(id),
            amount      REAL NOT NULL,
            message     TEXT NOT NULL DEFAULT '',
            status      TEXT NOT NULL DEFAULT 'pending'
                        CHECK (status IN ('pending', 'accepted', 'rejected', 'withdrawn')),
            expires_at  TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_offers_product
            ON offers(product_id, created_at);

        -- Immutable sales ledger. Deliberately no foreign keys: purchase
        -- records outlive deleted products and deleted accounts.
        CREATE TABLE IF NOT EXISTS purchases (
            id           TEXT PRIMARY KEY,
            buyer_id     TEXT NOT NULL,
            product_id   TEXT NOT NULL,
            price_paid   REAL NOT NULL,
            purchased_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_purchases_buyer
            ON purchases(buyer_id, purchased_at);
        CREATE INDEX IF NOT EXISTS idx_purchases_product
            ON purchases(product_id);

        CREATE TABLE IF NOT EXISTS reviews (
            id          TEXT PRIMARY KEY,
            product_id  TEXT NOT NULL REFERENCES products(id),
            reviewer_id TEXT NOT NULL REFERENCES users(id),
            rating      INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            comment     TEXT NOT NULL DEFAULT '',
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(reviewer_id, product_id)
        );

        CREATE INDEX IF NOT EXISTS idx_reviews_product
            ON reviews(product_id);

        CREATE TABLE IF NOT EXISTS messages (
            id           TEXT PRIMARY KEY,
            sender_id    TEXT NOT NULL REFERENCES users(id),
            recipient_id TEXT NOT NULL REFERENCES users(id),
            product_id   TEXT REFERENCES products(id),
            subject      TEXT NOT NULL DEFAULT '',
            body         TEXT NOT NULL,
            is_read      INTEGER NOT NULL DEFAULT 0,
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_recipient
            ON messages(recipient_id, created_at);

        CREATE TABLE IF NOT EXISTS notifications (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            title       TEXT NOT NULL,
            body        TEXT NOT NULL,
            kind        TEXT NOT NULL DEFAULT 'info',
            link        TEXT,
            is_read     INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_notifications_user
            ON notifications(user_id, is_read, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
