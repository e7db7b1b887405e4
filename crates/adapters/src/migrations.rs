//! Ordered schema migrations for the listing store. Entry `n` upgrades a
//! database at `user_version = n` to `n + 1`.

pub const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS items (
        id          TEXT PRIMARY KEY NOT NULL,
        title       TEXT NOT NULL,
        description TEXT,
        price       INTEGER NOT NULL CHECK (price >= 0),
        images      TEXT,
        status      TEXT NOT NULL DEFAULT 'active',
        seller_id   TEXT NOT NULL,
        created_at  TEXT NOT NULL
    );",
    "CREATE INDEX IF NOT EXISTS idx_items_status_created ON items (status, created_at DESC);
     CREATE INDEX IF NOT EXISTS idx_items_seller ON items (seller_id);",
];
