//! v0002 -- Businesses owned by a `business` user.

use crate::migrations::Migration;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS businesses (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id   INTEGER NOT NULL,             -- FK -> users(id)
    name       TEXT NOT NULL,
    address    TEXT,
    phone      TEXT,
    created_at TEXT NOT NULL,

    FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_businesses_owner ON businesses(owner_id);
"#;

const DOWN_SQL: &str = r#"
DROP INDEX IF EXISTS idx_businesses_owner;
DROP TABLE IF EXISTS businesses;
"#;

pub fn migration() -> Migration {
    Migration::sql("0002", "create businesses table", UP_SQL, DOWN_SQL)
}
