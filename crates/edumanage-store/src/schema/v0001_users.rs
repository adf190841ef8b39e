//! v0001 -- Users.
//!
//! Every account in the system.  The `role` column drives the role-based
//! access checks in the API layer.

use crate::migrations::Migration;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    full_name     TEXT NOT NULL,
    role          TEXT NOT NULL
                  CHECK (role IN ('admin', 'business', 'teacher', 'student')),
    created_at    TEXT NOT NULL,              -- RFC-3339
    updated_at    TEXT NOT NULL
);
"#;

const DOWN_SQL: &str = r#"
DROP TABLE IF EXISTS users;
"#;

pub fn migration() -> Migration {
    Migration::sql("0001", "create users table", UP_SQL, DOWN_SQL)
}
