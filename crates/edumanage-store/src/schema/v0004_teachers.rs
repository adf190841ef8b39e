//! v0004 -- Teacher profiles.  One per `teacher` user.

use crate::migrations::Migration;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS teachers (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id        INTEGER NOT NULL UNIQUE,  -- FK -> users(id)
    business_id    INTEGER NOT NULL,         -- FK -> businesses(id)
    specialization TEXT,
    created_at     TEXT NOT NULL,

    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (business_id) REFERENCES businesses(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_teachers_business ON teachers(business_id);
"#;

const DOWN_SQL: &str = r#"
DROP INDEX IF EXISTS idx_teachers_business;
DROP TABLE IF EXISTS teachers;
"#;

pub fn migration() -> Migration {
    Migration::sql("0004", "create teachers table", UP_SQL, DOWN_SQL)
}
