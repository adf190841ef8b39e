//! v0003 -- Packages (priced course bundles) sold by a business.

use crate::migrations::Migration;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS packages (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    business_id   INTEGER NOT NULL,          -- FK -> businesses(id)
    name          TEXT NOT NULL,
    description   TEXT,
    price_cents   INTEGER NOT NULL CHECK (price_cents >= 0),
    duration_days INTEGER NOT NULL CHECK (duration_days > 0),
    created_at    TEXT NOT NULL,

    FOREIGN KEY (business_id) REFERENCES businesses(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_packages_business ON packages(business_id);
"#;

const DOWN_SQL: &str = r#"
DROP INDEX IF EXISTS idx_packages_business;
DROP TABLE IF EXISTS packages;
"#;

pub fn migration() -> Migration {
    Migration::sql("0003", "create packages table", UP_SQL, DOWN_SQL)
}
