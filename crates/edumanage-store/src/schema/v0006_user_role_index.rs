use crate::migrations::Migration;

const UP_SQL: &str = r#"
CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);
"#;

const DOWN_SQL: &str = r#"
DROP INDEX IF EXISTS idx_users_role;
"#;

pub fn migration() -> Migration {
    Migration::sql("0006", "index users by role", UP_SQL, DOWN_SQL)
}
