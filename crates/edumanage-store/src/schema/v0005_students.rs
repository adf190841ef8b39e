//! v0005 -- Student enrolments.
//!
//! A student belongs to one business and may be attached to a package and a
//! teacher.  Deleting either of those detaches the student instead of
//! removing it.

use crate::migrations::Migration;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL UNIQUE,     -- FK -> users(id)
    business_id INTEGER NOT NULL,            -- FK -> businesses(id)
    package_id  INTEGER,                     -- nullable FK -> packages(id)
    teacher_id  INTEGER,                     -- nullable FK -> teachers(id)
    enrolled_at TEXT NOT NULL,

    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (business_id) REFERENCES businesses(id) ON DELETE CASCADE,
    FOREIGN KEY (package_id) REFERENCES packages(id) ON DELETE SET NULL,
    FOREIGN KEY (teacher_id) REFERENCES teachers(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_students_business ON students(business_id);
CREATE INDEX IF NOT EXISTS idx_students_teacher ON students(teacher_id);
"#;

const DOWN_SQL: &str = r#"
DROP INDEX IF EXISTS idx_students_teacher;
DROP INDEX IF EXISTS idx_students_business;
DROP TABLE IF EXISTS students;
"#;

pub fn migration() -> Migration {
    Migration::sql("0005", "create students table", UP_SQL, DOWN_SQL)
}
