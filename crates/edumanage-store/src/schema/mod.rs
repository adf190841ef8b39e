//! Application schema.
//!
//! One module per migration, named after its version.  To change the schema,
//! add a new `vNNNN_*` module with the next zero-padded version and register
//! it in [`migrations`].  Never edit a migration that has shipped.

pub mod v0001_users;
pub mod v0002_businesses;
pub mod v0003_packages;
pub mod v0004_teachers;
pub mod v0005_students;
pub mod v0006_user_role_index;

use crate::migrations::MigrationSet;

/// Every migration the application knows about.
pub fn migrations() -> MigrationSet {
    MigrationSet::builder()
        .add_migration(v0001_users::migration())
        .add_migration(v0002_businesses::migration())
        .add_migration(v0003_packages::migration())
        .add_migration(v0004_teachers::migration())
        .add_migration(v0005_students::migration())
        .add_migration(v0006_user_role_index::migration())
        .build()
}

#[cfg(test)]
mod tests {
    use rusqlite::{params, Connection};

    use super::*;
    use crate::migrations::{ledger, Migrator, Version};

    fn tables(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .unwrap();
        let rows = stmt.query_map([], |row| row.get(0)).unwrap();
        rows.collect::<Result<Vec<String>, _>>().unwrap()
    }

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        conn
    }

    #[test]
    fn test_versions_are_unique_and_padded() {
        let set = migrations();
        let mut versions: Vec<&str> = set.versions().into_iter().map(Version::as_str).collect();
        assert!(versions.iter().all(|v| v.len() == 4));

        versions.sort();
        versions.dedup();
        assert_eq!(versions.len(), set.len());
    }

    #[test]
    fn test_full_schema_applies() {
        let mut conn = open();
        Migrator::new(migrations()).run(&mut conn).unwrap();

        assert_eq!(
            tables(&conn),
            vec!["businesses", "migrations", "packages", "students", "teachers", "users"]
        );
    }

    #[test]
    fn test_full_rollback_leaves_only_ledger() {
        let mut conn = open();
        let migrator = Migrator::new(migrations());
        migrator.run(&mut conn).unwrap();

        migrator.rollback(&mut conn, &Version::from("0000")).unwrap();

        assert_eq!(tables(&conn), vec!["migrations"]);
        assert!(ledger::list_applied(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_rollback_to_businesses_keeps_owned_rows() {
        let mut conn = open();
        let migrator = Migrator::new(migrations());
        migrator.run(&mut conn).unwrap();

        conn.execute(
            "INSERT INTO users (email, password_hash, full_name, role, created_at, updated_at)
             VALUES (?1, 'x', 'Owner', 'business', ?2, ?2)",
            params!["owner@example.com", "2024-01-01T00:00:00Z"],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO businesses (owner_id, name, created_at) VALUES (1, 'Academy', ?1)",
            params!["2024-01-01T00:00:00Z"],
        )
        .unwrap();

        migrator.rollback(&mut conn, &Version::from("0002")).unwrap();

        assert_eq!(tables(&conn), vec!["businesses", "migrations", "users"]);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM businesses", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_role_check_rejects_unknown_role() {
        let mut conn = open();
        Migrator::new(migrations()).run(&mut conn).unwrap();

        let res = conn.execute(
            "INSERT INTO users (email, password_hash, full_name, role, created_at, updated_at)
             VALUES ('a@b.c', 'x', 'A', 'superuser', 'now', 'now')",
            [],
        );
        assert!(res.is_err());
    }
}
