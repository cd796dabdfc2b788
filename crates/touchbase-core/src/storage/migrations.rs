//! Database schema migrations for touchbase.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};
use tracing::{info, warn};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }
    if current_version < SCHEMA_VERSION {
        info!(from = current_version, to = SCHEMA_VERSION, "database migrated");
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: Initial schema (baseline).
///
/// The base tables are created by `ContactDb::migrate()` directly.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    set_schema_version(conn, 1)
}

/// Migration v2: per-contact reminder switch.
///
/// Contacts created before v2 keep their reminders on.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    let has_column = {
        let mut stmt = tx.prepare(
            "SELECT 1 FROM pragma_table_info('contacts') WHERE name = 'reminder'",
        )?;
        stmt.exists([])?
    };
    if !has_column {
        tx.execute_batch("ALTER TABLE contacts ADD COLUMN reminder INTEGER NOT NULL DEFAULT 1;")?;
    }
    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [2])?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v1_schema(conn: &Connection) {
        conn.execute_batch(
            "CREATE TABLE contacts (
                id              TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                birthday        TEXT,
                is_favorite     INTEGER NOT NULL DEFAULT 0,
                cadence_unit    TEXT NOT NULL,
                cadence_count   INTEGER NOT NULL,
                initial_contact TEXT NOT NULL,
                last_contact    TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );",
        )
        .unwrap();
    }

    #[test]
    fn test_incremental_migration() {
        let conn = Connection::open_in_memory().unwrap();
        v1_schema(&conn);
        create_schema_version_table(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        conn.execute(
            "INSERT INTO contacts VALUES
             ('a', 'Ann', NULL, 0, 'week', 1, '2024-01-01', '2024-01-01',
              '2024-01-01T00:00:00+00:00')",
            [],
        )
        .unwrap();

        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);
        let reminder: i64 = conn
            .query_row("SELECT reminder FROM contacts WHERE id = 'a'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(reminder, 1);
    }

    #[test]
    fn test_migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        v1_schema(&conn);
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
    }
}
