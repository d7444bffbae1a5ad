//! Schema upgrades.
//!
//! The base tables come from [`super::schema`]. Everything after that is a
//! numbered step; each step and its version stamp commit together, so an
//! interrupted upgrade leaves the database at the last finished step.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::error::{Error, Result};

use super::schema::SCHEMA_STATEMENTS;

/// Schema version this build writes.
pub const CURRENT_VERSION: i32 = 1;

/// Metadata key holding the applied version.
const VERSION_KEY: &str = "schema_version";

/// One upgrade step.
#[derive(Debug)]
struct Migration {
    version: i32,
    description: &'static str,
    sql: &'static str,
}

/// Upgrade steps, oldest first. The last entry's version is [`CURRENT_VERSION`].
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "index records by kind in listing order",
    sql: "CREATE INDEX IF NOT EXISTS idx_records_kind ON records(kind, created_at, seq)",
}];

/// Create the base tables and apply every step newer than the stored version.
///
/// # Errors
///
/// Returns an error if a statement fails, the stored version is unreadable,
/// or the database was written by a newer roadbook.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let version = schema_version(conn)?;
    if version > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    for step in MIGRATIONS.iter().filter(|m| m.version > version) {
        apply(conn, step)?;
    }
    Ok(())
}

/// Stored schema version; 0 before the first step has run.
fn schema_version(conn: &Connection) -> Result<i32> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    stored.map_or(Ok(0), |value| {
        value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        })
    })
}

fn apply(conn: &Connection, step: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(step.sql)
        .map_err(|e| Error::DatabaseMigration {
            message: format!("step {} ({}) failed: {e}", step.version, step.description),
        })?;
    tx.execute(
        "INSERT INTO metadata (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![VERSION_KEY, step.version.to_string()],
    )?;
    tx.commit()?;

    info!("Applied schema step {}: {}", step.version, step.description);
    Ok(())
}
