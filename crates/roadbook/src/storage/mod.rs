//! Storage layer for roadbook.
//!
//! This module provides `SQLite`-based persistence for the four record kinds
//! (customers, products, drivers, deliveries). Records are schemaless JSON
//! documents; the store only owns their identity and timestamps, which it
//! exposes as the `$id`, `$createdAt` and `$updatedAt` fields.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Kinds of record the store manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// A customer that orders deliveries.
    Customer,
    /// A product that can be delivered.
    Product,
    /// A driver deliveries are assigned to.
    Driver,
    /// A delivery order.
    Delivery,
}

impl RecordKind {
    /// Every record kind.
    pub const ALL: [Self; 4] = [Self::Customer, Self::Product, Self::Driver, Self::Delivery];

    /// The label stored in the `kind` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Product => "product",
            Self::Driver => "driver",
            Self::Delivery => "delivery",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create/update/list/delete access to stored records.
///
/// Documents returned by the store always carry `$id`, `$createdAt` and
/// `$updatedAt`. Caller-supplied fields starting with `$` are ignored on
/// write.
pub trait RecordStore {
    /// Store a new record and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a JSON object or the write fails.
    fn create(&self, kind: RecordKind, payload: &Value) -> Result<String>;

    /// Merge the top-level fields of `patch` into an existing record.
    ///
    /// Returns `false` if no such record exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch is not a JSON object or the write fails.
    fn update(&self, kind: RecordKind, id: &str, patch: &Value) -> Result<bool>;

    /// Delete a record. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn delete(&self, kind: RecordKind, id: &str) -> Result<bool>;

    /// Fetch a single record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get(&self, kind: RecordKind, id: &str) -> Result<Option<Value>>;

    /// List all records of a kind, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list(&self, kind: RecordKind) -> Result<Vec<Value>>;
}

/// `SQLite` record store.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Count records of a kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self, kind: RecordKind) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE kind = ?1",
            [kind.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if a count query fails or the database file can no
    /// longer be read.
    pub fn stats(&self) -> Result<StorageStats> {
        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path)?.len()
        };

        Ok(StorageStats {
            customers: self.count(RecordKind::Customer)?,
            products: self.count(RecordKind::Product)?,
            drivers: self.count(RecordKind::Driver)?,
            deliveries: self.count(RecordKind::Delivery)?,
            db_size_bytes,
        })
    }

    fn now() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Rebuild the public document from a stored row.
    fn document(id: String, payload: &str, created_at: String, updated_at: String) -> Result<Value> {
        let mut body: Map<String, Value> = serde_json::from_str(payload)?;
        body.insert("$id".to_string(), Value::String(id));
        body.insert("$createdAt".to_string(), Value::String(created_at));
        body.insert("$updatedAt".to_string(), Value::String(updated_at));
        Ok(Value::Object(body))
    }
}

/// Copy the caller-owned fields of a payload, dropping `$`-prefixed ones.
fn user_fields(payload: &Value) -> Result<Map<String, Value>> {
    let obj = payload
        .as_object()
        .ok_or_else(|| Error::invalid_payload("expected a JSON object"))?;
    Ok(obj
        .iter()
        .filter(|(key, _)| !key.starts_with('$'))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect())
}

impl RecordStore for Storage {
    fn create(&self, kind: RecordKind, payload: &Value) -> Result<String> {
        let body = user_fields(payload)?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        let now = Self::now();

        self.conn.execute(
            r"
            INSERT INTO records (id, kind, payload, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ",
            params![id, kind.as_str(), serde_json::to_string(&body)?, now],
        )?;

        debug!("Created {} {}", kind, id);
        Ok(id)
    }

    fn update(&self, kind: RecordKind, id: &str, patch: &Value) -> Result<bool> {
        let patch = user_fields(patch)?;

        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM records WHERE kind = ?1 AND id = ?2",
                params![kind.as_str(), id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(stored) = stored else {
            return Ok(false);
        };

        let mut body: Map<String, Value> = serde_json::from_str(&stored)?;
        body.extend(patch);

        let affected = self.conn.execute(
            "UPDATE records SET payload = ?1, updated_at = ?2 WHERE kind = ?3 AND id = ?4",
            params![serde_json::to_string(&body)?, Self::now(), kind.as_str(), id],
        )?;

        debug!("Updated {} {}", kind, id);
        Ok(affected > 0)
    }

    fn delete(&self, kind: RecordKind, id: &str) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM records WHERE kind = ?1 AND id = ?2",
            params![kind.as_str(), id],
        )?;
        if affected > 0 {
            info!("Deleted {} {}", kind, id);
        }
        Ok(affected > 0)
    }

    fn get(&self, kind: RecordKind, id: &str) -> Result<Option<Value>> {
        let row: Option<(String, String, String, String)> = self
            .conn
            .query_row(
                r"
                SELECT id, payload, created_at, updated_at
                FROM records WHERE kind = ?1 AND id = ?2
                ",
                params![kind.as_str(), id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        row.map(|(id, payload, created, updated)| Self::document(id, &payload, created, updated))
            .transpose()
    }

    fn list(&self, kind: RecordKind) -> Result<Vec<Value>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, payload, created_at, updated_at
            FROM records WHERE kind = ?1
            ORDER BY created_at ASC, seq ASC
            ",
        )?;

        let rows = stmt
            .query_map([kind.as_str()], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<std::result::Result<Vec<(String, String, String, String)>, _>>()?;

        rows.into_iter()
            .map(|(id, payload, created, updated)| Self::document(id, &payload, created, updated))
            .collect()
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Number of customer records.
    pub customers: i64,
    /// Number of product records.
    pub products: i64,
    /// Number of driver records.
    pub drivers: i64,
    /// Number of delivery records.
    pub deliveries: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
