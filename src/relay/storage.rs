//! `SQLite` storage for relay records.
//!
//! Timestamps are stored as Unix milliseconds. Public keys are stored in
//! canonical form, so a lookup by canonical key is a plain equality match.

// SQLite operations need to hold the lock for the duration of the operation.
#![allow(clippy::significant_drop_tightening)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::error::{RelayError, RelayResult};
use super::lookup::RelayLookup;
use super::types::RelayRecord;
use crate::keys::{NostrKeyCodec, PublicKeyCodec};

/// Keys per `IN (...)` query, well under `SQLite`'s bound-parameter limit.
const LOOKUP_CHUNK_SIZE: usize = 500;

const SELECT_COLUMNS: &str = "relay_id, public_key, first_seen, last_seen, is_internal";

/// Raw column values of one `relays` row.
type RelayRow = (String, String, i64, i64, bool);

/// `SQLite`-based storage for relay records.
///
/// Thread-safe wrapper around a `SQLite` connection.
pub struct RelayStorage {
    conn: Mutex<Connection>,
}

impl RelayStorage {
    /// Opens (or creates) relay storage at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or initialized.
    pub fn new(path: &Path) -> RelayResult<Self> {
        let conn = Connection::open(path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.initialize_schema()?;
        Ok(storage)
    }

    /// Creates an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn in_memory() -> RelayResult<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.initialize_schema()?;
        Ok(storage)
    }

    fn lock(&self) -> RelayResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RelayError::Storage(format!("Failed to acquire database lock: {e}")))
    }

    fn initialize_schema(&self) -> RelayResult<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS relays (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                relay_id TEXT NOT NULL UNIQUE,
                public_key TEXT NOT NULL,
                first_seen INTEGER NOT NULL,
                last_seen INTEGER NOT NULL,
                is_internal INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS relays_public_key ON relays(public_key);
            ",
        )?;

        Ok(())
    }

    /// Registers a relay, or records renewed contact from a known one.
    ///
    /// The key is validated and stored in canonical form. A relay that is
    /// already known with the same key is treated as a heartbeat at `now`;
    /// its internal flag is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidKeyFormat`] if `public_key` does not
    /// parse, [`RelayError::KeyConflict`] if the relay is already known
    /// with a different key, or a storage error.
    pub fn register(
        &self,
        relay_id: &str,
        public_key: &str,
        is_internal: bool,
        now: DateTime<Utc>,
    ) -> RelayResult<RelayRecord> {
        let canonical = NostrKeyCodec.canonicalize(public_key)?;
        let conn = self.lock()?;

        if let Some(existing) = query_relay(&conn, relay_id)? {
            if existing.public_key() != canonical {
                return Err(RelayError::KeyConflict {
                    relay_id: relay_id.to_string(),
                });
            }
            touch_relay(&conn, relay_id, now)?;
            debug!(relay_id, "known relay re-registered");
            return query_relay(&conn, relay_id)?
                .ok_or_else(|| RelayError::NotFound(relay_id.to_string()));
        }

        let record = RelayRecord::new(relay_id, canonical, is_internal, now);
        conn.execute(
            r"
            INSERT INTO relays (relay_id, public_key, first_seen, last_seen, is_internal)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                record.relay_id(),
                record.public_key(),
                record.first_seen().timestamp_millis(),
                record.last_seen().timestamp_millis(),
                record.is_internal(),
            ],
        )?;

        info!(relay_id, is_internal, "registered relay");
        Ok(record)
    }

    /// Records contact with a relay at `at` and returns the updated record.
    ///
    /// `last_seen` only moves forward.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::NotFound`] if the relay is unknown, or a
    /// storage error.
    pub fn heartbeat(&self, relay_id: &str, at: DateTime<Utc>) -> RelayResult<RelayRecord> {
        let conn = self.lock()?;

        if touch_relay(&conn, relay_id, at)? == 0 {
            return Err(RelayError::NotFound(relay_id.to_string()));
        }

        query_relay(&conn, relay_id)?.ok_or_else(|| RelayError::NotFound(relay_id.to_string()))
    }

    /// Retrieves a relay by its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the stored row
    /// is corrupt.
    pub fn get(&self, relay_id: &str) -> RelayResult<Option<RelayRecord>> {
        let conn = self.lock()?;
        query_relay(&conn, relay_id)
    }

    /// Inserts a record exactly as given, bypassing key validation.
    ///
    /// Used by tests to simulate rows that violate the key invariant.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn insert_unchecked(&self, record: &RelayRecord) -> RelayResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r"
            INSERT INTO relays (relay_id, public_key, first_seen, last_seen, is_internal)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                record.relay_id(),
                record.public_key(),
                record.first_seen().timestamp_millis(),
                record.last_seen().timestamp_millis(),
                record.is_internal(),
            ],
        )?;
        Ok(())
    }
}

impl RelayLookup for RelayStorage {
    fn for_keys(&self, keys: &HashSet<String>) -> RelayResult<Vec<RelayRecord>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.lock()?;
        let keys: Vec<&String> = keys.iter().collect();
        let mut records = Vec::new();

        for chunk in keys.chunks(LOOKUP_CHUNK_SIZE) {
            let placeholders = (1..=chunk.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql =
                format!("SELECT {SELECT_COLUMNS} FROM relays WHERE public_key IN ({placeholders})");

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(chunk.iter()), read_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            for row in rows {
                records.push(decode_row(row)?);
            }
        }

        debug!(requested = keys.len(), found = records.len(), "relay lookup by key");
        Ok(records)
    }
}

fn touch_relay(conn: &Connection, relay_id: &str, at: DateTime<Utc>) -> RelayResult<usize> {
    let rows = conn.execute(
        "UPDATE relays SET last_seen = MAX(last_seen, ?2) WHERE relay_id = ?1",
        params![relay_id, at.timestamp_millis()],
    )?;
    Ok(rows)
}

fn query_relay(conn: &Connection, relay_id: &str) -> RelayResult<Option<RelayRecord>> {
    conn.query_row(
        &format!("SELECT {SELECT_COLUMNS} FROM relays WHERE relay_id = ?1"),
        params![relay_id],
        read_row,
    )
    .optional()?
    .map(decode_row)
    .transpose()
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RelayRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn decode_row(
    (relay_id, public_key, first_seen, last_seen, is_internal): RelayRow,
) -> RelayResult<RelayRecord> {
    let first_seen = DateTime::from_timestamp_millis(first_seen).ok_or_else(|| {
        RelayError::InvalidData(format!("Invalid first_seen for relay {relay_id}"))
    })?;
    let last_seen = DateTime::from_timestamp_millis(last_seen).ok_or_else(|| {
        RelayError::InvalidData(format!("Invalid last_seen for relay {relay_id}"))
    })?;

    if first_seen > last_seen {
        return Err(RelayError::InvalidData(format!(
            "Relay {relay_id} has first_seen after last_seen"
        )));
    }

    Ok(RelayRecord::from_parts(
        relay_id,
        public_key,
        first_seen,
        last_seen,
        is_internal,
    ))
}
