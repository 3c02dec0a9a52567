//! Organization option storage.
//!
//! Options are opaque JSON values keyed by organization and option name.
//! Only the trusted-relay option is interpreted by this crate.

// SQLite operations need to hold the lock for the duration of the operation.
#![allow(clippy::significant_drop_tightening)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::types::Organization;
use crate::relay::{RelayError, RelayResult};

/// Key-value option store scoped per organization.
pub trait OptionStore {
    /// Returns the value of option `key` for `org`, or `None` if unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_option(&self, org: &Organization, key: &str) -> RelayResult<Option<Value>>;

    /// Sets option `key` for `org`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn set_option(&self, org: &Organization, key: &str, value: &Value) -> RelayResult<()>;
}

impl<S: OptionStore + ?Sized> OptionStore for &S {
    fn get_option(&self, org: &Organization, key: &str) -> RelayResult<Option<Value>> {
        (**self).get_option(org, key)
    }

    fn set_option(&self, org: &Organization, key: &str, value: &Value) -> RelayResult<()> {
        (**self).set_option(org, key, value)
    }
}

/// `SQLite`-based organization option storage.
pub struct OptionStorage {
    conn: Mutex<Connection>,
}

impl OptionStorage {
    /// Opens (or creates) option storage at the given path.
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

    fn initialize_schema(&self) -> RelayResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RelayError::Storage(format!("Failed to acquire database lock: {e}")))?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS organization_options (
                organization_id INTEGER NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (organization_id, key)
            );
            ",
        )?;

        Ok(())
    }
}

impl OptionStore for OptionStorage {
    fn get_option(&self, org: &Organization, key: &str) -> RelayResult<Option<Value>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RelayError::Storage(format!("Failed to acquire database lock: {e}")))?;

        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM organization_options WHERE organization_id = ?1 AND key = ?2",
                params![org.id, key],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(|e| RelayError::InvalidData(format!("Invalid JSON in option {key}: {e}")))
    }

    fn set_option(&self, org: &Organization, key: &str, value: &Value) -> RelayResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RelayError::Storage(format!("Failed to acquire database lock: {e}")))?;

        let json = serde_json::to_string(value)?;
        conn.execute(
            r"
            INSERT INTO organization_options (organization_id, key, value)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(organization_id, key) DO UPDATE SET value = excluded.value
            ",
            params![org.id, key, json],
        )?;

        Ok(())
    }
}

/// In-process option store.
#[derive(Debug, Default)]
pub struct MemoryOptionStore {
    data: RwLock<HashMap<(i64, String), Value>>,
}

impl MemoryOptionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OptionStore for MemoryOptionStore {
    fn get_option(&self, org: &Organization, key: &str) -> RelayResult<Option<Value>> {
        let data = self
            .data
            .read()
            .map_err(|e| RelayError::Storage(e.to_string()))?;
        Ok(data.get(&(org.id, key.to_string())).cloned())
    }

    fn set_option(&self, org: &Organization, key: &str, value: &Value) -> RelayResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| RelayError::Storage(e.to_string()))?;
        data.insert((org.id, key.to_string()), value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn org(id: i64) -> Organization {
        Organization::new(id, format!("org-{id}"))
    }

    fn exercise_store(store: &dyn OptionStore) {
        assert!(store.get_option(&org(1), "missing").unwrap().is_none());

        store.set_option(&org(1), "color", &json!("blue")).unwrap();
        assert_eq!(store.get_option(&org(1), "color").unwrap(), Some(json!("blue")));

        store.set_option(&org(1), "color", &json!(["red"])).unwrap();
        assert_eq!(store.get_option(&org(1), "color").unwrap(), Some(json!(["red"])));

        assert!(
            store.get_option(&org(2), "color").unwrap().is_none(),
            "options are scoped per organization"
        );
    }

    #[test]
    fn sqlite_store_get_and_set() {
        let store = OptionStorage::in_memory().unwrap();
        exercise_store(&store);
    }

    #[test]
    fn memory_store_get_and_set() {
        let store = MemoryOptionStore::new();
        exercise_store(&store);
    }

    #[test]
    fn reference_forwards_to_store() {
        let store = MemoryOptionStore::new();
        let by_ref = &store;
        by_ref.set_option(&org(1), "k", &json!(1)).unwrap();
        assert_eq!(store.get_option(&org(1), "k").unwrap(), Some(json!(1)));
    }

    #[test]
    fn sqlite_store_rejects_corrupt_json() {
        let store = OptionStorage::in_memory().unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO organization_options (organization_id, key, value) VALUES (1, 'k', '{not json')",
                [],
            )
            .unwrap();
        }

        let result = store.get_option(&org(1), "k");
        assert!(matches!(result, Err(RelayError::InvalidData(_))));
    }
}
