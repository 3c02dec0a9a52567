//! Entry point tying relay storage, organization options and trust
//! evaluation together.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::config::Settings;
use crate::org::{
    OptionStorage, OptionTrustListResolver, Organization, TrustList, TrustListResolver,
    TrustedRelay,
};
use crate::relay::{RelayError, RelayLookup, RelayRecord, RelayResult, RelayStorage};
use crate::trust::TrustEvaluator;

/// Relay registry backed by a single `SQLite` database.
///
/// # Example
///
/// ```no_run
/// use relay_trust::config::Settings;
/// use relay_trust::org::Organization;
/// use relay_trust::RelayRegistry;
///
/// let registry = RelayRegistry::open(&Settings::default())?;
/// let org = Organization::new(1, "acme");
/// let allowed = registry.has_org_access("relay-1", &org)?;
/// # Ok::<(), relay_trust::relay::RelayError>(())
/// ```
pub struct RelayRegistry {
    relays: RelayStorage,
    options: OptionStorage,
}

impl RelayRegistry {
    /// Opens the registry at the configured database path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database directory or tables cannot be
    /// created.
    pub fn open(settings: &Settings) -> RelayResult<Self> {
        let path = &settings.storage.database_path;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    RelayError::Storage(format!("Failed to create data directory: {e}"))
                })?;
            }
        }

        Ok(Self {
            relays: RelayStorage::new(path)?,
            options: OptionStorage::new(path)?,
        })
    }

    /// Creates a registry with in-memory storage for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the databases cannot be initialized.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn in_memory() -> RelayResult<Self> {
        Ok(Self {
            relays: RelayStorage::in_memory()?,
            options: OptionStorage::in_memory()?,
        })
    }

    /// Returns the relay storage.
    #[must_use]
    pub const fn relays(&self) -> &RelayStorage {
        &self.relays
    }

    /// Returns the organization option storage.
    #[must_use]
    pub const fn options(&self) -> &OptionStorage {
        &self.options
    }

    /// Registers a relay now. See [`RelayStorage::register`].
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid, conflicts with the stored
    /// key, or storage fails.
    pub fn register(
        &self,
        relay_id: &str,
        public_key: &str,
        is_internal: bool,
    ) -> RelayResult<RelayRecord> {
        self.register_at(relay_id, public_key, is_internal, Utc::now())
    }

    /// Registers a relay at an explicit time.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid, conflicts with the stored
    /// key, or storage fails.
    pub fn register_at(
        &self,
        relay_id: &str,
        public_key: &str,
        is_internal: bool,
        now: DateTime<Utc>,
    ) -> RelayResult<RelayRecord> {
        self.relays.register(relay_id, public_key, is_internal, now)
    }

    /// Records a heartbeat from a relay now.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::NotFound`] for an unknown relay, or a storage
    /// error.
    pub fn heartbeat(&self, relay_id: &str) -> RelayResult<RelayRecord> {
        self.relays.heartbeat(relay_id, Utc::now())
    }

    /// Retrieves a relay by id.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub fn get(&self, relay_id: &str) -> RelayResult<Option<RelayRecord>> {
        self.relays.get(relay_id)
    }

    /// Replaces an organization's trusted-relay list.
    ///
    /// # Errors
    ///
    /// Returns an error if any key is invalid or storage fails.
    pub fn set_trusted_relays(
        &self,
        org: &Organization,
        relays: &[TrustedRelay],
    ) -> RelayResult<()> {
        crate::org::set_trusted_relays(&self.options, org, relays)
    }

    /// Returns an organization's trusted-relay list.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails or the stored value is not a list.
    pub fn trusted_relays(&self, org: &Organization) -> RelayResult<TrustList> {
        OptionTrustListResolver::new(&self.options).trusted_relays(org)
    }

    /// Returns an evaluator reading trust lists from this registry.
    #[must_use]
    pub const fn evaluator(&self) -> TrustEvaluator<OptionTrustListResolver<&OptionStorage>> {
        TrustEvaluator::new(OptionTrustListResolver::new(&self.options))
    }

    /// Returns whether the relay `relay_id` is authorized for `org`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::NotFound`] for an unknown relay, plus any error
    /// from [`TrustEvaluator::has_org_access`].
    pub fn has_org_access(&self, relay_id: &str, org: &Organization) -> RelayResult<bool> {
        let record = self
            .relays
            .get(relay_id)?
            .ok_or_else(|| RelayError::NotFound(relay_id.to_string()))?;
        self.evaluator().has_org_access(&record, org)
    }
}

impl RelayLookup for RelayRegistry {
    fn for_keys(&self, keys: &HashSet<String>) -> RelayResult<Vec<RelayRecord>> {
        self.relays.for_keys(keys)
    }
}
