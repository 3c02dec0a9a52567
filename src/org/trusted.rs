//! Per-organization trusted-relay lists.
//!
//! The list lives in the organization option [`TRUSTED_RELAYS_OPTION`] as
//! a JSON array. Each entry is either `null`, which is a valid placeholder,
//! or an object that may carry a `public_key` string among other fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::options::OptionStore;
use super::types::Organization;
use crate::keys::{NostrKeyCodec, PublicKeyCodec};
use crate::relay::{RelayError, RelayResult};

/// Option key holding an organization's trusted relays.
pub const TRUSTED_RELAYS_OPTION: &str = "trusted-relays";

/// A trusted relay as written by organization administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedRelay {
    /// Public key of the trusted relay.
    pub public_key: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TrustedRelay {
    /// Creates an entry for `public_key` with no name or description.
    #[must_use]
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            name: None,
            description: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A resolved trusted-relay list, in configured order.
///
/// Entries are kept as raw JSON: entries that are `null`, not objects, or
/// lack a `public_key` are never an error, they simply never match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustList {
    entries: Vec<Value>,
}

impl TrustList {
    /// Creates a list from raw entries.
    #[must_use]
    pub const fn new(entries: Vec<Value>) -> Self {
        Self { entries }
    }

    /// Builds a list from an option value; an unset option is empty.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidTrustList`] if the value is set but is
    /// not a JSON array.
    pub fn from_option(value: Option<Value>) -> RelayResult<Self> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::Array(entries)) => Ok(Self::new(entries)),
            Some(other) => Err(RelayError::InvalidTrustList(format!(
                "expected an array, found {other}"
            ))),
        }
    }

    /// Returns the raw entries in configured order.
    #[must_use]
    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    /// Returns `true` if the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries, `null` placeholders included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Resolves an organization's trusted-relay list.
pub trait TrustListResolver {
    /// Returns the organization's trusted relays; empty when unset.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the configuration cannot be read, or
    /// [`RelayError::InvalidTrustList`] if the stored value is not a list.
    fn trusted_relays(&self, org: &Organization) -> RelayResult<TrustList>;
}

impl<R: TrustListResolver + ?Sized> TrustListResolver for &R {
    fn trusted_relays(&self, org: &Organization) -> RelayResult<TrustList> {
        (**self).trusted_relays(org)
    }
}

/// [`TrustListResolver`] reading the [`TRUSTED_RELAYS_OPTION`] option.
#[derive(Debug)]
pub struct OptionTrustListResolver<S> {
    store: S,
}

impl<S: OptionStore> OptionTrustListResolver<S> {
    /// Creates a resolver backed by `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: OptionStore> TrustListResolver for OptionTrustListResolver<S> {
    fn trusted_relays(&self, org: &Organization) -> RelayResult<TrustList> {
        let value = self.store.get_option(org, TRUSTED_RELAYS_OPTION)?;
        let list = TrustList::from_option(value)?;
        debug!(org = %org.slug, entries = list.len(), "resolved trusted relays");
        Ok(list)
    }
}

/// Replaces an organization's trusted-relay list.
///
/// Every key is validated and stored in canonical form, so relays whose
/// keys were configured as `npub` still match by exact comparison.
///
/// # Errors
///
/// Returns [`RelayError::InvalidKeyFormat`] for the first invalid key (in
/// which case nothing is written), or a storage error.
pub fn set_trusted_relays<S: OptionStore + ?Sized>(
    store: &S,
    org: &Organization,
    relays: &[TrustedRelay],
) -> RelayResult<()> {
    let canonical = relays
        .iter()
        .map(|relay| -> RelayResult<TrustedRelay> {
            Ok(TrustedRelay {
                public_key: NostrKeyCodec.canonicalize(&relay.public_key)?,
                ..relay.clone()
            })
        })
        .collect::<RelayResult<Vec<_>>>()?;

    let value = serde_json::to_value(&canonical)?;
    store.set_option(org, TRUSTED_RELAYS_OPTION, &value)?;
    debug!(org = %org.slug, entries = canonical.len(), "updated trusted relays");
    Ok(())
}
