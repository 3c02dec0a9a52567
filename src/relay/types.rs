//! Types for relay records.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use nostr::PublicKey;

use crate::keys::{InvalidKeyFormat, NostrKeyCodec, PublicKeyCodec};

/// A known relay.
///
/// Records are created once per distinct relay on first registration and
/// afterwards only have their `last_seen` timestamp advanced by heartbeats.
///
/// The stored key is parsed lazily on first use and the outcome, success
/// or failure, is cached for the lifetime of the instance. The cache is a
/// [`OnceLock`], so concurrent first use from several threads parses once.
#[derive(Clone)]
pub struct RelayRecord {
    relay_id: String,
    public_key: String,
    first_seen: DateTime<Utc>,
    last_seen: DateTime<Utc>,
    is_internal: bool,
    parsed_key: OnceLock<Result<PublicKey, InvalidKeyFormat>>,
}

impl RelayRecord {
    /// Creates a record for a relay first seen at `now`.
    ///
    /// The key is not validated here; an unparseable key surfaces from
    /// [`Self::public_key_object`].
    #[must_use]
    pub fn new(
        relay_id: impl Into<String>,
        public_key: impl Into<String>,
        is_internal: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self::from_parts(relay_id.into(), public_key.into(), now, now, is_internal)
    }

    pub(crate) const fn from_parts(
        relay_id: String,
        public_key: String,
        first_seen: DateTime<Utc>,
        last_seen: DateTime<Utc>,
        is_internal: bool,
    ) -> Self {
        Self {
            relay_id,
            public_key,
            first_seen,
            last_seen,
            is_internal,
            parsed_key: OnceLock::new(),
        }
    }

    /// Returns the relay's unique identifier.
    #[must_use]
    pub fn relay_id(&self) -> &str {
        &self.relay_id
    }

    /// Returns the stored public key string.
    #[must_use]
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// When the relay first registered.
    #[must_use]
    pub const fn first_seen(&self) -> DateTime<Utc> {
        self.first_seen
    }

    /// When the relay was last heard from.
    #[must_use]
    pub const fn last_seen(&self) -> DateTime<Utc> {
        self.last_seen
    }

    /// Whether the relay is internal (trusted by every organization).
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        self.is_internal
    }

    /// Returns the parsed public key, parsing it on first call.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidKeyFormat`] if the stored key cannot be parsed. The
    /// failure is cached, so every call on the same record fails the same
    /// way.
    pub fn public_key_object(&self) -> Result<&PublicKey, InvalidKeyFormat> {
        self.parsed_key
            .get_or_init(|| NostrKeyCodec.parse(&self.public_key))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Returns the canonical string form of the relay's public key.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidKeyFormat`] if the stored key cannot be parsed.
    pub fn canonical_key(&self) -> Result<String, InvalidKeyFormat> {
        self.public_key_object()
            .map(|key| NostrKeyCodec.stringify(key))
    }

    /// Records contact with the relay at `at`.
    ///
    /// `last_seen` never moves backwards, which keeps
    /// `first_seen <= last_seen`.
    pub fn mark_seen(&mut self, at: DateTime<Utc>) {
        if at > self.last_seen {
            self.last_seen = at;
        }
    }
}

impl PartialEq for RelayRecord {
    fn eq(&self, other: &Self) -> bool {
        self.relay_id == other.relay_id
            && self.public_key == other.public_key
            && self.first_seen == other.first_seen
            && self.last_seen == other.last_seen
            && self.is_internal == other.is_internal
    }
}

impl Eq for RelayRecord {}

impl std::fmt::Debug for RelayRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayRecord")
            .field("relay_id", &self.relay_id)
            .field("public_key", &self.public_key)
            .field("first_seen", &self.first_seen)
            .field("last_seen", &self.last_seen)
            .field("is_internal", &self.is_internal)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use nostr::{Keys, ToBech32};

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn new_sets_both_timestamps() {
        let record = RelayRecord::new("relay-1", "key", false, now());
        assert_eq!(record.first_seen(), now());
        assert_eq!(record.last_seen(), now());
        assert!(!record.is_internal());
    }

    #[test]
    fn public_key_object_parses_valid_key() {
        let keys = Keys::generate();
        let record = RelayRecord::new("relay-1", keys.public_key().to_hex(), false, now());

        assert_eq!(record.public_key_object().unwrap(), &keys.public_key());
    }

    #[test]
    fn public_key_object_is_memoized() {
        let keys = Keys::generate();
        let record = RelayRecord::new("relay-1", keys.public_key().to_hex(), false, now());

        let first: *const PublicKey = record.public_key_object().unwrap();
        let second: *const PublicKey = record.public_key_object().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_key_fails_on_every_call() {
        let record = RelayRecord::new("relay-1", "not-a-key", false, now());

        let first = record.public_key_object().unwrap_err();
        let second = record.public_key_object().unwrap_err();
        assert_eq!(first, second);
        assert_eq!(first.key, "not-a-key");
        assert!(record.canonical_key().is_err());
    }

    #[test]
    fn canonical_key_of_npub_is_hex() {
        let keys = Keys::generate();
        let npub = keys.public_key().to_bech32().unwrap();
        let record = RelayRecord::new("relay-1", npub, false, now());

        assert_eq!(record.canonical_key().unwrap(), keys.public_key().to_hex());
    }

    #[test]
    fn concurrent_first_use_agrees() {
        let keys = Keys::generate();
        let record = RelayRecord::new("relay-1", keys.public_key().to_hex(), false, now());
        let expected = keys.public_key().to_hex();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| record.canonical_key().unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn mark_seen_advances_last_seen() {
        let mut record = RelayRecord::new("relay-1", "key", false, now());
        let later = now() + Duration::seconds(30);

        record.mark_seen(later);
        assert_eq!(record.first_seen(), now());
        assert_eq!(record.last_seen(), later);
    }

    #[test]
    fn mark_seen_never_moves_backwards() {
        let mut record = RelayRecord::new("relay-1", "key", false, now());

        record.mark_seen(now() - Duration::seconds(30));
        assert_eq!(record.last_seen(), now());
    }

    #[test]
    fn equality_ignores_parse_cache() {
        let keys = Keys::generate();
        let a = RelayRecord::new("relay-1", keys.public_key().to_hex(), true, now());
        let b = a.clone();
        let _ = a.public_key_object();

        assert_eq!(a, b);
    }

    #[test]
    fn debug_output_contains_relay_id() {
        let record = RelayRecord::new("relay-1", "key", false, now());
        let debug_str = format!("{record:?}");
        assert!(debug_str.contains("RelayRecord"));
        assert!(debug_str.contains("relay-1"));
    }
}
