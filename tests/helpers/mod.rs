//! Shared helpers for relay trust integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use nostr::Keys;
use relay_trust::org::Organization;

/// A fixed point in time so timestamps are comparable across calls.
pub fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
}

/// Returns a fresh valid public key in canonical (hex) form.
pub fn fresh_key() -> String {
    Keys::generate().public_key().to_hex()
}

/// Returns the test organization.
pub fn acme() -> Organization {
    Organization::new(1, "acme")
}
