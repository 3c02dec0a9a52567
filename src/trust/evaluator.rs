//! Relay access decisions.

use serde_json::Value;
use tracing::{debug, warn};

use crate::org::{Organization, TrustList, TrustListResolver};
use crate::relay::{RelayRecord, RelayResult};

/// Decides whether relays may act on behalf of an organization.
///
/// The evaluator holds no mutable state; it can be shared across threads
/// whenever its resolver can.
#[derive(Debug)]
pub struct TrustEvaluator<R> {
    resolver: R,
}

impl<R: TrustListResolver> TrustEvaluator<R> {
    /// Creates an evaluator that reads trust lists through `resolver`.
    pub const fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Returns whether `record` is authorized for `org`.
    ///
    /// Internal relays are always authorized and never touch the trust
    /// list. Any other relay is authorized only if a non-null entry of the
    /// organization's trusted-relay list carries its canonical key.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidKeyFormat`](crate::relay::RelayError::InvalidKeyFormat)
    /// if the relay's stored key cannot be parsed, or the resolver's error
    /// if the trust list cannot be read. Neither is reported as a denial.
    pub fn has_org_access(&self, record: &RelayRecord, org: &Organization) -> RelayResult<bool> {
        if record.is_internal() {
            debug!(relay_id = record.relay_id(), org = %org.slug, "internal relay granted");
            return Ok(true);
        }

        let trusted = self.resolver.trusted_relays(org)?;
        let key = record.canonical_key().inspect_err(|e| {
            warn!(relay_id = record.relay_id(), error = %e, "relay key cannot be evaluated");
        })?;

        let granted = is_trusted(&key, &trusted);
        debug!(relay_id = record.relay_id(), org = %org.slug, granted, "relay access evaluated");
        Ok(granted)
    }
}

/// Returns whether `canonical_key` appears in `list`.
///
/// Entries are scanned in order and the first match wins. `null` entries,
/// non-object entries and objects without a string `public_key` are
/// skipped. Comparison is exact string equality.
#[must_use]
pub fn is_trusted(canonical_key: &str, list: &TrustList) -> bool {
    list.entries()
        .iter()
        .filter(|entry| !entry.is_null())
        .any(|entry| entry.get("public_key").and_then(Value::as_str) == Some(canonical_key))
}
