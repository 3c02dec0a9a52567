//! Batch lookup of relays by public key.

use std::collections::HashSet;

use super::error::RelayResult;
use super::types::RelayRecord;

/// Finds relay records by public key.
///
/// The storage engine behind a lookup is an external collaborator; this
/// trait is the only view of it that trust evaluation needs.
pub trait RelayLookup {
    /// Returns every known relay whose stored public key is in `keys`.
    ///
    /// The result has no ordering guarantee and is empty when `keys` is
    /// empty or nothing matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read. No
    /// partial result is returned in that case.
    fn for_keys(&self, keys: &HashSet<String>) -> RelayResult<Vec<RelayRecord>>;
}

impl RelayLookup for [RelayRecord] {
    fn for_keys(&self, keys: &HashSet<String>) -> RelayResult<Vec<RelayRecord>> {
        Ok(self
            .iter()
            .filter(|record| keys.contains(record.public_key()))
            .cloned()
            .collect())
    }
}
