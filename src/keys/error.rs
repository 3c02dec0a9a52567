//! Error type for public key parsing.

use thiserror::Error;

/// A stored public key could not be parsed.
///
/// This is a data-integrity violation rather than a trust decision. The
/// error is `Clone` so a memoized parse can hand the same failure back on
/// every access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid public key format {key:?}: {reason}")]
pub struct InvalidKeyFormat {
    /// The key string that failed to parse.
    pub key: String,
    /// Why the codec rejected it.
    pub reason: String,
}

impl InvalidKeyFormat {
    /// Creates a new error for `key`.
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
