//! Error types for relay operations.
//!
//! This module defines errors that can occur while registering relays,
//! looking them up, and evaluating their access to an organization.

use thiserror::Error;

use crate::keys::InvalidKeyFormat;

/// Errors that can occur during relay operations.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A relay's public key could not be parsed.
    #[error(transparent)]
    InvalidKeyFormat(#[from] InvalidKeyFormat),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database error from `SQLite`.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored row could not be decoded.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The organization's trusted-relay option is not a list.
    #[error("Invalid trusted relay list: {0}")]
    InvalidTrustList(String),

    /// Relay not found.
    #[error("Relay not found: {0}")]
    NotFound(String),

    /// A relay re-registered with a different public key.
    #[error("Relay {relay_id} is already registered with a different public key")]
    KeyConflict {
        /// The relay that tried to re-register.
        relay_id: String,
    },

    /// JSON (de)serialization failed.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
