//! Registered relays.
//!
//! A relay is identified by a unique id and a public key. Records are
//! created on first registration and kept up to date by heartbeats.
//!
//! # Architecture
//!
//! ```text
//! RelayStorage (SQLite)
//!     ├── register / heartbeat / get
//!     └── RelayLookup::for_keys
//! ```
//!
//! Key invariants:
//! - `relay_id` is unique.
//! - `first_seen <= last_seen`; heartbeats never move `last_seen` back.
//! - Stored keys must parse; a key that does not surfaces as
//!   [`RelayError::InvalidKeyFormat`] on first use.

mod error;
mod lookup;
mod storage;
mod types;

pub use error::{RelayError, RelayResult};
pub use lookup::RelayLookup;
pub use storage::RelayStorage;
pub use types::RelayRecord;
