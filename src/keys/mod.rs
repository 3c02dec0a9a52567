//! Public key parsing and canonicalization.
//!
//! Trust decisions compare keys by their canonical string form, so every
//! key that enters the system (relay registration, trust-list writes) goes
//! through a [`PublicKeyCodec`] first.

mod codec;
mod error;

pub use codec::{NostrKeyCodec, PublicKeyCodec};
pub use error::InvalidKeyFormat;
