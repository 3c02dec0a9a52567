//! Organization configuration consumed by trust evaluation.
//!
//! Organizations are opaque handles with a key-value option store. The
//! only option read here is the trusted-relay list.

mod options;
mod trusted;
mod types;

pub use options::{MemoryOptionStore, OptionStorage, OptionStore};
pub use trusted::{
    set_trusted_relays, OptionTrustListResolver, TrustList, TrustListResolver, TrustedRelay,
    TRUSTED_RELAYS_OPTION,
};
pub use types::Organization;
