//! Relay trust evaluation.
//!
//! ```text
//! RelayRecord ──canonical key──┐
//!                              ├──► TrustEvaluator ──► bool
//! Organization ──resolver──────┘
//! ```
//!
//! Internal relays are authorized everywhere. Every other relay must be
//! listed, by canonical public key, in the organization's trusted-relay
//! option.

mod evaluator;

pub use evaluator::{is_trusted, TrustEvaluator};
