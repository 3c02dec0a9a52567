//! Relay Trust Library
//!
//! Keeps a registry of upstream relays and decides whether a relay may act
//! on behalf of an organization.
//!
//! - [`relay`]: relay records, `SQLite` storage and batch lookup by key
//! - [`org`]: organization options and trusted-relay lists
//! - [`trust`]: the access decision
//! - [`keys`]: public key parsing and canonical form

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![deny(unsafe_code)]

pub mod config;
pub mod keys;
pub mod logging;
pub mod org;
mod registry;
pub mod relay;
pub mod trust;

pub use registry::RelayRegistry;
