//! Public key codec.
//!
//! Relay keys are Nostr public keys (x-only secp256k1). They may be stored
//! or configured either as hex or as `npub` bech32; the canonical form used
//! for every comparison is lowercase hex.

use nostr::PublicKey;

use super::error::InvalidKeyFormat;

/// Parses key strings into key objects and renders their canonical form.
///
/// Implementations must be deterministic and pure:
/// `stringify(&parse(s)?)` is the canonical form of `s` and parsing that
/// canonical form again yields an equal key.
pub trait PublicKeyCodec {
    /// The parsed key object.
    type Key;

    /// Parses a key string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidKeyFormat`] if `value` is not a valid key.
    fn parse(&self, value: &str) -> Result<Self::Key, InvalidKeyFormat>;

    /// Renders the canonical string form of `key`.
    fn stringify(&self, key: &Self::Key) -> String;

    /// Parses `value` and returns its canonical string form.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidKeyFormat`] if `value` is not a valid key.
    fn canonicalize(&self, value: &str) -> Result<String, InvalidKeyFormat> {
        self.parse(value).map(|key| self.stringify(&key))
    }
}

/// Codec for Nostr public keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NostrKeyCodec;

impl PublicKeyCodec for NostrKeyCodec {
    type Key = PublicKey;

    fn parse(&self, value: &str) -> Result<PublicKey, InvalidKeyFormat> {
        PublicKey::parse(value.trim()).map_err(|e| InvalidKeyFormat::new(value, e.to_string()))
    }

    fn stringify(&self, key: &PublicKey) -> String {
        key.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nostr::{Keys, ToBech32};

    #[test]
    fn parses_hex_key() {
        let keys = Keys::generate();
        let hex = keys.public_key().to_hex();

        let parsed = NostrKeyCodec.parse(&hex).unwrap();
        assert_eq!(parsed, keys.public_key());
    }

    #[test]
    fn npub_canonicalizes_to_hex() {
        let keys = Keys::generate();
        let npub = keys.public_key().to_bech32().unwrap();

        let canonical = NostrKeyCodec.canonicalize(&npub).unwrap();
        assert_eq!(canonical, keys.public_key().to_hex());
    }

    #[test]
    fn canonical_form_is_stable() {
        let keys = Keys::generate();
        let hex = keys.public_key().to_hex();

        let once = NostrKeyCodec.canonicalize(&hex).unwrap();
        let twice = NostrKeyCodec.canonicalize(&once).unwrap();
        assert_eq!(once, hex);
        assert_eq!(once, twice);
    }

    #[test]
    fn rejects_garbage() {
        let err = NostrKeyCodec.parse("not-a-key").unwrap_err();
        assert_eq!(err.key, "not-a-key");
        assert!(!err.reason.is_empty());
    }

    #[test]
    fn rejects_empty_string() {
        assert!(NostrKeyCodec.parse("").is_err());
    }

    #[test]
    fn rejects_short_hex() {
        assert!(NostrKeyCodec.parse("abc").is_err());
    }
}
