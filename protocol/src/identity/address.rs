//! # Ledger Addresses
//!
//! An [`Address`] is the 20-byte identity of an account or contract on the
//! ledger. Native contracts are written as 40-character hex strings; user
//! accounts travel as base58 text with a version byte and checksum:
//!
//! ```text
//! public key (wire form)
//!     -> BLAKE3 -> first 20 bytes                  = Address
//!     -> [0x17] || Address || dsha256(..)[0..4]    = 25 bytes
//!     -> base58                                    = "A..."
//! ```
//!
//! Decoding and derivation sit behind the [`AddressCodec`] trait so the
//! transfer builder can be pointed at a different client library's rules.
//! [`Base58Codec`] is the reference implementation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::crypto::hash::{double_sha256, identity_hash, IDENTITY_HASH_LENGTH};
use crate::crypto::keys::PublicKey;

/// Version byte prefixed to base58 account addresses.
pub const ADDRESS_VERSION: u8 = 0x17;

/// Length of the base58 address checksum, in bytes.
const CHECKSUM_LENGTH: usize = 4;

/// Errors that can occur while parsing or decoding addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The text is not valid base58.
    #[error("invalid base58 encoding: {0}")]
    Base58(String),

    /// The text is not valid hex.
    #[error("invalid hex encoding: {0}")]
    Hex(String),

    /// The decoded payload has the wrong length.
    #[error("invalid address length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes.
        got: usize,
    },

    /// The leading version byte is not [`ADDRESS_VERSION`].
    #[error("invalid address version byte: 0x{0:02x}")]
    InvalidVersion(u8),

    /// The trailing checksum does not match the payload.
    #[error("address checksum mismatch")]
    ChecksumMismatch,
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte ledger identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; IDENTITY_HASH_LENGTH]);

impl Address {
    /// Wraps raw identity bytes.
    pub const fn new(bytes: [u8; IDENTITY_HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parses a 40-character hex string, as used for native contract
    /// locations.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let bytes = hex::decode(s).map_err(|e| AddressError::Hex(e.to_string()))?;
        let arr: [u8; IDENTITY_HASH_LENGTH] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| AddressError::InvalidLength {
                    expected: IDENTITY_HASH_LENGTH,
                    got: bytes.len(),
                })?;
        Ok(Self(arr))
    }

    /// The raw identity bytes.
    pub fn as_bytes(&self) -> &[u8; IDENTITY_HASH_LENGTH] {
        &self.0
    }

    /// Lowercase hex of the identity bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// AddressCodec
// ---------------------------------------------------------------------------

/// Textual address encoding and public-key-to-address derivation.
pub trait AddressCodec: Send + Sync {
    /// Decodes a human-readable address into a ledger identity.
    fn decode_address(&self, text: &str) -> Result<Address, AddressError>;

    /// Encodes a ledger identity as human-readable text.
    fn encode_address(&self, address: &Address) -> String;

    /// Derives the identity owned by a public key.
    fn derive_address(&self, public_key: &PublicKey) -> Address;
}

/// Base58 account addresses with a version byte and a 4-byte
/// double-SHA-256 checksum.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base58Codec;

impl AddressCodec for Base58Codec {
    fn decode_address(&self, text: &str) -> Result<Address, AddressError> {
        let data = bs58::decode(text)
            .into_vec()
            .map_err(|e| AddressError::Base58(e.to_string()))?;

        let expected = 1 + IDENTITY_HASH_LENGTH + CHECKSUM_LENGTH;
        if data.len() != expected {
            return Err(AddressError::InvalidLength {
                expected,
                got: data.len(),
            });
        }
        if data[0] != ADDRESS_VERSION {
            return Err(AddressError::InvalidVersion(data[0]));
        }

        let (body, checksum) = data.split_at(1 + IDENTITY_HASH_LENGTH);
        if &double_sha256(body)[..CHECKSUM_LENGTH] != checksum {
            return Err(AddressError::ChecksumMismatch);
        }

        let mut bytes = [0u8; IDENTITY_HASH_LENGTH];
        bytes.copy_from_slice(&body[1..]);
        Ok(Address(bytes))
    }

    fn encode_address(&self, address: &Address) -> String {
        let mut data = Vec::with_capacity(1 + IDENTITY_HASH_LENGTH + CHECKSUM_LENGTH);
        data.push(ADDRESS_VERSION);
        data.extend_from_slice(address.as_bytes());
        let checksum = double_sha256(&data);
        data.extend_from_slice(&checksum[..CHECKSUM_LENGTH]);
        bs58::encode(data).into_string()
    }

    fn derive_address(&self, public_key: &PublicKey) -> Address {
        Address(identity_hash(&public_key.to_wire_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::{Ed25519Keypair, Signer};

    #[test]
    fn contract_hex_roundtrip() {
        let addr = Address::from_hex("ff00000000000000000000000000000000000001").unwrap();
        assert_eq!(addr.as_bytes()[0], 0xff);
        assert_eq!(addr.as_bytes()[19], 0x01);
        assert_eq!(addr.to_hex(), "ff00000000000000000000000000000000000001");
    }

    #[test]
    fn hex_wrong_length_rejected() {
        let err = Address::from_hex("ff00").unwrap_err();
        assert_eq!(
            err,
            AddressError::InvalidLength {
                expected: 20,
                got: 2
            }
        );
        assert!(matches!(Address::from_hex("zz"), Err(AddressError::Hex(_))));
    }

    #[test]
    fn base58_roundtrip() {
        let codec = Base58Codec;
        let addr = Address::new([0x42; 20]);
        let text = codec.encode_address(&addr);
        assert_eq!(codec.decode_address(&text).unwrap(), addr);
    }

    #[test]
    fn derived_address_is_deterministic() {
        let codec = Base58Codec;
        let pk = Ed25519Keypair::from_seed(&[1u8; 32]).public_key();
        assert_eq!(codec.derive_address(&pk), codec.derive_address(&pk));

        let other = Ed25519Keypair::from_seed(&[2u8; 32]).public_key();
        assert_ne!(codec.derive_address(&pk), codec.derive_address(&other));
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let codec = Base58Codec;
        let mut data = vec![ADDRESS_VERSION];
        data.extend_from_slice(&[0x42; 20]);
        data.extend_from_slice(&[0, 0, 0, 0]);
        let text = bs58::encode(data).into_string();
        assert_eq!(
            codec.decode_address(&text).unwrap_err(),
            AddressError::ChecksumMismatch
        );
    }

    #[test]
    fn wrong_version_rejected() {
        let codec = Base58Codec;
        let mut data = vec![0x00];
        data.extend_from_slice(&[0x42; 20]);
        let checksum = double_sha256(&data);
        data.extend_from_slice(&checksum[..4]);
        let text = bs58::encode(data).into_string();
        assert_eq!(
            codec.decode_address(&text).unwrap_err(),
            AddressError::InvalidVersion(0x00)
        );
    }

    #[test]
    fn garbage_text_rejected() {
        let codec = Base58Codec;
        // '0', 'O', 'I' and 'l' are outside the base58 alphabet.
        assert!(matches!(
            codec.decode_address("0OIl"),
            Err(AddressError::Base58(_))
        ));
        assert!(matches!(
            codec.decode_address("abc"),
            Err(AddressError::InvalidLength { .. })
        ));
    }
}
