//! # Keys and Signers
//!
//! [`PublicKey`] is an algorithm-tagged public key with the ledger's wire
//! encoding. [`Signer`] is the signing capability handed out by a credential
//! resolver; the transfer core only ever talks to that trait.
//!
//! [`Ed25519Keypair`] is the one concrete signer shipped here. It backs the
//! in-memory keystore and the tests. Other algorithms (ECDSA, SM2) are
//! expected to arrive through external [`Signer`] implementations.
//!
//! ## Wire form
//!
//! ```text
//! ECDSA        : raw SEC1 point (33 bytes compressed, 65 uncompressed)
//! SM2 / EDDSA  : [kind label][curve label][key bytes...]
//! ```
//!
//! Key bytes are never logged.

use ed25519_dalek::{
    Signature as DalekSignature, Signer as _, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::key_type::{KeyKind, KeyTypeError};

/// Curve label for SM2 keys on the `sm2p256v1` curve.
pub const CURVE_SM2P256V1: u8 = 20;

/// Curve label for Ed25519 keys.
pub const CURVE_ED25519: u8 = 25;

/// Errors that can occur during key operations.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid public key encoding: {0}")]
    InvalidPublicKey(String),

    #[error(transparent)]
    KeyType(#[from] KeyTypeError),
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A public key tagged with its signature algorithm.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    kind: KeyKind,
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Wraps raw key bytes for the given algorithm.
    pub fn new(kind: KeyKind, bytes: Vec<u8>) -> Self {
        Self { kind, bytes }
    }

    /// The algorithm this key belongs to.
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Raw key bytes, without the wire prefix.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Serializes the key in the ledger's wire form.
    pub fn to_wire_bytes(&self) -> Vec<u8> {
        match self.kind {
            KeyKind::Ecdsa => self.bytes.clone(),
            KeyKind::Sm2 | KeyKind::Eddsa => {
                let curve = if self.kind == KeyKind::Sm2 {
                    CURVE_SM2P256V1
                } else {
                    CURVE_ED25519
                };
                let mut out = Vec::with_capacity(self.bytes.len() + 2);
                out.push(self.kind.label());
                out.push(curve);
                out.extend_from_slice(&self.bytes);
                out
            }
        }
    }

    /// Parses a wire-form key.
    ///
    /// A 33-byte compressed (`0x02`/`0x03`) or 65-byte uncompressed (`0x04`)
    /// point is ECDSA. Anything else must start with a declared key-type
    /// label followed by a curve label.
    ///
    /// # Errors
    ///
    /// [`KeyError::KeyType`] when the leading label is not a declared key
    /// type, [`KeyError::InvalidPublicKey`] for truncated input.
    pub fn from_wire_bytes(data: &[u8]) -> Result<Self, KeyError> {
        let is_sec1 = matches!(
            (data.len(), data.first().copied()),
            (33, Some(0x02 | 0x03)) | (65, Some(0x04))
        );
        if is_sec1 {
            return Ok(Self::new(KeyKind::Ecdsa, data.to_vec()));
        }

        let (&label, rest) = data
            .split_first()
            .ok_or_else(|| KeyError::InvalidPublicKey("empty key".into()))?;
        let kind = KeyKind::from_label(label)?;
        if kind == KeyKind::Ecdsa {
            return Err(KeyError::InvalidPublicKey(
                "labelled ECDSA keys must be raw SEC1 points".into(),
            ));
        }
        let (_curve, key) = rest
            .split_first()
            .ok_or_else(|| KeyError::InvalidPublicKey("missing curve label".into()))?;
        if key.is_empty() {
            return Err(KeyError::InvalidPublicKey("missing key bytes".into()));
        }
        Ok(Self::new(kind, key.to_vec()))
    }

    /// Hex encoding of the wire form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_wire_bytes())
    }

    /// Verifies a signature produced by the matching private key.
    ///
    /// Only EdDSA keys are verified locally; keys of other algorithms always
    /// return `false` because their curve math lives outside this crate.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        if self.kind != KeyKind::Eddsa {
            return false;
        }
        let Ok(key_bytes) = <[u8; 32]>::try_from(self.bytes.as_slice()) else {
            return false;
        };
        let Ok(verifying_key) = VerifyingKey::from_bytes(&key_bytes) else {
            return false;
        };
        let Ok(sig_bytes) = <[u8; 64]>::try_from(signature) else {
            return false;
        };
        verifying_key
            .verify(message, &DalekSignature::from_bytes(&sig_bytes))
            .is_ok()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = hex::encode(&self.bytes);
        let shown = &hex_str[..hex_str.len().min(16)];
        write!(f, "PublicKey({}, {})", self.kind, shown)
    }
}

// ---------------------------------------------------------------------------
// Signer
// ---------------------------------------------------------------------------

/// A signing capability for one account.
///
/// Implementations must be deterministic with respect to their public key:
/// `public_key()` always returns the same value for the same signer.
pub trait Signer: Send + Sync {
    /// Public half of the signing key.
    fn public_key(&self) -> PublicKey;

    /// Signs `message` and returns the raw signature bytes.
    fn sign(&self, message: &[u8]) -> Vec<u8>;
}

// ---------------------------------------------------------------------------
// Ed25519Keypair
// ---------------------------------------------------------------------------

/// An Ed25519 keypair, exposed to the ledger as a [`KeyKind::Eddsa`] key.
///
/// Does not implement `Serialize`. Export secret material explicitly with
/// [`secret_key_bytes`](Self::secret_key_bytes).
pub struct Ed25519Keypair {
    signing_key: SigningKey,
}

impl Ed25519Keypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Deterministic keypair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Reconstruct a keypair from a hex-encoded secret key.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str).map_err(|_| KeyError::InvalidSecretKey)?;
        let seed: [u8; SECRET_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_seed(&seed))
    }

    /// Exports the raw 32-byte secret key.
    pub fn secret_key_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.signing_key.to_bytes()
    }

    /// Raw 32-byte verifying key.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }
}

impl Signer for Ed25519Keypair {
    fn public_key(&self) -> PublicKey {
        PublicKey::new(KeyKind::Eddsa, self.public_key_bytes().to_vec())
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }
}

impl Clone for Ed25519Keypair {
    fn clone(&self) -> Self {
        Self::from_seed(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for Ed25519Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Keypair(pub={})", hex::encode(self.public_key_bytes()))
    }
}
