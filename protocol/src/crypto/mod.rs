//! # Cryptographic Primitives
//!
//! The key-type registry, algorithm-tagged public keys, the [`Signer`]
//! capability, and the hashes used for transaction and address digests.
//!
//! Curve math is delegated to audited crates (`ed25519-dalek`) or to
//! external [`Signer`] implementations. Nothing here is hand-rolled.

pub mod hash;
pub mod key_type;
pub mod keys;

pub use hash::{double_sha256, identity_hash, sha256};
pub use key_type::{KeyKind, KeyTypeError};
pub use keys::{Ed25519Keypair, KeyError, PublicKey, Signer};
