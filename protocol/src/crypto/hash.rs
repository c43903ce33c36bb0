//! # Hashing Utilities
//!
//! The two digests the transfer core needs:
//!
//! - **SHA-256** (single and double) for transaction content hashes and the
//!   4-byte checksum appended to base58 account addresses.
//! - **BLAKE3** for deriving a 20-byte account identity from a serialized
//!   public key.

use sha2::{Digest, Sha256};

/// Length of a ledger account identity, in bytes.
pub const IDENTITY_HASH_LENGTH: usize = 20;

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use native_asset::crypto::sha256;
///
/// let hash = sha256(b"ont");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute `SHA-256(SHA-256(data))`.
///
/// Used for transaction content hashes and address checksums.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Hash a serialized public key down to a 20-byte account identity.
///
/// BLAKE3 over the wire form of the key, truncated to the first
/// [`IDENTITY_HASH_LENGTH`] bytes.
pub fn identity_hash(public_key_bytes: &[u8]) -> [u8; IDENTITY_HASH_LENGTH] {
    let digest = blake3::hash(public_key_bytes);
    let mut out = [0u8; IDENTITY_HASH_LENGTH];
    out.copy_from_slice(&digest.as_bytes()[..IDENTITY_HASH_LENGTH]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        let hash = sha256(b"");
        let expected =
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap();
        assert_eq!(hash.as_slice(), expected.as_slice());
    }

    #[test]
    fn double_sha256_is_sha256_of_sha256() {
        let single = sha256(b"transfer");
        let double = double_sha256(b"transfer");
        assert_ne!(single, double);
        assert_eq!(double, sha256(&single));
    }

    #[test]
    fn identity_hash_is_truncated_blake3() {
        let data = b"public key bytes";
        let id = identity_hash(data);
        assert_eq!(id.len(), IDENTITY_HASH_LENGTH);
        assert_eq!(&id[..], &blake3::hash(data).as_bytes()[..IDENTITY_HASH_LENGTH]);
    }

    #[test]
    fn identity_hash_differs_per_input() {
        assert_ne!(identity_hash(b"alice"), identity_hash(b"bob"));
    }
}
