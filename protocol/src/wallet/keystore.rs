//! In-memory keystore and its JSON file form.
//!
//! Accounts are Ed25519 keys exposed as [`KeyKind::Eddsa`]. A secret
//! unlocks an account when `sha256(address || secret)` matches the stored
//! digest. The file form stores the same digest, never the secret.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::{CredentialError, CredentialResolver, ResolvedAccount};
use crate::crypto::hash::sha256;
use crate::crypto::key_type::{KeyKind, KeyTypeError};
use crate::crypto::keys::{Ed25519Keypair, KeyError, Signer};
use crate::identity::AddressCodec;

/// Errors from loading or saving a keystore file.
#[derive(Debug, Error)]
pub enum KeystoreError {
    #[error("keystore I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("keystore parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    KeyType(#[from] KeyTypeError),

    #[error("key type {0} is not supported by the in-memory keystore")]
    UnsupportedKeyType(KeyKind),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("invalid password digest for {0}")]
    InvalidDigest(String),

    #[error("stored address {stored} does not match key-derived address {derived}")]
    AddressMismatch { stored: String, derived: String },
}

struct KeystoreEntry {
    secret_digest: [u8; 32],
    keypair: Arc<Ed25519Keypair>,
}

fn secret_digest(address: &str, secret: &str) -> [u8; 32] {
    let mut data = Vec::with_capacity(address.len() + secret.len());
    data.extend_from_slice(address.as_bytes());
    data.extend_from_slice(secret.as_bytes());
    sha256(&data)
}

/// Thread-safe in-memory account store.
pub struct MemoryKeystore {
    codec: Arc<dyn AddressCodec>,
    accounts: RwLock<HashMap<String, KeystoreEntry>>,
}

impl MemoryKeystore {
    /// Empty keystore; addresses are derived and encoded with `codec`.
    pub fn new(codec: Arc<dyn AddressCodec>) -> Self {
        Self {
            codec,
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Generates a fresh account protected by `secret` and returns its
    /// address.
    pub fn create_account(&self, secret: &str) -> String {
        self.import(Ed25519Keypair::generate(), secret)
    }

    /// Adds an existing keypair protected by `secret` and returns its
    /// address. Re-importing the same key replaces the stored secret.
    pub fn import(&self, keypair: Ed25519Keypair, secret: &str) -> String {
        let address = self
            .codec
            .encode_address(&self.codec.derive_address(&keypair.public_key()));
        let entry = KeystoreEntry {
            secret_digest: secret_digest(&address, secret),
            keypair: Arc::new(keypair),
        };
        self.accounts.write().insert(address.clone(), entry);
        tracing::debug!(%address, "account added to keystore");
        address
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }

    /// Known addresses, sorted.
    pub fn addresses(&self) -> Vec<String> {
        let mut out: Vec<String> = self.accounts.read().keys().cloned().collect();
        out.sort();
        out
    }

    /// Serializable snapshot of every account.
    pub fn to_file(&self) -> KeystoreFile {
        let accounts = self.accounts.read();
        let mut entries: Vec<KeystoreFileEntry> = accounts
            .iter()
            .map(|(address, entry)| KeystoreFileEntry {
                address: address.clone(),
                key_type: KeyKind::Eddsa.label(),
                secret_key: hex::encode(entry.keypair.secret_key_bytes()),
                secret_sha256: hex::encode(entry.secret_digest),
            })
            .collect();
        entries.sort_by(|a, b| a.address.cmp(&b.address));
        KeystoreFile { accounts: entries }
    }

    /// Rebuilds a keystore from its file form.
    ///
    /// Every entry's key-type label must be declared and supported, and its
    /// stored address must match the address derived from its key.
    pub fn from_file(
        codec: Arc<dyn AddressCodec>,
        file: &KeystoreFile,
    ) -> Result<Self, KeystoreError> {
        let store = Self::new(codec);
        {
            let mut accounts = store.accounts.write();
            for entry in &file.accounts {
                let kind = KeyKind::from_label(entry.key_type)?;
                if kind != KeyKind::Eddsa {
                    return Err(KeystoreError::UnsupportedKeyType(kind));
                }
                let keypair = Ed25519Keypair::from_hex(&entry.secret_key)?;
                let derived = store
                    .codec
                    .encode_address(&store.codec.derive_address(&keypair.public_key()));
                if derived != entry.address {
                    return Err(KeystoreError::AddressMismatch {
                        stored: entry.address.clone(),
                        derived,
                    });
                }
                let digest: [u8; 32] = hex::decode(&entry.secret_sha256)
                    .ok()
                    .and_then(|d| d.try_into().ok())
                    .ok_or_else(|| KeystoreError::InvalidDigest(entry.address.clone()))?;
                accounts.insert(
                    derived,
                    KeystoreEntry {
                        secret_digest: digest,
                        keypair: Arc::new(keypair),
                    },
                );
            }
        }
        Ok(store)
    }
}

impl CredentialResolver for MemoryKeystore {
    fn resolve(&self, address: &str, secret: &str) -> Result<ResolvedAccount, CredentialError> {
        let accounts = self.accounts.read();
        let entry = accounts
            .get(address)
            .ok_or(CredentialError::UnknownAccount)?;
        if entry.secret_digest != secret_digest(address, secret) {
            return Err(CredentialError::WrongSecret);
        }
        let signer: Arc<dyn Signer> = entry.keypair.clone();
        Ok(ResolvedAccount {
            public_key: signer.public_key(),
            signer,
        })
    }
}

// ---------------------------------------------------------------------------
// File form
// ---------------------------------------------------------------------------

/// One account as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreFileEntry {
    pub address: String,
    /// Key-type wire label.
    pub key_type: u8,
    /// Hex secret key.
    pub secret_key: String,
    /// Hex `sha256(address || secret)`.
    pub secret_sha256: String,
}

/// JSON keystore document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreFile {
    pub accounts: Vec<KeystoreFileEntry>,
}

impl KeystoreFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, KeystoreError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), KeystoreError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Base58Codec;

    fn keystore() -> MemoryKeystore {
        MemoryKeystore::new(Arc::new(Base58Codec))
    }

    #[test]
    fn resolve_with_correct_secret() {
        let store = keystore();
        let addr = store.create_account("hunter2");
        let account = store.resolve(&addr, "hunter2").unwrap();
        assert_eq!(account.public_key.kind(), KeyKind::Eddsa);
        assert_eq!(account.signer.public_key(), account.public_key);

        let derived = Base58Codec.derive_address(&account.public_key);
        assert_eq!(Base58Codec.encode_address(&derived), addr);
    }

    #[test]
    fn wrong_secret_rejected() {
        let store = keystore();
        let addr = store.create_account("hunter2");
        assert_eq!(
            store.resolve(&addr, "hunter3").unwrap_err(),
            CredentialError::WrongSecret
        );
    }

    #[test]
    fn unknown_account_rejected() {
        let store = keystore();
        assert_eq!(
            store.resolve("AUnknownAddress", "pw").unwrap_err(),
            CredentialError::UnknownAccount
        );
    }

    #[test]
    fn import_is_deterministic_per_key() {
        let store = keystore();
        let a = store.import(Ed25519Keypair::from_seed(&[3u8; 32]), "pw");
        let b = store.import(Ed25519Keypair::from_seed(&[3u8; 32]), "other");
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert!(store.resolve(&a, "other").is_ok());
        assert!(store.resolve(&a, "pw").is_err());
    }

    #[test]
    fn file_roundtrip_preserves_accounts() {
        let store = keystore();
        let a = store.create_account("pw-a");
        let b = store.create_account("pw-b");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keystore.json");
        store.to_file().save(&path).unwrap();

        let loaded =
            MemoryKeystore::from_file(Arc::new(Base58Codec), &KeystoreFile::load(&path).unwrap())
                .unwrap();
        assert_eq!(loaded.addresses(), store.addresses());
        assert!(loaded.resolve(&a, "pw-a").is_ok());
        assert!(loaded.resolve(&b, "pw-b").is_ok());
        assert!(loaded.resolve(&b, "pw-a").is_err());
    }

    #[test]
    fn file_with_undeclared_key_type_rejected() {
        let store = keystore();
        store.create_account("pw");
        let mut file = store.to_file();
        file.accounts[0].key_type = 0x00;
        let err = MemoryKeystore::from_file(Arc::new(Base58Codec), &file)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            KeystoreError::KeyType(KeyTypeError::UnrecognizedLabel(0x00))
        ));
    }

    #[test]
    fn file_with_non_eddsa_key_rejected() {
        let store = keystore();
        store.create_account("pw");
        let mut file = store.to_file();
        file.accounts[0].key_type = KeyKind::Sm2.label();
        let err = MemoryKeystore::from_file(Arc::new(Base58Codec), &file)
            .err()
            .unwrap();
        assert!(matches!(err, KeystoreError::UnsupportedKeyType(KeyKind::Sm2)));
    }

    #[test]
    fn file_with_tampered_address_rejected() {
        let store = keystore();
        store.create_account("pw");
        let other = store.create_account("pw2");
        let mut file = store.to_file();
        let victim = file
            .accounts
            .iter()
            .position(|e| e.address != other)
            .unwrap();
        file.accounts[victim].address = other;
        let err = MemoryKeystore::from_file(Arc::new(Base58Codec), &file)
            .err()
            .unwrap();
        assert!(matches!(err, KeystoreError::AddressMismatch { .. }));
    }
}
