//! # Wallet Module
//!
//! The credential-resolution seam. The transfer builder never reads key
//! storage itself: it asks a [`CredentialResolver`] to unlock an account
//! and gets back the account's public key and a [`Signer`] handle.
//!
//! [`MemoryKeystore`] is the reference resolver used by the CLI and the
//! tests. Production deployments plug in their own wallet backend.

pub mod keystore;

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::crypto::keys::{PublicKey, Signer};

pub use keystore::{KeystoreError, KeystoreFile, MemoryKeystore};

/// Why an account could not be unlocked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// No account with this address is known to the resolver.
    #[error("unknown account")]
    UnknownAccount,

    /// The secret does not unlock the account.
    #[error("wrong secret")]
    WrongSecret,

    /// The backing store failed.
    #[error("keystore backend error: {0}")]
    Backend(String),
}

/// An unlocked account: its public key and a handle that can sign for it.
#[derive(Clone)]
pub struct ResolvedAccount {
    pub public_key: PublicKey,
    pub signer: Arc<dyn Signer>,
}

impl fmt::Debug for ResolvedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedAccount")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Unlocks accounts by address and secret.
///
/// Calls may block on key storage. They are never retried by the caller.
pub trait CredentialResolver: Send + Sync {
    fn resolve(&self, address: &str, secret: &str) -> Result<ResolvedAccount, CredentialError>;
}
