//! Error taxonomy for transfer construction and submission.
//!
//! Every variant is terminal for the call that raised it; nothing in this
//! crate retries. Validation failures (`UnknownAsset`, `LengthMismatch`,
//! `EmptyBatch`, `InvalidAmount`, `AmountOverflow`) are always raised
//! before any credential is unlocked or any byte leaves the process.

use thiserror::Error;

use super::encoding::DecodeError;
use crate::crypto::key_type::KeyTypeError;
use crate::identity::AddressError;
use crate::wallet::CredentialError;

/// Errors produced by the transfer builder and submission service.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The asset name is not in the registered asset table.
    #[error("unknown asset: {0}")]
    UnknownAsset(String),

    /// Two parallel input lists have different lengths.
    #[error("length mismatch: {left} has {left_len} entries, {right} has {right_len}")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    /// A batch builder was given no records to build.
    #[error("transfer batch is empty")]
    EmptyBatch,

    /// The amount must be strictly positive on this path.
    #[error("amount must be > 0, got {0}")]
    InvalidAmount(i64),

    /// Scaling the amount by the asset precision overflowed.
    #[error("amount {amount} overflows when scaled by precision {precision}")]
    AmountOverflow { amount: i64, precision: i64 },

    /// The credential resolver could not unlock the account.
    #[error("failed to resolve credential for {address}: {source}")]
    CredentialResolution {
        address: String,
        #[source]
        source: CredentialError,
    },

    /// A textual address could not be decoded.
    #[error("failed to decode address {address}: {source}")]
    AddressDecode {
        address: String,
        #[source]
        source: AddressError,
    },

    /// A signer group has more members than a signature slot can count.
    #[error("signer group of {0} exceeds {max} signers", max = u16::MAX)]
    SignerGroupTooLarge(usize),

    /// A serialized public key carries an undeclared key-type label.
    #[error(transparent)]
    UnrecognizedKeyType(#[from] KeyTypeError),

    /// Serialized transaction bytes could not be parsed.
    #[error("malformed transaction: {0}")]
    MalformedTransaction(#[from] DecodeError),

    /// The network layer did not accept the transaction. The outcome is
    /// unknown: it may still have been applied.
    #[error("transaction submission was rejected")]
    SubmissionRejected,
}

impl TransferError {
    /// `true` for errors raised before any collaborator was called.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownAsset(_)
                | Self::LengthMismatch { .. }
                | Self::EmptyBatch
                | Self::InvalidAmount(_)
                | Self::AmountOverflow { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_classification() {
        assert!(TransferError::UnknownAsset("btc".into()).is_validation());
        assert!(TransferError::InvalidAmount(0).is_validation());
        assert!(TransferError::EmptyBatch.is_validation());
        assert!(!TransferError::SubmissionRejected.is_validation());
    }

    #[test]
    fn length_mismatch_message() {
        let err = TransferError::LengthMismatch {
            left: "receivers",
            left_len: 2,
            right: "amounts",
            right_len: 3,
        };
        assert_eq!(
            err.to_string(),
            "length mismatch: receivers has 2 entries, amounts has 3"
        );
    }
}
