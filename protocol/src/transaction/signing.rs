//! Attaching signatures to a built transaction.
//!
//! Signing is a separate step from building because signer handles may be
//! remote or hardware-backed. The signed message is always
//! [`InvokeTransaction::signable_bytes`], which excludes the slots
//! themselves, so the content hash does not move when signatures are
//! added.

use super::builder::{PreparedTransfer, SignerGroup};
use super::error::TransferError;
use super::invocation::{InvokeTransaction, SignatureSlot};

/// Signs `tx` with every group, one slot per group, in the given order.
///
/// Existing slots are replaced. A group of `n` signers produces an
/// `n`-of-`n` slot. A group larger than `u16::MAX` cannot be expressed in
/// a slot and fails with [`TransferError::SignerGroupTooLarge`], leaving
/// `tx` untouched.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use native_asset::crypto::{Ed25519Keypair, Signer};
/// use native_asset::identity::Address;
/// use native_asset::transaction::{sign_transaction, InvokeTransaction};
///
/// let kp: Arc<dyn Signer> = Arc::new(Ed25519Keypair::generate());
/// let mut tx = InvokeTransaction::new_native(
///     Address::new([0xff; 20]), "transfer", vec![0], Address::new([1; 20]), 0, 20_000,
/// );
/// sign_transaction(&mut tx, &[vec![kp]])?;
/// assert!(tx.verify_signatures());
/// # Ok::<(), native_asset::transaction::TransferError>(())
/// ```
pub fn sign_transaction<'a>(
    tx: &'a mut InvokeTransaction,
    groups: &[SignerGroup],
) -> Result<&'a InvokeTransaction, TransferError> {
    let thresholds = groups
        .iter()
        .map(|group| {
            u16::try_from(group.len()).map_err(|_| TransferError::SignerGroupTooLarge(group.len()))
        })
        .collect::<Result<Vec<u16>, _>>()?;

    let message = tx.signable_bytes();
    tx.sigs = groups
        .iter()
        .zip(thresholds)
        .map(|(group, m)| SignatureSlot {
            public_keys: group.iter().map(|s| s.public_key()).collect(),
            m,
            signatures: group.iter().map(|s| s.sign(&message)).collect(),
        })
        .collect();
    Ok(tx)
}

/// Consumes a prepared transfer and returns its signed transaction.
pub fn sign_prepared(prepared: PreparedTransfer) -> Result<InvokeTransaction, TransferError> {
    let PreparedTransfer { mut tx, signers } = prepared;
    sign_transaction(&mut tx, &signers)?;
    Ok(tx)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::{Ed25519Keypair, Signer};
    use crate::identity::Address;
    use std::sync::Arc;

    fn unsigned() -> InvokeTransaction {
        let mut tx = InvokeTransaction::new_native(
            Address::new([0xff; 20]),
            "transfer",
            vec![1, 2, 3],
            Address::new([1; 20]),
            0,
            500,
        );
        tx.nonce = 7;
        tx
    }

    fn signer(seed: u8) -> Arc<dyn Signer> {
        Arc::new(Ed25519Keypair::from_seed(&[seed; 32]))
    }

    #[test]
    fn one_slot_per_group_in_order() {
        let (a, b, c) = (signer(1), signer(2), signer(3));
        let mut tx = unsigned();
        sign_transaction(&mut tx, &[vec![a.clone()], vec![b.clone()], vec![c.clone()]]).unwrap();

        let keys: Vec<_> = tx.sigs.iter().map(|s| s.public_keys[0].clone()).collect();
        assert_eq!(keys, vec![a.public_key(), b.public_key(), c.public_key()]);
        assert!(tx.sigs.iter().all(|s| s.m == 1 && s.signatures.len() == 1));
        assert!(tx.verify_signatures());
    }

    #[test]
    fn multi_signer_group_is_n_of_n() {
        let mut tx = unsigned();
        sign_transaction(&mut tx, &[vec![signer(1), signer(2)]]).unwrap();
        assert_eq!(tx.sigs.len(), 1);
        assert_eq!(tx.sigs[0].m, 2);
        assert_eq!(tx.sigs[0].signatures.len(), 2);
        assert!(tx.verify_signatures());
    }

    #[test]
    fn signing_does_not_change_hash() {
        let mut tx = unsigned();
        let before = tx.hash();
        sign_transaction(&mut tx, &[vec![signer(4)]]).unwrap();
        assert_eq!(tx.hash(), before);
    }

    #[test]
    fn signing_is_deterministic() {
        let mut t1 = unsigned();
        let mut t2 = unsigned();
        sign_transaction(&mut t1, &[vec![signer(5)]]).unwrap();
        sign_transaction(&mut t2, &[vec![signer(5)]]).unwrap();
        assert_eq!(t1.to_hex(), t2.to_hex());
    }

    #[test]
    fn oversized_group_fails_and_keeps_existing_slots() {
        let mut tx = unsigned();
        sign_transaction(&mut tx, &[vec![signer(1)]]).unwrap();
        let shared = signer(2);
        let oversized: SignerGroup = vec![shared; usize::from(u16::MAX) + 1];
        let err = sign_transaction(&mut tx, &[vec![signer(3)], oversized]).unwrap_err();
        assert!(matches!(err, TransferError::SignerGroupTooLarge(n) if n == 65_536));
        assert_eq!(tx.sigs.len(), 1);
        assert_eq!(tx.sigs[0].public_keys[0], signer(1).public_key());
    }

    #[test]
    fn re_signing_replaces_slots() {
        let mut tx = unsigned();
        sign_transaction(&mut tx, &[vec![signer(1)], vec![signer(2)]]).unwrap();
        sign_transaction(&mut tx, &[vec![signer(3)]]).unwrap();
        assert_eq!(tx.sigs.len(), 1);
        assert_eq!(tx.sigs[0].public_keys[0], signer(3).public_key());
    }
}
