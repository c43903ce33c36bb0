//! One-call transfer entry points: build, sign, serialize, submit.
//!
//! A successful call returns the transaction's content hash. A refused or
//! failed submission returns [`TransferError::SubmissionRejected`] and no
//! hash. That outcome is unknown, not negative: the transaction may still
//! land, so nothing here retries.

use std::sync::Arc;

use super::builder::{PreparedTransfer, TransferBuilder};
use super::error::TransferError;
use super::signing::sign_prepared;
use crate::config::ONT_CONTRACT_HEX;
use crate::identity::Address;
use crate::network::Submitter;

/// Transfer builder wired to a submitter.
pub struct AssetTransfers {
    builder: TransferBuilder,
    submitter: Arc<dyn Submitter>,
}

impl AssetTransfers {
    pub fn new(builder: TransferBuilder, submitter: Arc<dyn Submitter>) -> Self {
        Self { builder, submitter }
    }

    pub fn builder(&self) -> &TransferBuilder {
        &self.builder
    }

    /// Builds, signs and submits a single transfer.
    pub fn send_transfer(
        &self,
        asset: &str,
        sender_addr: &str,
        secret: &str,
        receiver_addr: &str,
        raw_amount: i64,
        gas_limit: u64,
    ) -> Result<String, TransferError> {
        let prepared = self.builder.build_transfer(
            asset,
            sender_addr,
            secret,
            receiver_addr,
            raw_amount,
            gas_limit,
        )?;
        self.submit(prepared)
    }

    /// Builds, signs and submits a fan-out transfer.
    pub fn send_transfer_to_many<S: AsRef<str>>(
        &self,
        asset: &str,
        sender_addr: &str,
        secret: &str,
        receivers: &[S],
        amounts: &[i64],
        gas_limit: u64,
    ) -> Result<String, TransferError> {
        let prepared = self.builder.build_transfer_to_many(
            asset,
            sender_addr,
            secret,
            receivers,
            amounts,
            gas_limit,
        )?;
        self.submit(prepared)
    }

    /// Builds, signs and submits a fan-in transfer. Every sender signs.
    pub fn send_transfer_from_many<S: AsRef<str>, P: AsRef<str>>(
        &self,
        asset: &str,
        senders: &[S],
        secrets: &[P],
        receiver_addr: &str,
        amounts: &[i64],
        gas_limit: u64,
    ) -> Result<String, TransferError> {
        let prepared = self.builder.build_transfer_from_many(
            asset,
            senders,
            secrets,
            receiver_addr,
            amounts,
            gas_limit,
        )?;
        self.submit(prepared)
    }

    /// Builds, signs and submits a delegated transfer against an explicit
    /// allowance holder.
    pub fn send_transfer_from(
        &self,
        sender_addr: &str,
        secret: &str,
        spender: Address,
        receiver_addr: &str,
        raw_amount: i64,
        gas_limit: u64,
    ) -> Result<String, TransferError> {
        let prepared = self.builder.build_transfer_from(
            sender_addr,
            secret,
            spender,
            receiver_addr,
            raw_amount,
            gas_limit,
        )?;
        self.submit(prepared)
    }

    /// Withdraws ONG from the allowance held by the ONT contract, which is
    /// where unbound ONG accrues.
    pub fn send_ong_transfer_from(
        &self,
        sender_addr: &str,
        secret: &str,
        receiver_addr: &str,
        raw_amount: i64,
        gas_limit: u64,
    ) -> Result<String, TransferError> {
        let spender = ont_contract()?;
        self.send_transfer_from(sender_addr, secret, spender, receiver_addr, raw_amount, gas_limit)
    }

    fn submit(&self, prepared: PreparedTransfer) -> Result<String, TransferError> {
        let tx = sign_prepared(prepared)?;
        let hash = tx.hash();
        let accepted = match self.submitter.submit(&tx.to_hex()) {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(tx_hash = %hash, error = %e, "submission failed");
                return Err(TransferError::SubmissionRejected);
            }
        };
        if !accepted {
            tracing::warn!(tx_hash = %hash, "submission rejected");
            return Err(TransferError::SubmissionRejected);
        }
        tracing::info!(tx_hash = %hash, slots = tx.sigs.len(), "transaction submitted");
        Ok(hash)
    }
}

fn ont_contract() -> Result<Address, TransferError> {
    Address::from_hex(ONT_CONTRACT_HEX).map_err(|source| TransferError::AddressDecode {
        address: ONT_CONTRACT_HEX.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuilderConfig;
    use crate::identity::{AddressCodec, Base58Codec};
    use crate::network::{RecordingSubmitter, SubmitError};
    use crate::transaction::invocation::InvokeTransaction;
    use crate::transaction::types::TransferFrom;
    use crate::wallet::MemoryKeystore;

    struct FailingSubmitter;

    impl Submitter for FailingSubmitter {
        fn submit(&self, _signed_hex: &str) -> Result<bool, SubmitError> {
            Err(SubmitError::Transport("connection refused".into()))
        }
    }

    fn service(submitter: Arc<dyn Submitter>) -> (AssetTransfers, String, String) {
        let codec: Arc<dyn AddressCodec> = Arc::new(Base58Codec);
        let store = Arc::new(MemoryKeystore::new(codec.clone()));
        let x = store.create_account("px");
        let y = store.create_account("py");
        let builder = TransferBuilder::new(store, codec, &BuilderConfig::default()).unwrap();
        (AssetTransfers::new(builder, submitter), x, y)
    }

    #[test]
    fn accepted_submission_returns_hash() {
        let recorder = Arc::new(RecordingSubmitter::accepting());
        let (svc, x, y) = service(recorder.clone());
        let hash = svc.send_transfer("ont", &x, "px", &y, 100, 500).unwrap();

        let submitted = recorder.last().unwrap();
        let tx = InvokeTransaction::from_hex(&submitted).unwrap();
        assert_eq!(tx.hash(), hash);
        assert!(tx.verify_signatures());
    }

    #[test]
    fn refused_submission_yields_no_hash() {
        let recorder = Arc::new(RecordingSubmitter::rejecting());
        let (svc, x, y) = service(recorder.clone());
        let err = svc.send_transfer("ont", &x, "px", &y, 1, 500).unwrap_err();
        assert!(matches!(err, TransferError::SubmissionRejected));
        assert_eq!(recorder.submitted().len(), 1);
    }

    #[test]
    fn transport_failure_is_reported_as_rejection() {
        let (svc, x, y) = service(Arc::new(FailingSubmitter));
        let err = svc
            .send_transfer_to_many("ong", &x, "px", &[&y], &[1], 500)
            .unwrap_err();
        assert!(matches!(err, TransferError::SubmissionRejected));
    }

    #[test]
    fn validation_failure_never_submits() {
        let recorder = Arc::new(RecordingSubmitter::accepting());
        let (svc, x, y) = service(recorder.clone());
        assert!(svc.send_transfer("btc", &x, "px", &y, 1, 500).is_err());
        assert!(svc.send_ong_transfer_from(&x, "px", &y, 0, 500).is_err());
        assert!(recorder.submitted().is_empty());
    }

    #[test]
    fn fan_in_submission_carries_every_signature() {
        let recorder = Arc::new(RecordingSubmitter::accepting());
        let (svc, x, y) = service(recorder.clone());
        svc.send_transfer_from_many("ont", &[&x, &y], &["px", "py"], &x, &[1, 2], 500)
            .unwrap();
        let tx = InvokeTransaction::from_hex(&recorder.last().unwrap()).unwrap();
        assert_eq!(tx.sigs.len(), 2);
        assert!(tx.verify_signatures());
    }

    #[test]
    fn ong_withdrawal_spends_from_ont_contract() {
        let recorder = Arc::new(RecordingSubmitter::accepting());
        let (svc, x, y) = service(recorder.clone());
        svc.send_ong_transfer_from(&x, "px", &y, 10, 500).unwrap();
        let tx = InvokeTransaction::from_hex(&recorder.last().unwrap()).unwrap();
        let args = TransferFrom::from_bytes(&tx.payload.args).unwrap();
        assert_eq!(args.from, Address::from_hex(ONT_CONTRACT_HEX).unwrap());
        assert_eq!(args.amount, 10);
    }
}
