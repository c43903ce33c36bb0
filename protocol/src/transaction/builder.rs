//! Construction of native-asset transfer transactions.
//!
//! The [`TransferBuilder`] turns human-readable addresses and display
//! amounts into an unsigned [`InvokeTransaction`] plus the ordered signer
//! groups that must authorize it. It does not sign and does not submit;
//! that happens in [`super::signing`] and [`super::service`].
//!
//! Every entry point validates its inputs (asset name, list lengths,
//! amounts) before the credential resolver is called, so a bad request
//! never unlocks an account.

use std::fmt;
use std::sync::Arc;

use super::asset::{AssetDescriptor, AssetRegistry};
use super::error::TransferError;
use super::invocation::InvokeTransaction;
use super::types::{TransferFrom, TransferState, Transfers};
use crate::config::{BuilderConfig, ConfigError, METHOD_TRANSFER, METHOD_TRANSFER_FROM, ONT_ASSET};
use crate::crypto::keys::Signer;
use crate::identity::{Address, AddressCodec};
use crate::wallet::{CredentialResolver, ResolvedAccount};

/// Signers that jointly fill one signature slot.
pub type SignerGroup = Vec<Arc<dyn Signer>>;

// ---------------------------------------------------------------------------
// PreparedTransfer
// ---------------------------------------------------------------------------

/// An unsigned transaction together with the signer groups that must sign
/// it, in slot order.
#[derive(Clone)]
pub struct PreparedTransfer {
    pub tx: InvokeTransaction,
    pub signers: Vec<SignerGroup>,
}

impl PreparedTransfer {
    /// Content hash of the transaction. Stable across signing.
    pub fn hash(&self) -> String {
        self.tx.hash()
    }
}

impl fmt::Debug for PreparedTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: Vec<usize> = self.signers.iter().map(Vec::len).collect();
        f.debug_struct("PreparedTransfer")
            .field("tx", &self.tx)
            .field("signer_groups", &groups)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// TransferBuilder
// ---------------------------------------------------------------------------

/// Builds `"transfer"` and `"transferFrom"` invocations against the
/// registered native assets.
///
/// The builder holds no mutable state. Every method takes `&self` and can
/// be called from many threads at once.
pub struct TransferBuilder {
    resolver: Arc<dyn CredentialResolver>,
    codec: Arc<dyn AddressCodec>,
    assets: AssetRegistry,
    gas_price: u64,
    strict_amounts: bool,
}

impl TransferBuilder {
    /// Creates a builder over the injected collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the asset table in `config` is invalid.
    pub fn new(
        resolver: Arc<dyn CredentialResolver>,
        codec: Arc<dyn AddressCodec>,
        config: &BuilderConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            resolver,
            codec,
            assets: AssetRegistry::from_config(config)?,
            gas_price: config.gas_price,
            strict_amounts: config.strict_amounts,
        })
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn codec(&self) -> &Arc<dyn AddressCodec> {
        &self.codec
    }

    /// Looks up a registered asset by short name.
    pub fn resolve_asset(&self, name: &str) -> Result<&AssetDescriptor, TransferError> {
        self.assets.resolve(name)
    }

    /// One transfer of `raw_amount` display units from `sender_addr` to
    /// `receiver_addr`.
    ///
    /// Steps run in a fixed order: asset lookup, scaling, credential
    /// resolution, then receiver decoding. The first failure wins.
    pub fn build_transfer(
        &self,
        asset: &str,
        sender_addr: &str,
        secret: &str,
        receiver_addr: &str,
        raw_amount: i64,
        gas_limit: u64,
    ) -> Result<PreparedTransfer, TransferError> {
        let descriptor = self.resolve_asset(asset)?;
        self.check_amount(raw_amount)?;
        let amount = descriptor.scale(raw_amount)?;

        let (sender, account) = self.unlock(sender_addr, secret)?;
        let receiver = self.decode(receiver_addr)?;

        let batch = Transfers::new(vec![TransferState::new(sender, receiver, amount)]);
        tracing::debug!(asset, %sender, %receiver, amount, "transfer record built");
        Ok(self.finish_transfer(descriptor, batch, sender, gas_limit, vec![vec![account.signer]]))
    }

    /// Fan-out: one sender pays every receiver in a single invocation.
    ///
    /// Record `i` pays `amounts[i]` to `receivers[i]`. The sender is
    /// unlocked exactly once and signs alone.
    pub fn build_transfer_to_many<S: AsRef<str>>(
        &self,
        asset: &str,
        sender_addr: &str,
        secret: &str,
        receivers: &[S],
        amounts: &[i64],
        gas_limit: u64,
    ) -> Result<PreparedTransfer, TransferError> {
        let descriptor = self.resolve_asset(asset)?;
        if receivers.len() != amounts.len() {
            return Err(TransferError::LengthMismatch {
                left: "receivers",
                left_len: receivers.len(),
                right: "amounts",
                right_len: amounts.len(),
            });
        }
        if receivers.is_empty() {
            return Err(TransferError::EmptyBatch);
        }
        for &raw in amounts {
            self.check_amount(raw)?;
        }
        let scaled = descriptor.scale_all(amounts)?;

        let (sender, account) = self.unlock(sender_addr, secret)?;

        let states = receivers
            .iter()
            .zip(scaled)
            .map(|(receiver_addr, amount)| {
                let receiver = self.decode(receiver_addr.as_ref())?;
                tracing::debug!(asset, %sender, %receiver, amount, "transfer record built");
                Ok(TransferState::new(sender, receiver, amount))
            })
            .collect::<Result<Vec<_>, TransferError>>()?;

        Ok(self.finish_transfer(
            descriptor,
            Transfers::new(states),
            sender,
            gas_limit,
            vec![vec![account.signer]],
        ))
    }

    /// Fan-in: many senders pay one receiver in a single invocation.
    ///
    /// Senders are unlocked sequentially in the given order and the first
    /// failure aborts the whole batch. The first sender pays gas. The
    /// returned signer groups hold one signer per sender index, in sender
    /// order, because slots are matched positionally.
    pub fn build_transfer_from_many<S: AsRef<str>, P: AsRef<str>>(
        &self,
        asset: &str,
        senders: &[S],
        secrets: &[P],
        receiver_addr: &str,
        amounts: &[i64],
        gas_limit: u64,
    ) -> Result<PreparedTransfer, TransferError> {
        let descriptor = self.resolve_asset(asset)?;
        if senders.len() != secrets.len() {
            return Err(TransferError::LengthMismatch {
                left: "senders",
                left_len: senders.len(),
                right: "secrets",
                right_len: secrets.len(),
            });
        }
        if senders.len() != amounts.len() {
            return Err(TransferError::LengthMismatch {
                left: "senders",
                left_len: senders.len(),
                right: "amounts",
                right_len: amounts.len(),
            });
        }
        if senders.is_empty() {
            return Err(TransferError::EmptyBatch);
        }
        for &raw in amounts {
            self.check_amount(raw)?;
        }
        let scaled = descriptor.scale_all(amounts)?;

        let unlocked = senders
            .iter()
            .zip(secrets)
            .map(|(addr, secret)| self.unlock(addr.as_ref(), secret.as_ref()))
            .collect::<Result<Vec<_>, TransferError>>()?;

        let receiver = self.decode(receiver_addr)?;

        let payer = unlocked[0].0;
        let mut states = Vec::with_capacity(unlocked.len());
        let mut signers = Vec::with_capacity(unlocked.len());
        for ((sender, account), amount) in unlocked.into_iter().zip(scaled) {
            tracing::debug!(asset, %sender, %receiver, amount, "transfer record built");
            states.push(TransferState::new(sender, receiver, amount));
            signers.push(vec![account.signer]);
        }

        Ok(self.finish_transfer(descriptor, Transfers::new(states), payer, gas_limit, signers))
    }

    /// Delegated transfer: `sender_addr` moves `raw_amount` out of the
    /// allowance `spender` holds and pays it to `receiver_addr`.
    ///
    /// The call is addressed to the ONT contract and `raw_amount` is taken
    /// as base units; no precision scaling is applied. A non-positive
    /// amount fails with [`TransferError::InvalidAmount`] before anything
    /// else happens.
    pub fn build_transfer_from(
        &self,
        sender_addr: &str,
        secret: &str,
        spender: Address,
        receiver_addr: &str,
        raw_amount: i64,
        gas_limit: u64,
    ) -> Result<PreparedTransfer, TransferError> {
        if raw_amount <= 0 {
            return Err(TransferError::InvalidAmount(raw_amount));
        }
        let descriptor = self.resolve_asset(ONT_ASSET)?;
        let amount = raw_amount;

        let (sender, account) = self.unlock(sender_addr, secret)?;
        let receiver = self.decode(receiver_addr)?;

        let args = TransferFrom {
            sender,
            from: spender,
            to: receiver,
            amount,
        };
        let tx = InvokeTransaction::new_native(
            descriptor.contract,
            METHOD_TRANSFER_FROM,
            args.to_bytes(),
            sender,
            self.gas_price,
            gas_limit,
        );
        tracing::info!(
            asset = %descriptor.name,
            %spender,
            amount,
            tx_hash = %tx.hash(),
            "delegated transfer built"
        );
        Ok(PreparedTransfer {
            tx,
            signers: vec![vec![account.signer]],
        })
    }

    // -- helpers ------------------------------------------------------------

    fn check_amount(&self, raw_amount: i64) -> Result<(), TransferError> {
        if self.strict_amounts && raw_amount <= 0 {
            return Err(TransferError::InvalidAmount(raw_amount));
        }
        Ok(())
    }

    /// Unlocks an account and derives its ledger identity from the public
    /// key it returns.
    fn unlock(
        &self,
        address: &str,
        secret: &str,
    ) -> Result<(Address, ResolvedAccount), TransferError> {
        let account = self
            .resolver
            .resolve(address, secret)
            .map_err(|source| TransferError::CredentialResolution {
                address: address.to_string(),
                source,
            })?;
        let identity = self.codec.derive_address(&account.public_key);
        Ok((identity, account))
    }

    fn decode(&self, address: &str) -> Result<Address, TransferError> {
        self.codec
            .decode_address(address)
            .map_err(|source| TransferError::AddressDecode {
                address: address.to_string(),
                source,
            })
    }

    fn finish_transfer(
        &self,
        descriptor: &AssetDescriptor,
        batch: Transfers,
        payer: Address,
        gas_limit: u64,
        signers: Vec<SignerGroup>,
    ) -> PreparedTransfer {
        let records = batch.len();
        let tx = InvokeTransaction::new_native(
            descriptor.contract,
            METHOD_TRANSFER,
            batch.to_bytes(),
            payer,
            self.gas_price,
            gas_limit,
        );
        tracing::info!(
            asset = %descriptor.name,
            records,
            signer_groups = signers.len(),
            tx_hash = %tx.hash(),
            "transfer built"
        );
        PreparedTransfer { tx, signers }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
