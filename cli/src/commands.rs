//! Subcommand execution.
//!
//! Transfer commands go through the same [`AssetTransfers`] entry points a
//! networked caller would use, with a [`RecordingSubmitter`] in place of a
//! transport. Whatever it records is what would have been broadcast.

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use native_asset::config::{BuilderConfig, ONT_CONTRACT_HEX};
use native_asset::crypto::KeyKind;
use native_asset::identity::{Address, AddressCodec, Base58Codec};
use native_asset::network::{RecordingSubmitter, RpcRequest};
use native_asset::transaction::{
    AssetTransfers, InvokeTransaction, TransferBuilder, TransferFrom, Transfers,
};
use native_asset::wallet::{KeystoreFile, MemoryKeystore};

use crate::cli::{
    InspectArgs, KeyTypeArgs, NewAccountArgs, TransferArgs, TransferFromArgs,
    TransferFromManyArgs, TransferToManyArgs, TxOptions,
};

/// Result of a dry-run transfer command, printed as JSON on stdout.
#[derive(Debug, Serialize)]
pub struct DryRunOutput {
    pub tx_hash: String,
    pub signed_hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_request: Option<serde_json::Value>,
}

/// Everything a transfer command needs, loaded from disk.
pub struct Session {
    service: AssetTransfers,
    recorder: Arc<RecordingSubmitter>,
}

impl Session {
    pub fn load(config_path: Option<&Path>, keystore_path: &Path) -> Result<Self> {
        let config = match config_path {
            Some(path) => BuilderConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => BuilderConfig::default(),
        };
        let codec: Arc<dyn AddressCodec> = Arc::new(Base58Codec);
        let file = KeystoreFile::load(keystore_path)
            .with_context(|| format!("failed to read keystore {}", keystore_path.display()))?;
        let keystore = MemoryKeystore::from_file(codec.clone(), &file)
            .with_context(|| format!("invalid keystore {}", keystore_path.display()))?;
        tracing::debug!(accounts = keystore.len(), "keystore loaded");

        let builder = TransferBuilder::new(Arc::new(keystore), codec, &config)
            .context("invalid builder configuration")?;
        let recorder = Arc::new(RecordingSubmitter::accepting());
        Ok(Self {
            service: AssetTransfers::new(builder, recorder.clone()),
            recorder,
        })
    }

    fn output(&self, tx_hash: String, opts: &TxOptions) -> Result<DryRunOutput> {
        let signed_hex = self
            .recorder
            .last()
            .ok_or_else(|| anyhow!("no transaction was produced"))?;
        let rpc_request = if opts.rpc_body {
            let request = RpcRequest::send_raw_transaction(1, &signed_hex, opts.pre_exec);
            Some(serde_json::to_value(request)?)
        } else {
            None
        };
        Ok(DryRunOutput {
            tx_hash,
            signed_hex,
            rpc_request,
        })
    }

    pub fn transfer(&self, args: &TransferArgs) -> Result<DryRunOutput> {
        let hash = self.service.send_transfer(
            &args.asset,
            &args.from,
            &args.secret,
            &args.to,
            args.amount,
            args.tx.gas_limit,
        )?;
        self.output(hash, &args.tx)
    }

    pub fn transfer_to_many(&self, args: &TransferToManyArgs) -> Result<DryRunOutput> {
        let hash = self.service.send_transfer_to_many(
            &args.asset,
            &args.from,
            &args.secret,
            &args.to,
            &args.amounts,
            args.tx.gas_limit,
        )?;
        self.output(hash, &args.tx)
    }

    pub fn transfer_from_many(&self, args: &TransferFromManyArgs) -> Result<DryRunOutput> {
        let hash = self.service.send_transfer_from_many(
            &args.asset,
            &args.from,
            &args.secrets,
            &args.to,
            &args.amounts,
            args.tx.gas_limit,
        )?;
        self.output(hash, &args.tx)
    }

    pub fn transfer_from(&self, args: &TransferFromArgs) -> Result<DryRunOutput> {
        let spender_hex = args.spender.as_deref().unwrap_or(ONT_CONTRACT_HEX);
        let spender = Address::from_hex(spender_hex)
            .with_context(|| format!("invalid spender {spender_hex}"))?;
        let hash = self.service.send_transfer_from(
            &args.from,
            &args.secret,
            spender,
            &args.to,
            args.amount,
            args.tx.gas_limit,
        )?;
        self.output(hash, &args.tx)
    }
}

/// Adds an account to the keystore file, creating the file if needed.
/// Returns the new address.
pub fn new_account(keystore_path: &Path, args: &NewAccountArgs) -> Result<String> {
    let codec: Arc<dyn AddressCodec> = Arc::new(Base58Codec);
    let keystore = if keystore_path.exists() {
        let file = KeystoreFile::load(keystore_path)
            .with_context(|| format!("failed to read keystore {}", keystore_path.display()))?;
        MemoryKeystore::from_file(codec, &file)?
    } else {
        MemoryKeystore::new(codec)
    };
    let address = keystore.create_account(&args.secret);
    keystore
        .to_file()
        .save(keystore_path)
        .with_context(|| format!("failed to write keystore {}", keystore_path.display()))?;
    tracing::info!(%address, path = %keystore_path.display(), "account created");
    Ok(address)
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct KeyTypeOutput {
    pub name: &'static str,
    pub label: String,
}

/// Resolves a key type from a `0x..` label or a name.
pub fn key_type(args: &KeyTypeArgs) -> Result<KeyTypeOutput> {
    let query = args.query.trim();
    let kind = match query
        .strip_prefix("0x")
        .or_else(|| query.strip_prefix("0X"))
    {
        Some(digits) => {
            let label = u8::from_str_radix(digits, 16)
                .with_context(|| format!("invalid label {query}"))?;
            KeyKind::from_label(label)?
        }
        None => query.parse::<KeyKind>()?,
    };
    Ok(KeyTypeOutput {
        name: kind.name(),
        label: format!("0x{:02x}", kind.label()),
    })
}

#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub tx_hash: String,
    pub contract: String,
    pub method: String,
    pub payer: String,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub nonce: u32,
    pub arguments: serde_json::Value,
    pub signature_slots: usize,
    pub signatures_valid: bool,
}

/// Decodes a signed transaction and reports what it does.
pub fn inspect(args: &InspectArgs) -> Result<InspectOutput> {
    let tx = InvokeTransaction::from_hex(&args.hex)?;
    let codec = Base58Codec;
    let arguments = match tx.payload.method.as_str() {
        native_asset::config::METHOD_TRANSFER => {
            let batch = Transfers::from_bytes(&tx.payload.args)?;
            serde_json::Value::Array(
                batch
                    .states
                    .iter()
                    .map(|s| {
                        serde_json::json!({
                            "from": codec.encode_address(&s.from),
                            "to": codec.encode_address(&s.to),
                            "amount": s.amount,
                        })
                    })
                    .collect(),
            )
        }
        native_asset::config::METHOD_TRANSFER_FROM => {
            let args = TransferFrom::from_bytes(&tx.payload.args)?;
            serde_json::json!({
                "sender": codec.encode_address(&args.sender),
                "from": args.from.to_hex(),
                "to": codec.encode_address(&args.to),
                "amount": args.amount,
            })
        }
        other => bail!("unsupported method {other}"),
    };
    Ok(InspectOutput {
        tx_hash: tx.hash(),
        contract: tx.payload.contract.to_hex(),
        method: tx.payload.method.clone(),
        payer: codec.encode_address(&tx.payer),
        gas_price: tx.gas_price,
        gas_limit: tx.gas_limit,
        nonce: tx.nonce,
        arguments,
        signature_slots: tx.sigs.len(),
        signatures_valid: tx.verify_signatures(),
    })
}
