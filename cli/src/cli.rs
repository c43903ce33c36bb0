//! # CLI Interface
//!
//! Argument structure for `asset-tx`, built with `clap` derive. Every
//! transfer subcommand runs offline: it builds and signs the transaction
//! and prints it instead of broadcasting it.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Builds and signs native-asset transfers.
#[derive(Parser, Debug)]
#[command(
    name = "asset-tx",
    about = "Offline builder and signer for ont/ong transfers",
    version,
    propagate_version = true
)]
pub struct AssetTxCli {
    /// Builder configuration file (JSON). Built-in defaults when omitted.
    #[arg(long, short = 'c', global = true, env = "ASSET_TX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Keystore file (JSON).
    #[arg(
        long,
        short = 'k',
        global = true,
        env = "ASSET_TX_KEYSTORE",
        default_value = "keystore.json"
    )]
    pub keystore: PathBuf,

    /// Log output format.
    #[arg(long, global = true, env = "ASSET_TX_LOG", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// One sender pays one receiver.
    Transfer(TransferArgs),
    /// One sender pays many receivers in a single transaction.
    TransferToMany(TransferToManyArgs),
    /// Many senders pay one receiver; every sender signs.
    TransferFromMany(TransferFromManyArgs),
    /// Spend ONG from an allowance holder.
    TransferFrom(TransferFromArgs),
    /// Look up a key type by wire label (e.g. `0x14`) or name (e.g. `eddsa`).
    KeyType(KeyTypeArgs),
    /// Create a new account in the keystore file.
    NewAccount(NewAccountArgs),
    /// Decode a signed transaction from hex.
    Inspect(InspectArgs),
}

/// Options shared by every transaction-producing subcommand.
#[derive(Args, Debug, Clone)]
pub struct TxOptions {
    /// Gas budget for the whole transaction.
    #[arg(long, default_value_t = native_asset::config::DEFAULT_GAS_LIMIT)]
    pub gas_limit: u64,

    /// Also print the JSON-RPC `sendrawtransaction` request body.
    #[arg(long)]
    pub rpc_body: bool,

    /// Mark the JSON-RPC request as pre-execution only.
    #[arg(long, requires = "rpc_body")]
    pub pre_exec: bool,
}

#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Asset short name: `ont` or `ong`.
    #[arg(long, short = 'a')]
    pub asset: String,
    #[arg(long)]
    pub from: String,
    /// Secret that unlocks `--from`.
    #[arg(long, env = "ASSET_TX_SECRET", hide_env_values = true)]
    pub secret: String,
    #[arg(long)]
    pub to: String,
    /// Amount in display units.
    #[arg(long, allow_hyphen_values = true)]
    pub amount: i64,
    #[command(flatten)]
    pub tx: TxOptions,
}

#[derive(Args, Debug)]
pub struct TransferToManyArgs {
    #[arg(long, short = 'a')]
    pub asset: String,
    #[arg(long)]
    pub from: String,
    #[arg(long, env = "ASSET_TX_SECRET", hide_env_values = true)]
    pub secret: String,
    /// Receivers, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    pub to: Vec<String>,
    /// Amounts, comma separated, one per receiver.
    #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
    pub amounts: Vec<i64>,
    #[command(flatten)]
    pub tx: TxOptions,
}

#[derive(Args, Debug)]
pub struct TransferFromManyArgs {
    #[arg(long, short = 'a')]
    pub asset: String,
    /// Senders, comma separated. The first one pays gas.
    #[arg(long, value_delimiter = ',', required = true)]
    pub from: Vec<String>,
    /// Secrets, comma separated, one per sender.
    #[arg(long, value_delimiter = ',', required = true)]
    pub secrets: Vec<String>,
    #[arg(long)]
    pub to: String,
    /// Amounts, comma separated, one per sender.
    #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
    pub amounts: Vec<i64>,
    #[command(flatten)]
    pub tx: TxOptions,
}

#[derive(Args, Debug)]
pub struct TransferFromArgs {
    #[arg(long)]
    pub from: String,
    #[arg(long, env = "ASSET_TX_SECRET", hide_env_values = true)]
    pub secret: String,
    /// Allowance holder as 40 hex chars. Defaults to the ONT contract.
    #[arg(long)]
    pub spender: Option<String>,
    #[arg(long)]
    pub to: String,
    #[arg(long, allow_hyphen_values = true)]
    pub amount: i64,
    #[command(flatten)]
    pub tx: TxOptions,
}

#[derive(Args, Debug)]
pub struct KeyTypeArgs {
    /// `0x12`-style label or a name (`ecdsa`, `sm2`, `eddsa`).
    pub query: String,
}

#[derive(Args, Debug)]
pub struct NewAccountArgs {
    #[arg(long, env = "ASSET_TX_SECRET", hide_env_values = true)]
    pub secret: String,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Hex wire form of a transaction.
    pub hex: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        AssetTxCli::command().debug_assert();
    }

    #[test]
    fn parses_comma_separated_lists() {
        let cli = AssetTxCli::try_parse_from([
            "asset-tx",
            "transfer-to-many",
            "--asset",
            "ont",
            "--from",
            "AX",
            "--secret",
            "pw",
            "--to",
            "AY,AZ",
            "--amounts",
            "10,20",
        ])
        .unwrap();
        match cli.command {
            Commands::TransferToMany(args) => {
                assert_eq!(args.to, vec!["AY", "AZ"]);
                assert_eq!(args.amounts, vec![10, 20]);
                assert_eq!(args.tx.gas_limit, 20_000);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn pre_exec_requires_rpc_body() {
        let result = AssetTxCli::try_parse_from([
            "asset-tx",
            "transfer",
            "--asset",
            "ont",
            "--from",
            "AX",
            "--secret",
            "pw",
            "--to",
            "AY",
            "--amount",
            "1",
            "--pre-exec",
        ]);
        assert!(result.is_err());
    }
}
