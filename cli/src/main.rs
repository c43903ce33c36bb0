// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # asset-tx
//!
//! Entry point for the `asset-tx` binary. Parses arguments, initializes
//! logging, runs one subcommand and prints its result as JSON on stdout.
//!
//! - `transfer`            - one sender, one receiver
//! - `transfer-to-many`    - one sender, many receivers
//! - `transfer-from-many`  - many senders, one receiver
//! - `transfer-from`       - spend ONG from an allowance holder
//! - `key-type`            - key-type label lookup
//! - `new-account`         - add an account to the keystore file
//! - `inspect`             - decode a signed transaction
//!
//! Nothing is broadcast. Transfer commands print the signed hex and the
//! content hash; `--rpc-body` adds the request a node would expect.

mod cli;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;

use cli::{AssetTxCli, Commands};
use commands::Session;

fn main() -> Result<()> {
    let cli = AssetTxCli::parse();
    logging::init_logging("asset_tx=info,native_asset=warn", cli.log_format);

    match &cli.command {
        Commands::KeyType(args) => print_json(&commands::key_type(args)?),
        Commands::NewAccount(args) => {
            let address = commands::new_account(&cli.keystore, args)?;
            print_json(&serde_json::json!({ "address": address }))
        }
        Commands::Inspect(args) => print_json(&commands::inspect(args)?),
        Commands::Transfer(args) => print_json(&session(&cli)?.transfer(args)?),
        Commands::TransferToMany(args) => print_json(&session(&cli)?.transfer_to_many(args)?),
        Commands::TransferFromMany(args) => {
            print_json(&session(&cli)?.transfer_from_many(args)?)
        }
        Commands::TransferFrom(args) => print_json(&session(&cli)?.transfer_from(args)?),
    }
}

fn session(cli: &AssetTxCli) -> Result<Session> {
    Session::load(cli.config.as_deref(), &cli.keystore)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
