// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Native Asset - Transfer Construction Library
//!
//! Builds, signs and submits transfers of the ledger's two native assets,
//! `ont` and `ong`. One sender can pay many receivers in a single
//! invocation, many senders can pay one receiver with positional
//! multi-signatures, and allowance holders can be drawn on with
//! `transferFrom`.
//!
//! ## Architecture
//!
//! - **crypto** - Hashes, the key-type label registry, public keys and signers.
//! - **identity** - 20-byte ledger addresses and their textual codec.
//! - **wallet** - Credential resolution and the in-memory keystore.
//! - **transaction** - Asset table, builder, wire encoding, signing, submission.
//! - **network** - The submitter seam and JSON-RPC message types.
//! - **config** - Protocol constants and the builder configuration.
//!
//! ## Collaborators
//!
//! Key storage, address encoding and transport are injected as
//! `Arc<dyn Trait>` handles ([`wallet::CredentialResolver`],
//! [`identity::AddressCodec`], [`network::Submitter`]). The builder never
//! reaches for global state, so it can be tested with nothing but a
//! [`wallet::MemoryKeystore`] and a [`network::RecordingSubmitter`].

pub mod config;
pub mod crypto;
pub mod identity;
pub mod network;
pub mod transaction;
pub mod wallet;
