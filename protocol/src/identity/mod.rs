//! # Identity Module
//!
//! Ledger identities: the 20-byte [`Address`] and the [`AddressCodec`]
//! seam for decoding textual addresses and deriving them from public keys.

pub mod address;

pub use address::{Address, AddressCodec, AddressError, Base58Codec, ADDRESS_VERSION};
