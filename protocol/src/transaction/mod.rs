//! # Transaction Module
//!
//! Construction, signing and submission of native-asset transfers. Every
//! funds movement is a [`TransferState`] inside a `"transfer"` invocation,
//! or a [`TransferFrom`] inside a `"transferFrom"` invocation, wrapped in
//! an [`InvokeTransaction`].
//!
//! ## Architecture
//!
//! ```text
//! asset.rs      - Asset table, precision scaling
//! types.rs      - TransferState, Transfers, TransferFrom, VmKind
//! encoding.rs   - Varint / little-endian wire primitives
//! invocation.rs - InvokeTransaction, payload, signature slots, content hash
//! builder.rs    - TransferBuilder: single, fan-out, fan-in, delegated
//! signing.rs    - Positional multi-signature assembly
//! service.rs    - AssetTransfers: build + sign + submit in one call
//! error.rs      - TransferError
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build** with [`TransferBuilder`], which returns a
//!    [`PreparedTransfer`]: the unsigned transaction plus its signer groups.
//! 2. **Sign** with [`sign_transaction`]; one slot per group, in order.
//! 3. **Submit** the hex wire form through a [`Submitter`]. The content
//!    hash is the caller's handle on the transaction.
//!
//! Amounts are `i64` base units after precision scaling. There is no
//! floating point anywhere near them.
//!
//! [`Submitter`]: crate::network::Submitter

pub mod asset;
pub mod builder;
pub mod encoding;
pub mod error;
pub mod invocation;
pub mod service;
pub mod signing;
pub mod types;

pub use asset::{AssetDescriptor, AssetRegistry};
pub use builder::{PreparedTransfer, SignerGroup, TransferBuilder};
pub use encoding::DecodeError;
pub use error::TransferError;
pub use invocation::{InvokePayload, InvokeTransaction, SignatureSlot};
pub use service::AssetTransfers;
pub use signing::{sign_prepared, sign_transaction};
pub use types::{TransferFrom, TransferState, Transfers, VmKind};
