//! # Network Module
//!
//! The boundary between transaction construction and the ledger.
//!
//! ```text
//! submit.rs  - Submitter trait, SubmitError, RecordingSubmitter
//! rpc.rs     - JSON-RPC types, RpcTransport, RpcSubmitter
//! ```
//!
//! The crate stays transport-agnostic: an HTTP or socket client lives
//! behind an [`RpcTransport`] or a [`Submitter`] supplied by the caller.

pub mod rpc;
pub mod submit;

pub use rpc::{RpcError, RpcMethod, RpcRequest, RpcResponse, RpcSubmitter, RpcTransport};
pub use submit::{RecordingSubmitter, SubmitError, Submitter};
