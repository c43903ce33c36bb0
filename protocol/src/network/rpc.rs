//! # JSON-RPC message types
//!
//! Request and response shapes for handing a signed transaction to a node
//! over JSON-RPC 2.0, and an [`RpcSubmitter`] that drives them over any
//! [`RpcTransport`]. The transport itself (HTTP, socket) belongs to the
//! caller.
//!
//! | Method               | Params                     | Result      |
//! |----------------------|----------------------------|-------------|
//! | `sendrawtransaction` | `[signed_hex]`             | tx hash     |
//! | `sendrawtransaction` | `[signed_hex, 1]` (pre-exec) | exec result |

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::submit::{SubmitError, Submitter};

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpcMethod {
    /// Submit a hex-encoded signed transaction.
    #[serde(rename = "sendrawtransaction")]
    SendRawTransaction,
}

// ---------------------------------------------------------------------------
// Request / Response
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Always "2.0".
    pub jsonrpc: String,
    pub id: serde_json::Value,
    pub method: RpcMethod,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl RpcRequest {
    pub fn new(id: serde_json::Value, method: RpcMethod, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method,
            params,
        }
    }

    /// `sendrawtransaction` for a signed hex payload. With `pre_exec` the
    /// node simulates the call instead of broadcasting it.
    pub fn send_raw_transaction(id: u64, signed_hex: &str, pre_exec: bool) -> Self {
        let params = if pre_exec {
            serde_json::json!([signed_hex, 1])
        } else {
            serde_json::json!([signed_hex])
        };
        Self::new(serde_json::json!(id), RpcMethod::SendRawTransaction, params)
    }

    /// Serialized request body.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A JSON-RPC 2.0 response. Exactly one of `result` and `error` is set by
/// a conforming node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Parses a response body.
    pub fn from_json(body: &str) -> Result<Self, SubmitError> {
        serde_json::from_str(body).map_err(|e| SubmitError::MalformedResponse(e.to_string()))
    }

    /// Maps a `sendrawtransaction` response onto the [`Submitter`] contract.
    ///
    /// A result means accepted. A node error with a rejection code means
    /// refused. Any other error is surfaced as [`SubmitError::Node`].
    ///
    /// [`Submitter`]: super::Submitter
    pub fn into_submission(self) -> Result<bool, SubmitError> {
        match (self.result, self.error) {
            (_, Some(err)) if err.code == RpcError::TRANSACTION_REJECTED => Ok(false),
            (_, Some(err)) => Err(SubmitError::Node {
                code: err.code,
                message: err.message,
            }),
            (Some(_), None) => Ok(true),
            (None, None) => Err(SubmitError::MalformedResponse(
                "response carries neither result nor error".to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub const INTERNAL_ERROR: i32 = -32603;
    /// The node refused the transaction.
    pub const TRANSACTION_REJECTED: i32 = -32003;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn transaction_rejected(reason: impl Into<String>) -> Self {
        Self::new(Self::TRANSACTION_REJECTED, reason)
    }
}

// ---------------------------------------------------------------------------
// Submitter
// ---------------------------------------------------------------------------

/// Carries one JSON-RPC request body to a node and returns the raw
/// response body.
pub trait RpcTransport: Send + Sync {
    fn call(&self, body: &str) -> Result<String, SubmitError>;
}

/// [`Submitter`] that sends `sendrawtransaction` over an [`RpcTransport`].
pub struct RpcSubmitter<T> {
    transport: T,
    pre_exec: bool,
    next_id: AtomicU64,
}

impl<T: RpcTransport> RpcSubmitter<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            pre_exec: false,
            next_id: AtomicU64::new(1),
        }
    }

    /// Asks the node to simulate instead of broadcast.
    pub fn pre_exec(mut self, enabled: bool) -> Self {
        self.pre_exec = enabled;
        self
    }
}

impl<T: RpcTransport> Submitter for RpcSubmitter<T> {
    fn submit(&self, signed_hex: &str) -> Result<bool, SubmitError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest::send_raw_transaction(id, signed_hex, self.pre_exec)
            .to_json()
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        let reply = self.transport.call(&body)?;
        tracing::debug!(id, "sendrawtransaction answered");
        RpcResponse::from_json(&reply)?.into_submission()
    }
}
