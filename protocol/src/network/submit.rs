//! Submission of signed transactions to the network.
//!
//! The core never talks to a transport directly. It hands the hex wire
//! form to a [`Submitter`] and only cares whether the network said yes.

use parking_lot::Mutex;
use thiserror::Error;

/// Transport-level submission failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("node returned error {code}: {message}")]
    Node { code: i32, message: String },

    #[error("malformed node response: {0}")]
    MalformedResponse(String),
}

/// Hands a signed transaction to the network.
///
/// `Ok(true)` means the network accepted the transaction, `Ok(false)` that
/// it refused it. Neither outcome is retried by the caller.
pub trait Submitter: Send + Sync {
    fn submit(&self, signed_hex: &str) -> Result<bool, SubmitError>;
}

/// In-process submitter that records everything it is handed.
///
/// Meant for dry runs and tests only: the record is never pruned, so it
/// grows with every submission. It answers every submission with the same
/// verdict.
#[derive(Debug)]
pub struct RecordingSubmitter {
    accept: bool,
    submitted: Mutex<Vec<String>>,
}

impl RecordingSubmitter {
    /// A submitter that accepts every transaction.
    pub fn accepting() -> Self {
        Self {
            accept: true,
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// A submitter that refuses every transaction.
    pub fn rejecting() -> Self {
        Self {
            accept: false,
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of submitted hex payloads, oldest first.
    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.submitted.lock().last().cloned()
    }
}

impl Default for RecordingSubmitter {
    fn default() -> Self {
        Self::accepting()
    }
}

impl Submitter for RecordingSubmitter {
    fn submit(&self, signed_hex: &str) -> Result<bool, SubmitError> {
        self.submitted.lock().push(signed_hex.to_string());
        tracing::debug!(bytes = signed_hex.len() / 2, accept = self.accept, "recorded submission");
        Ok(self.accept)
    }
}
