use std::time::Duration;

use alloy::primitives::B256;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SubmitError>;

/// Failure reported by a [`ChainRpc`](crate::rpc::ChainRpc) implementation.
#[derive(Debug, Clone, Error)]
pub enum RpcFailure {
    /// The endpoint answered with a JSON-RPC error object.
    #[error("endpoint error {code}: {message}")]
    Rejected { code: i64, message: String },

    /// The request never produced a JSON-RPC answer.
    #[error("transport error: {0}")]
    Transport(String),
}

/// The call could not be resolved against the interface descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("function {function} takes {expected:?} arguments, got {actual}")]
    ArityMismatch {
        function: String,
        /// Arity of every overload, ascending.
        expected: Vec<usize>,
        actual: usize,
    },

    #[error("argument {position} of {function} is not a valid {expected}")]
    TypeMismatch {
        function: String,
        position: usize,
        expected: String,
    },

    #[error("invalid interface descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("ABI error: {0}")]
    Abi(String),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    /// The endpoint could not be reached at all. Not retried.
    #[error("endpoint unreachable: {0}")]
    Connectivity(String),

    #[error("endpoint serves chain {actual}, expected {expected}")]
    ChainMismatch { expected: u64, actual: u64 },

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// The endpoint refused the signed transaction; `reason` is its message verbatim.
    #[error("transaction rejected: {reason}")]
    Rejection { reason: String },

    #[error("{step} timed out after {timeout:?}")]
    Timeout {
        step: &'static str,
        timeout: Duration,
    },

    #[error("RPC/provider error during {step}: {message}")]
    Transport { step: &'static str, message: String },

    #[error("failed to sign transaction: {0}")]
    Signing(String),

    #[error("transaction {tx_hash} not confirmed after {attempts} polls")]
    ConfirmationTimeout { tx_hash: B256, attempts: u32 },

    #[error("malformed transaction payload: {0}")]
    Malformed(String),
}

impl SubmitError {
    pub(crate) fn from_rpc(step: &'static str, failure: RpcFailure) -> Self {
        SubmitError::Transport {
            step,
            message: failure.to_string(),
        }
    }

    /// Transient network failures. A caller retrying after one of these must
    /// check [`ReceiptStatus`](crate::ReceiptStatus) first, since a timed-out
    /// broadcast may still have been accepted.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubmitError::Timeout { .. } | SubmitError::Transport { .. }
        )
    }
}
