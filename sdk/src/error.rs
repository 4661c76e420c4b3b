use blockchain::{EncodingError, SubmitError};
use thiserror::Error;

use crate::delegation::CompletionStatus;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config value: {0}")]
    InvalidValue(String),
    #[error("missing config: {0}")]
    Missing(String),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("client RPC error: {0}")]
    Rpc(String),

    #[error("client provider error: {0}")]
    Provider(String),
}

#[derive(Debug, Error)]
pub enum DelegationError {
    #[error("delegation is not configured: {0}")]
    NotConfigured(String),

    /// The mech channel failed before producing an answer. Not retried.
    #[error("mech channel error: {0}")]
    Channel(String),

    #[error("malformed mech response: {0}")]
    Malformed(String),

    /// The on-chain request was sent but no result appeared before the deadline.
    /// Re-poll with `request_id`; never resubmit.
    #[error("no result for request {request_id} after {attempts} polls")]
    Timeout { request_id: String, attempts: u32 },

    #[error("failed to post marketplace request: {0}")]
    Submit(#[from] SubmitError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("decision {request_id} is not delivered ({status:?})")]
    Incomplete {
        request_id: String,
        status: CompletionStatus,
    },

    #[error("unusable decision payload: {0}")]
    Payload(String),

    #[error("expected {expected} selections, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("selection {role} is not a valid {expected}")]
    ValueType { role: String, expected: String },

    #[error("selection {role} repeats an earlier value")]
    Duplicate { role: String },

    #[error("unsupported target signature: {0}")]
    Signature(String),
}

impl From<EncodingError> for MappingError {
    fn from(e: EncodingError) -> Self {
        MappingError::Signature(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}
