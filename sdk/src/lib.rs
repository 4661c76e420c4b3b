pub mod client;
pub mod config;
pub mod contract;
pub mod delegation;
pub mod error;
pub mod mapper;
pub mod prompt;
mod validators;

pub use alloy::primitives::{Address, B256, U256};
pub use blockchain::{
    BroadcastReceipt, ContractBinding, NonceStrategy, PollPolicy, ReceiptStatus, SubmitError,
};

pub use client::Client;
pub use config::{Config, ConfigBuilder};
pub use delegation::{
    CompletionStatus, DecisionClient, DecisionOutcome, DecisionRequest, DecisionResult,
    DelegationMode, MechChannel,
};
pub use error::{ClientError, ConfigError, DelegationError, MappingError, OperatorError};
pub use mapper::ArgumentMapper;
