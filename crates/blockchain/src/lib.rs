pub mod binding;
pub mod endpoint;
pub mod error;
pub mod nonce;
pub mod pipeline;
pub mod rpc;
pub mod signer;
pub mod txtools;

pub use binding::ContractBinding;
pub use endpoint::ChainEndpoint;
pub use error::{EncodingError, RpcFailure, SubmitError};
pub use nonce::NonceStrategy;
pub use pipeline::{BroadcastReceipt, PollPolicy, ReceiptStatus, TxPipeline, TxPolicy};
pub use rpc::{ChainRpc, ProviderRpc, ReceiptInfo};
pub use signer::{CallSigner, SigningIdentity};
pub use txtools::{GasPolicy, SignedTransaction, UnsignedCall};
