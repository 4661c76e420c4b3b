use alloy::{
    network::ReceiptResponse,
    primitives::{Address, B256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionReceipt,
    transports::{RpcError, TransportErrorKind},
};
use async_trait::async_trait;

use crate::{endpoint::ChainEndpoint, error::RpcFailure};

/// Minimal view of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptInfo {
    pub block_number: u64,
    pub success: bool,
}

/// The node methods the pipeline depends on.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn chain_id(&self) -> Result<u64, RpcFailure>;

    /// Transaction count of `address` including pending transactions.
    async fn transaction_count(&self, address: Address) -> Result<u64, RpcFailure>;

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, RpcFailure>;

    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<ReceiptInfo>, RpcFailure>;

    /// Whether the node knows the transaction at all (mempool or chain).
    async fn transaction_known(&self, tx_hash: B256) -> Result<bool, RpcFailure>;
}

/// [`ChainRpc`] backed by an alloy HTTP provider.
#[derive(Clone)]
pub struct ProviderRpc {
    provider: DynProvider,
}

impl ProviderRpc {
    pub async fn connect(endpoint: &ChainEndpoint) -> Result<Self, RpcFailure> {
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect(endpoint.rpc_url().as_str())
            .await
            .map_err(rpc_failure)?
            .erased();

        Ok(Self { provider })
    }
}

#[async_trait]
impl ChainRpc for ProviderRpc {
    async fn chain_id(&self) -> Result<u64, RpcFailure> {
        self.provider.get_chain_id().await.map_err(rpc_failure)
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, RpcFailure> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(rpc_failure)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, RpcFailure> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(rpc_failure)?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<ReceiptInfo>, RpcFailure> {
        let receipt: Option<TransactionReceipt> = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(rpc_failure)?;

        Ok(receipt.and_then(|r| {
            r.block_number.map(|block_number| ReceiptInfo {
                block_number,
                success: r.status(),
            })
        }))
    }

    async fn transaction_known(&self, tx_hash: B256) -> Result<bool, RpcFailure> {
        let tx = self
            .provider
            .get_transaction_by_hash(tx_hash)
            .await
            .map_err(rpc_failure)?;
        Ok(tx.is_some())
    }
}

fn rpc_failure(e: RpcError<TransportErrorKind>) -> RpcFailure {
    match e.as_error_resp() {
        Some(payload) => RpcFailure::Rejected {
            code: payload.code,
            message: payload.message.to_string(),
        },
        None => RpcFailure::Transport(e.to_string()),
    }
}
