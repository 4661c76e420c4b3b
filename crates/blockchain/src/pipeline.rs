use std::{future::Future, sync::Arc, time::Duration};

use alloy::{dyn_abi::DynSolValue, primitives::B256};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::{
    binding::ContractBinding,
    endpoint::ChainEndpoint,
    error::{Result, RpcFailure, SubmitError},
    nonce::{NonceManager, NonceStrategy},
    rpc::{ChainRpc, ProviderRpc},
    signer::CallSigner,
    txtools::{GasPolicy, UnsignedCall},
};

pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Accepted broadcast. Says nothing about inclusion; see [`TxPipeline::get_receipt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReceipt {
    pub tx_hash: B256,
    pub nonce: u64,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptStatus {
    Pending,
    Confirmed { block_number: u64, success: bool },
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub deadline: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            deadline: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxPolicy {
    pub gas: GasPolicy,
    pub rpc_timeout: Duration,
    pub nonce_strategy: NonceStrategy,
}

impl Default for TxPolicy {
    fn default() -> Self {
        Self {
            gas: GasPolicy::default(),
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
            nonce_strategy: NonceStrategy::default(),
        }
    }
}

/// Builds, signs and broadcasts contract calls against one [`ChainEndpoint`].
pub struct TxPipeline {
    endpoint: ChainEndpoint,
    rpc: Arc<dyn ChainRpc>,
    policy: TxPolicy,
    nonces: NonceManager,
}

impl TxPipeline {
    pub fn new(endpoint: ChainEndpoint, rpc: Arc<dyn ChainRpc>, policy: TxPolicy) -> Self {
        Self {
            endpoint,
            rpc,
            nonces: NonceManager::new(policy.nonce_strategy),
            policy,
        }
    }

    /// Pipeline over alloy's HTTP transport for `endpoint`.
    pub async fn connect(endpoint: ChainEndpoint, policy: TxPolicy) -> Result<Self> {
        let rpc = ProviderRpc::connect(&endpoint)
            .await
            .map_err(|e| SubmitError::Connectivity(e.to_string()))?;
        Ok(Self::new(endpoint, Arc::new(rpc), policy))
    }

    pub fn endpoint(&self) -> &ChainEndpoint {
        &self.endpoint
    }

    pub fn policy(&self) -> &TxPolicy {
        &self.policy
    }

    /// Submits `function(args)` on `binding`, signed by `signer`.
    ///
    /// A rejected or timed-out broadcast is never retried here.
    pub async fn submit(
        &self,
        binding: &ContractBinding,
        function: &str,
        args: &[DynSolValue],
        signer: &dyn CallSigner,
    ) -> Result<BroadcastReceipt> {
        self.check_connectivity().await?;

        let input = binding.encode_call(function, args)?;
        let address = signer.address();

        let lease = self
            .timed(
                "nonce fetch",
                self.nonces
                    .lease(self.rpc.as_ref(), self.endpoint.chain_id(), address),
            )
            .await?
            .map_err(|e| SubmitError::from_rpc("nonce fetch", e))?;

        let call = UnsignedCall::new(
            binding.address(),
            input,
            self.endpoint.chain_id(),
            self.policy.gas,
            lease.nonce(),
        );
        debug!(
            "built {function} call to {} from {address} with nonce {}",
            call.to, call.nonce
        );

        let signed = signer.sign_call(&call)?;

        let node_hash = self
            .timed("broadcast", self.rpc.send_raw_transaction(signed.raw()))
            .await?
            .map_err(|e| match e {
                RpcFailure::Rejected { message, .. } => SubmitError::Rejection { reason: message },
                RpcFailure::Transport(message) => SubmitError::Transport {
                    step: "broadcast",
                    message,
                },
            })?;
        lease.commit();

        if node_hash != signed.hash() {
            warn!(
                "endpoint reported hash {node_hash} for transaction {}",
                signed.hash()
            );
        }
        info!(
            "{function} broadcast on {}: tx {} nonce {}",
            self.endpoint,
            signed.hash(),
            call.nonce
        );

        Ok(BroadcastReceipt {
            tx_hash: signed.hash(),
            nonce: call.nonce,
            submitted_at: Utc::now(),
        })
    }

    pub async fn get_receipt(&self, tx_hash: B256) -> Result<ReceiptStatus> {
        let receipt = self
            .timed("receipt lookup", self.rpc.transaction_receipt(tx_hash))
            .await?
            .map_err(|e| SubmitError::from_rpc("receipt lookup", e))?;
        if let Some(receipt) = receipt {
            return Ok(ReceiptStatus::Confirmed {
                block_number: receipt.block_number,
                success: receipt.success,
            });
        }

        let known = self
            .timed("transaction lookup", self.rpc.transaction_known(tx_hash))
            .await?
            .map_err(|e| SubmitError::from_rpc("transaction lookup", e))?;
        Ok(if known {
            ReceiptStatus::Pending
        } else {
            ReceiptStatus::NotFound
        })
    }

    /// Polls [`Self::get_receipt`] until the transaction is mined or the deadline passes.
    pub async fn wait_for_receipt(&self, tx_hash: B256, poll: PollPolicy) -> Result<ReceiptStatus> {
        let started = tokio::time::Instant::now();
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.get_receipt(tx_hash).await {
                Ok(status @ ReceiptStatus::Confirmed { .. }) => return Ok(status),
                Ok(status) => debug!("tx {tx_hash} is {status:?} after {attempts} polls"),
                Err(e) if e.is_retryable() => warn!("receipt poll for {tx_hash} failed: {e}"),
                Err(e) => return Err(e),
            }
            if started.elapsed() + poll.interval > poll.deadline {
                return Err(SubmitError::ConfirmationTimeout { tx_hash, attempts });
            }
            tokio::time::sleep(poll.interval).await;
        }
    }

    async fn check_connectivity(&self) -> Result<()> {
        let chain_id = self
            .timed("connectivity check", self.rpc.chain_id())
            .await
            .map_err(|e| SubmitError::Connectivity(e.to_string()))?
            .map_err(|e| SubmitError::Connectivity(e.to_string()))?;

        if chain_id != self.endpoint.chain_id() {
            return Err(SubmitError::ChainMismatch {
                expected: self.endpoint.chain_id(),
                actual: chain_id,
            });
        }
        Ok(())
    }

    async fn timed<F: Future>(&self, step: &'static str, fut: F) -> Result<F::Output> {
        tokio::time::timeout(self.policy.rpc_timeout, fut)
            .await
            .map_err(|_| SubmitError::Timeout {
                step,
                timeout: self.policy.rpc_timeout,
            })
    }
}
