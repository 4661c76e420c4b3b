use std::{collections::HashMap, str::FromStr};

use alloy::primitives::Address;
use log::debug;
use tokio::sync::{Mutex, MutexGuard};

use crate::{error::RpcFailure, rpc::ChainRpc};

/// How the pipeline derives the nonce of the next call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NonceStrategy {
    /// Use the endpoint's pending transaction count on every submission.
    /// Concurrent submissions from one identity must be serialised by the caller.
    #[default]
    Remote,
    /// Keep a local next-nonce per identity and chain, held under a lock from
    /// fetch to broadcast and advanced only when a broadcast is accepted.
    Tracked,
}

impl FromStr for NonceStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "tracked" => Ok(Self::Tracked),
            other => Err(format!("unknown nonce strategy: {other}")),
        }
    }
}

type NonceKey = (u64, Address);

#[derive(Debug, Default)]
pub struct NonceManager {
    strategy: NonceStrategy,
    next: Mutex<HashMap<NonceKey, u64>>,
}

/// A nonce reserved for one submission.
///
/// Under [`NonceStrategy::Tracked`] the lease keeps the cache locked until it
/// is dropped, so no other submission in this process can pick the same nonce.
pub struct NonceLease<'a> {
    nonce: u64,
    slot: Option<(MutexGuard<'a, HashMap<NonceKey, u64>>, NonceKey)>,
}

impl NonceManager {
    pub fn new(strategy: NonceStrategy) -> Self {
        Self {
            strategy,
            next: Mutex::new(HashMap::new()),
        }
    }

    pub fn strategy(&self) -> NonceStrategy {
        self.strategy
    }

    pub async fn lease(
        &self,
        rpc: &dyn ChainRpc,
        chain_id: u64,
        address: Address,
    ) -> Result<NonceLease<'_>, RpcFailure> {
        match self.strategy {
            NonceStrategy::Remote => {
                let nonce = rpc.transaction_count(address).await?;
                Ok(NonceLease { nonce, slot: None })
            }
            NonceStrategy::Tracked => {
                let key = (chain_id, address);
                let guard = self.next.lock().await;
                let remote = rpc.transaction_count(address).await?;
                let cached = guard.get(&key).copied().unwrap_or(0);
                let nonce = remote.max(cached);
                if cached > remote {
                    debug!("using tracked nonce {nonce} for {address}, endpoint reports {remote}");
                }
                Ok(NonceLease {
                    nonce,
                    slot: Some((guard, key)),
                })
            }
        }
    }
}

impl NonceLease<'_> {
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Records that the transaction using this nonce was accepted.
    pub fn commit(self) {
        if let Some((mut guard, key)) = self.slot {
            guard.insert(key, self.nonce + 1);
        }
    }
}
