#![allow(dead_code)]

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use alloy::primitives::{Address, B256, Bytes, address, keccak256};
use async_trait::async_trait;
use blockchain::{
    CallSigner, ChainEndpoint, ContractBinding, ReceiptInfo, RpcFailure, SignedTransaction,
    SigningIdentity, UnsignedCall,
};

pub const CHAIN_ID: u64 = 420420421;
pub const SLEEP_FINE: Address = address!("0x0308D149EA4cBa0Bede727e01411879a88267432");
// anvil account #0
pub const OPERATOR_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub fn endpoint() -> ChainEndpoint {
    ChainEndpoint::parse(CHAIN_ID, "http://localhost:8545").unwrap()
}

pub fn sleep_fine() -> ContractBinding {
    ContractBinding::from_signatures(
        SLEEP_FINE,
        ["function reportMissedSleep(uint256 challengeId, uint256 dayId)"],
    )
    .unwrap()
}

pub fn identity() -> SigningIdentity {
    OPERATOR_KEY.parse().unwrap()
}

/// In-memory stand-in for a node.
pub struct MockRpc {
    pub chain_id: Option<u64>,
    pub count: Mutex<u64>,
    /// Whether accepted transactions bump the reported count.
    pub count_follows_sends: bool,
    pub reject_with: Mutex<Option<String>>,
    pub sent: Mutex<Vec<Bytes>>,
    pub mined: Mutex<Vec<B256>>,
    pub count_calls: AtomicUsize,
}

impl MockRpc {
    pub fn healthy() -> Self {
        Self {
            chain_id: Some(CHAIN_ID),
            count: Mutex::new(0),
            count_follows_sends: true,
            reject_with: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
            mined: Mutex::new(Vec::new()),
            count_calls: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            chain_id: None,
            ..Self::healthy()
        }
    }

    pub fn sent_transactions(&self) -> Vec<SignedTransaction> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|raw| SignedTransaction::decode(raw).unwrap())
            .collect()
    }
}

#[async_trait]
impl blockchain::ChainRpc for MockRpc {
    async fn chain_id(&self) -> Result<u64, RpcFailure> {
        self.chain_id
            .ok_or_else(|| RpcFailure::Transport("connection refused".into()))
    }

    async fn transaction_count(&self, _address: Address) -> Result<u64, RpcFailure> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        Ok(*self.count.lock().unwrap())
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, RpcFailure> {
        if let Some(reason) = self.reject_with.lock().unwrap().clone() {
            return Err(RpcFailure::Rejected {
                code: -32000,
                message: reason,
            });
        }
        self.sent.lock().unwrap().push(Bytes::copy_from_slice(raw));
        if self.count_follows_sends {
            *self.count.lock().unwrap() += 1;
        }
        Ok(keccak256(raw))
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<ReceiptInfo>, RpcFailure> {
        Ok(self
            .mined
            .lock()
            .unwrap()
            .contains(&tx_hash)
            .then_some(ReceiptInfo {
                block_number: 42,
                success: true,
            }))
    }

    async fn transaction_known(&self, tx_hash: B256) -> Result<bool, RpcFailure> {
        Ok(self
            .sent
            .lock()
            .unwrap()
            .iter()
            .any(|raw| keccak256(raw) == tx_hash))
    }
}

/// Wraps a signer and counts signatures.
pub struct CountingSigner {
    pub inner: SigningIdentity,
    pub signatures: AtomicUsize,
}

impl CountingSigner {
    pub fn new(inner: SigningIdentity) -> Self {
        Self {
            inner,
            signatures: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.signatures.load(Ordering::SeqCst)
    }
}

impl CallSigner for CountingSigner {
    fn address(&self) -> Address {
        self.inner.address()
    }

    fn sign_call(&self, call: &UnsignedCall) -> blockchain::error::Result<SignedTransaction> {
        self.signatures.fetch_add(1, Ordering::SeqCst);
        self.inner.sign_call(call)
    }
}
