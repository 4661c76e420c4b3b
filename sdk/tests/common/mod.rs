#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use alloy::primitives::{Address, B256, Bytes, address, keccak256};
use async_trait::async_trait;
use blockchain::{
    ChainEndpoint, ChainRpc, NonceStrategy, ReceiptInfo, RpcFailure, SignedTransaction,
    TxPipeline, TxPolicy,
};
use jsonrpsee::server::{Server, ServerHandle};
use operator_sdk::{Config, ConfigBuilder};
use rpc::{
    RpcResult,
    common::{DeliveryStatus, MechRequest, MechResponse},
    mech::MechApiServer,
    proxy::RpcProxy,
};
use serde_json::{Value, json};

pub const CHAIN_ID: u64 = 420420421;
pub const OPERATOR_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const SLEEP_FINE: Address = address!("0x0308D149EA4cBa0Bede727e01411879a88267432");
pub const STAKING: Address = address!("0x00000000000000000000000000000000000000aa");
pub const MARKETPLACE: Address = address!("0x00000000000000000000000000000000000000bb");
pub const PRIORITY_MECH: Address = address!("0x478ad20ed958dcc5ad4aba6f4e4cc51e07a840e4");

pub fn validator(n: u8) -> Address {
    Address::with_last_byte(n)
}

/// Five roles listed out of order, validator_N -> address N.
pub fn five_role_payload() -> Value {
    json!({
        "validator_3": validator(3).to_string(),
        "validator_1": validator(1).to_string(),
        "validator_5": { "address": validator(5).to_string(), "uptime": 99.2 },
        "validator_2": validator(2).to_string(),
        "validator_4": validator(4).to_string(),
    })
}

pub fn config() -> ConfigBuilder {
    ConfigBuilder::default()
        .rpc_url("http://localhost:8545".into())
        .chain_id(CHAIN_ID.to_string())
        .wallet_private_key(OPERATOR_KEY.into())
        .contract_address(SLEEP_FINE.to_string())
        .staking_address(STAKING.to_string())
        .marketplace_address(MARKETPLACE.to_string())
}

pub fn build(builder: ConfigBuilder) -> Config {
    builder.build().expect("valid config")
}

pub fn pipeline(chain: Arc<MockChain>) -> TxPipeline {
    TxPipeline::new(
        ChainEndpoint::parse(CHAIN_ID, "http://localhost:8545").unwrap(),
        chain,
        TxPolicy {
            nonce_strategy: NonceStrategy::Tracked,
            ..TxPolicy::default()
        },
    )
}

/// Accepts every transaction and remembers it.
#[derive(Default)]
pub struct MockChain {
    pub sent: Mutex<Vec<Bytes>>,
}

impl MockChain {
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
impl ChainRpc for MockChain {
    async fn chain_id(&self) -> Result<u64, RpcFailure> {
        Ok(CHAIN_ID)
    }

    async fn transaction_count(&self, _address: Address) -> Result<u64, RpcFailure> {
        Ok(self.sent.lock().unwrap().len() as u64)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, RpcFailure> {
        self.sent.lock().unwrap().push(Bytes::copy_from_slice(raw));
        Ok(keccak256(raw))
    }

    async fn transaction_receipt(&self, _tx_hash: B256) -> Result<Option<ReceiptInfo>, RpcFailure> {
        Ok(None)
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

/// What the test mech answers.
#[derive(Clone)]
pub struct MechScript {
    pub payload: Value,
    pub status: DeliveryStatus,
    /// Replaces the request id in direct replies.
    pub reply_id: Option<String>,
    /// `mech_getResult` calls answered with "not yet" before the result shows up.
    pub ready_after: usize,
    /// `mech_getResult` calls failing with an internal error before anything else.
    pub failing_polls: usize,
    /// `mech_getResult` calls answered "unknown request" after the failing ones.
    pub unseen_polls: usize,
}

impl MechScript {
    pub fn delivering(payload: Value) -> Self {
        Self {
            payload,
            status: DeliveryStatus::Delivered,
            reply_id: None,
            ready_after: 0,
            failing_polls: 0,
            unseen_polls: 0,
        }
    }

    pub fn never_ready() -> Self {
        Self {
            ready_after: usize::MAX,
            ..Self::delivering(Value::Null)
        }
    }
}

#[derive(Clone, Default)]
pub struct MechCalls {
    pub requests: Arc<Mutex<Vec<MechRequest>>>,
    pub polled_ids: Arc<Mutex<Vec<String>>>,
    pub polls: Arc<AtomicUsize>,
}

impl MechCalls {
    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

struct ScriptedMech {
    script: MechScript,
    calls: MechCalls,
}

#[async_trait]
impl MechApiServer for ScriptedMech {
    async fn send_request(&self, request: MechRequest) -> RpcResult<MechResponse> {
        self.calls.requests.lock().unwrap().push(request.clone());
        Ok(MechResponse {
            request_id: self
                .script
                .reply_id
                .clone()
                .unwrap_or(request.request_id),
            result: self.script.payload.clone(),
            status: self.script.status,
            mech: request.priority_mech,
        })
    }

    async fn get_result(&self, request_id: String) -> RpcResult<Option<MechResponse>> {
        let poll = self.calls.polls.fetch_add(1, Ordering::SeqCst);
        self.calls.polled_ids.lock().unwrap().push(request_id.clone());
        if poll < self.script.failing_polls {
            return Err(rpc::internal_error());
        }
        let poll = poll - self.script.failing_polls;
        if poll < self.script.unseen_polls {
            return Err(rpc::unknown_request_error(&request_id));
        }
        if poll - self.script.unseen_polls < self.script.ready_after {
            return Ok(None);
        }
        Ok(Some(MechResponse {
            request_id,
            result: self.script.payload.clone(),
            status: self.script.status,
            mech: Some(PRIORITY_MECH.to_string()),
        }))
    }
}

pub struct MechServer {
    pub url: String,
    pub calls: MechCalls,
    _handle: ServerHandle,
}

impl MechServer {
    pub async fn start(script: MechScript) -> anyhow::Result<Self> {
        let server = Server::builder().build("127.0.0.1:0").await?;
        let addr = server.local_addr()?;
        let calls = MechCalls::default();
        let handle = server.start(
            ScriptedMech {
                script,
                calls: calls.clone(),
            }
            .into_rpc(),
        );
        Ok(Self {
            url: format!("http://{addr}"),
            calls,
            _handle: handle,
        })
    }

    pub fn proxy(&self) -> anyhow::Result<RpcProxy> {
        RpcProxy::new(&self.url)
    }
}
