use std::{sync::Arc, time::Duration};

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};
use async_trait::async_trait;
use blockchain::{BroadcastReceipt, ContractBinding, PollPolicy, SubmitError};

use crate::{
    client::ClientCtx,
    contract::{self, MARKETPLACE_REQUEST},
    delegation::{
        DecisionClient, DecisionOutcome, DecisionRequest, DecisionResult, RequestSubmitter,
    },
    error::DelegationError,
};

#[derive(Clone)]
pub struct DelegatorClient {
    ctx: ClientCtx,
    decisions: Option<Arc<DecisionClient>>,
}

impl DelegatorClient {
    pub(super) fn new(ctx: ClientCtx) -> Self {
        let decisions = ctx.mech().map(|channel| {
            let mech = &ctx.cfg().mech;
            let mut client = DecisionClient::new(channel).with_poll_policy(PollPolicy {
                interval: mech.poll_interval,
                deadline: mech.deadline,
            });
            if let Some(marketplace) = mech.marketplace_address {
                client = client.with_submitter(Arc::new(MarketplaceRequester {
                    ctx: ctx.clone(),
                    marketplace: contract::mech_marketplace(marketplace),
                    response_timeout: mech.response_timeout,
                }));
            }
            Arc::new(client)
        });
        Self { ctx, decisions }
    }

    /// Asks a mech to decide on `prompt` using the configured tool, chain
    /// config, priority mech and delegation mode.
    pub async fn request_decision(
        &self,
        prompt: impl Into<String>,
    ) -> Result<DecisionOutcome, DelegationError> {
        let mech = &self.ctx.cfg().mech;
        let request = DecisionRequest::new(prompt, mech.tool.clone(), mech.chain_config.clone())
            .priority_mech(mech.priority_mech)
            .mode(mech.mode);
        self.send(request).await
    }

    /// Sends a fully specified request.
    pub async fn send(&self, request: DecisionRequest) -> Result<DecisionOutcome, DelegationError> {
        self.decisions()?.request_decision(request).await
    }

    /// Resumes polling for an on-chain request after a
    /// [`DelegationError::Timeout`].
    pub async fn await_result(&self, request_id: &str) -> Result<DecisionResult, DelegationError> {
        let (_, result) = self.decisions()?.await_result(request_id).await?;
        Ok(result)
    }

    fn decisions(&self) -> Result<&DecisionClient, DelegationError> {
        self.decisions
            .as_deref()
            .ok_or_else(|| DelegationError::NotConfigured("no mech RPC URL configured".into()))
    }
}

/// Posts requests to the mech marketplace contract through the operator's pipeline.
struct MarketplaceRequester {
    ctx: ClientCtx,
    marketplace: ContractBinding,
    response_timeout: Duration,
}

#[async_trait]
impl RequestSubmitter for MarketplaceRequester {
    async fn post_request(
        &self,
        metadata: Vec<u8>,
        priority_mech: Option<Address>,
    ) -> Result<BroadcastReceipt, SubmitError> {
        let args = [
            DynSolValue::Bytes(metadata),
            DynSolValue::Address(priority_mech.unwrap_or(Address::ZERO)),
            DynSolValue::Uint(U256::from(self.response_timeout.as_secs()), 256),
        ];
        self.ctx
            .pipeline()
            .submit(&self.marketplace, MARKETPLACE_REQUEST, &args, self.ctx.signer())
            .await
    }
}
