use std::{sync::Arc, time::Duration};

use alloy::primitives::Address;
use async_trait::async_trait;
use blockchain::{BroadcastReceipt, PollPolicy, SubmitError};
use log::{debug, info, warn};
use rpc::{
    common::{DeliveryStatus, MechRequest, MechResponse, RequestMetadata},
    mech::MechApiClient,
    proxy::RpcProxy,
};
use uuid::Uuid;

use crate::error::DelegationError;

mod model;

pub use model::{
    CompletionStatus, DecisionOutcome, DecisionRequest, DecisionResult, DelegationMode,
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_DELEGATION_DEADLINE: Duration = Duration::from_secs(300);
/// How long the marketplace gives a mech to deliver, sent with every on-chain request.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(300);

/// JSON-RPC link to a mech or marketplace indexer.
#[async_trait]
pub trait MechChannel: Send + Sync {
    async fn send_request(&self, request: MechRequest) -> Result<MechResponse, DelegationError>;

    async fn get_result(&self, request_id: &str) -> Result<Option<MechResponse>, DelegationError>;
}

#[async_trait]
impl MechChannel for RpcProxy {
    async fn send_request(&self, request: MechRequest) -> Result<MechResponse, DelegationError> {
        MechApiClient::send_request(&**self, request)
            .await
            .map_err(|e| DelegationError::Channel(e.to_string()))
    }

    async fn get_result(&self, request_id: &str) -> Result<Option<MechResponse>, DelegationError> {
        match MechApiClient::get_result(&**self, request_id.to_string()).await {
            Ok(response) => Ok(response),
            Err(e) if rpc::is_unknown_request(&e) => Ok(None),
            Err(e) => Err(DelegationError::Channel(e.to_string())),
        }
    }
}

/// Posts a marketplace request transaction.
#[async_trait]
pub trait RequestSubmitter: Send + Sync {
    async fn post_request(
        &self,
        metadata: Vec<u8>,
        priority_mech: Option<Address>,
    ) -> Result<BroadcastReceipt, SubmitError>;
}

pub struct DecisionClient {
    channel: Arc<dyn MechChannel>,
    submitter: Option<Arc<dyn RequestSubmitter>>,
    poll: PollPolicy,
}

impl DecisionClient {
    pub fn new(channel: Arc<dyn MechChannel>) -> Self {
        Self {
            channel,
            submitter: None,
            poll: PollPolicy {
                interval: DEFAULT_POLL_INTERVAL,
                deadline: DEFAULT_DELEGATION_DEADLINE,
            },
        }
    }

    /// Enables [`DelegationMode::OnChain`].
    pub fn with_submitter(mut self, submitter: Arc<dyn RequestSubmitter>) -> Self {
        self.submitter = Some(submitter);
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll
    }

    /// Sends `request` to a mech and waits for its answer.
    ///
    /// On-chain requests are posted exactly once. If the deadline passes first,
    /// [`DelegationError::Timeout`] carries the request id to keep polling with.
    pub async fn request_decision(
        &self,
        request: DecisionRequest,
    ) -> Result<DecisionOutcome, DelegationError> {
        match request.mode {
            DelegationMode::OffChain => self.request_off_chain(request).await,
            DelegationMode::OnChain => self.request_on_chain(request).await,
        }
    }

    /// Polls for the result of an on-chain request that was already posted.
    ///
    /// A poll still in flight at the deadline is abandoned.
    pub async fn await_result(
        &self,
        request_id: &str,
    ) -> Result<(u32, DecisionResult), DelegationError> {
        let deadline = tokio::time::Instant::now() + self.poll.deadline;
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            match tokio::time::timeout(remaining, self.channel.get_result(request_id)).await {
                Ok(Ok(Some(response))) if response.status != DeliveryStatus::Pending => {
                    if response.request_id != request_id {
                        return Err(DelegationError::Malformed(format!(
                            "asked for request {request_id}, got {}",
                            response.request_id
                        )));
                    }
                    info!("decision {request_id} {:?} after {attempts} polls", response.status);
                    return Ok((attempts, response.into()));
                }
                Ok(Ok(_)) => debug!("no result for {request_id} yet ({attempts} polls)"),
                Ok(Err(e)) => warn!("result poll for {request_id} failed: {e}"),
                Err(_) => warn!("result poll for {request_id} ran past the deadline"),
            }
            if tokio::time::Instant::now() + self.poll.interval > deadline {
                return Err(DelegationError::Timeout {
                    request_id: request_id.to_string(),
                    attempts,
                });
            }
            tokio::time::sleep(self.poll.interval).await;
        }
    }

    async fn request_off_chain(
        &self,
        request: DecisionRequest,
    ) -> Result<DecisionOutcome, DelegationError> {
        let request_id = Uuid::new_v4().to_string();
        debug!("sending decision request {request_id} with tool {}", request.tool);

        let response = self
            .channel
            .send_request(MechRequest {
                request_id: request_id.clone(),
                prompt: request.prompt,
                tool: request.tool,
                chain_config: request.chain_config,
                priority_mech: request.priority_mech.map(|a| a.to_string()),
            })
            .await?;

        if response.request_id != request_id {
            return Err(DelegationError::Malformed(format!(
                "sent request {request_id}, got a reply for {}",
                response.request_id
            )));
        }
        if response.status == DeliveryStatus::Pending {
            return Err(DelegationError::Malformed(format!(
                "request {request_id} returned without a result"
            )));
        }

        info!("decision {request_id} {:?}", response.status);
        Ok(DecisionOutcome::Direct(response.into()))
    }

    async fn request_on_chain(
        &self,
        request: DecisionRequest,
    ) -> Result<DecisionOutcome, DelegationError> {
        let submitter = self.submitter.as_ref().ok_or_else(|| {
            DelegationError::NotConfigured("on-chain delegation needs a marketplace".into())
        })?;

        let metadata: Vec<u8> = RequestMetadata {
            prompt: request.prompt,
            tool: request.tool,
            chain_config: request.chain_config,
            nonce: Uuid::new_v4().to_string(),
        }
        .try_into()
        .map_err(|e: serde_json::Error| DelegationError::Malformed(e.to_string()))?;

        let receipt = submitter
            .post_request(metadata, request.priority_mech)
            .await?;
        let request_id = receipt.tx_hash.to_string();
        info!("posted marketplace request {request_id}");

        let (attempts, result) = self.await_result(&request_id).await?;
        Ok(DecisionOutcome::Polled {
            request: receipt,
            attempts,
            result,
        })
    }
}
