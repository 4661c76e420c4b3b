use std::{fmt, str::FromStr};

use alloy::primitives::Address;
use blockchain::BroadcastReceipt;
use rpc::common::{DeliveryStatus, MechResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a decision request travels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegationMode {
    /// Straight to the mech over JSON-RPC.
    OffChain,
    /// Posted to the marketplace contract, result polled afterwards.
    #[default]
    OnChain,
}

impl FromStr for DelegationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "off_chain" | "offchain" => Ok(Self::OffChain),
            "on_chain" | "onchain" => Ok(Self::OnChain),
            other => Err(format!("unknown delegation mode: {other}")),
        }
    }
}

impl fmt::Display for DelegationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OffChain => f.write_str("off_chain"),
            Self::OnChain => f.write_str("on_chain"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRequest {
    pub prompt: String,
    /// `None` lets the marketplace assign a mech.
    pub priority_mech: Option<Address>,
    pub tool: String,
    pub chain_config: String,
    pub mode: DelegationMode,
}

impl DecisionRequest {
    pub fn new(
        prompt: impl Into<String>,
        tool: impl Into<String>,
        chain_config: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            priority_mech: None,
            tool: tool.into(),
            chain_config: chain_config.into(),
            mode: DelegationMode::default(),
        }
    }

    pub fn priority_mech(mut self, mech: Option<Address>) -> Self {
        self.priority_mech = mech;
        self
    }

    pub fn mode(mut self, mode: DelegationMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    Pending,
    Delivered,
    Failed,
}

impl From<DeliveryStatus> for CompletionStatus {
    fn from(status: DeliveryStatus) -> Self {
        match status {
            DeliveryStatus::Pending => Self::Pending,
            DeliveryStatus::Delivered => Self::Delivered,
            DeliveryStatus::Failed => Self::Failed,
        }
    }
}

/// A mech's answer to one request.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionResult {
    pub request_id: String,
    pub payload: Value,
    pub status: CompletionStatus,
}

impl From<MechResponse> for DecisionResult {
    fn from(response: MechResponse) -> Self {
        Self {
            request_id: response.request_id,
            payload: response.result,
            status: response.status.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecisionOutcome {
    /// Answered in the same round trip.
    Direct(DecisionResult),
    /// Answered after an on-chain request and `attempts` result polls.
    Polled {
        request: BroadcastReceipt,
        attempts: u32,
        result: DecisionResult,
    },
}

impl DecisionOutcome {
    pub fn result(&self) -> &DecisionResult {
        match self {
            Self::Direct(result) | Self::Polled { result, .. } => result,
        }
    }

    pub fn into_result(self) -> DecisionResult {
        match self {
            Self::Direct(result) | Self::Polled { result, .. } => result,
        }
    }
}
