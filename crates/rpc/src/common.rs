use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A task handed to a mech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechRequest {
    /// Client-chosen id for off-chain requests, or the hash of the on-chain
    /// request transaction.
    pub request_id: String,
    pub prompt: String,
    pub tool: String,
    pub chain_config: String,
    /// 0x-prefixed address of the mech that must answer; `None` lets the
    /// marketplace assign one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_mech: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechResponse {
    pub request_id: String,
    /// Tool output, opaque to the channel.
    pub result: Value,
    pub status: DeliveryStatus,
    /// Address of the mech that produced the result, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mech: Option<String>,
}

/// Metadata attached to an on-chain marketplace request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMetadata {
    pub prompt: String,
    pub tool: String,
    pub chain_config: String,
    pub nonce: String,
}

impl TryInto<Vec<u8>> for RequestMetadata {
    type Error = serde_json::Error;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(&self)
    }
}

impl TryFrom<&[u8]> for RequestMetadata {
    type Error = serde_json::Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        serde_json::from_slice(value)
    }
}
