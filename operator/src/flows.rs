use std::{fs, str::FromStr};

use alloy::{dyn_abi::DynSolValue, primitives::U256};
use anyhow::{Context, bail};
use blockchain::{BroadcastReceipt, ContractBinding, PollPolicy, ReceiptStatus};
use log::info;
use operator_sdk::{
    Client, Config,
    contract::{NOMINATION_SIZE, REPORT_MISSED_SLEEP},
    prompt::nomination_prompt,
};

use crate::config::FlowConfig;

pub async fn report_missed_sleep(
    client: &Client,
    sdk_config: &Config,
    flow: &FlowConfig,
) -> anyhow::Result<BroadcastReceipt> {
    let challenge_id = parse_u256(flow.challenge_id.as_deref(), "CHALLENGE_ID")?;
    let day_id = parse_u256(flow.day_id.as_deref(), "DAY_ID")?;

    let receipt = match &flow.contract_abi_file {
        Some(path) => {
            let address = sdk_config
                .contract_address
                .context("OPERATOR_CONTRACT_ADDRESS is required")?;
            let json = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            let binding = ContractBinding::from_json(address, &json)?;
            client
                .operator
                .submit(
                    &binding,
                    REPORT_MISSED_SLEEP,
                    &[
                        DynSolValue::Uint(challenge_id, 256),
                        DynSolValue::Uint(day_id, 256),
                    ],
                )
                .await?
        }
        None => {
            client
                .operator
                .report_missed_sleep(challenge_id, day_id)
                .await?
        }
    };
    Ok(receipt)
}

/// Asks a mech for a nomination and submits it. Returns the decision request id
/// with the nomination receipt.
pub async fn nominate(
    client: &Client,
    flow: &FlowConfig,
) -> anyhow::Result<(String, BroadcastReceipt)> {
    let prompt = load_prompt(flow)?;

    let outcome = client.delegator.request_decision(prompt).await?;
    let request_id = outcome.result().request_id.clone();
    info!("decision {request_id} received");

    let receipt = client.operator.nominate(outcome.into_result()).await?;
    Ok((request_id, receipt))
}

pub async fn confirm(client: &Client, receipt: &BroadcastReceipt) -> anyhow::Result<()> {
    match client
        .operator
        .wait_for_receipt(receipt.tx_hash, PollPolicy::default())
        .await?
    {
        ReceiptStatus::Confirmed {
            block_number,
            success: true,
        } => info!("tx {} confirmed in block {block_number}", receipt.tx_hash),
        ReceiptStatus::Confirmed { block_number, .. } => {
            bail!("tx {} reverted in block {block_number}", receipt.tx_hash)
        }
        other => bail!("tx {} is {other:?}", receipt.tx_hash),
    }
    Ok(())
}

fn load_prompt(flow: &FlowConfig) -> anyhow::Result<String> {
    if let Some(path) = &flow.nomination_prompt_file {
        return fs::read_to_string(path).with_context(|| format!("reading {path}"));
    }
    if let Some(path) = &flow.validators_file {
        let raw = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
        let validators: serde_json::Value = serde_json::from_str(&raw)?;
        return Ok(nomination_prompt(&validators, NOMINATION_SIZE)?);
    }
    bail!("NOMINATION_PROMPT_FILE or VALIDATORS_FILE is required")
}

pub fn parse_u256(value: Option<&str>, name: &str) -> anyhow::Result<U256> {
    let value = value.with_context(|| format!("{name} is required"))?;
    U256::from_str(value.trim()).with_context(|| format!("invalid {name}: {value}"))
}
