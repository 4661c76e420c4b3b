use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, B256, U256},
};
use blockchain::{BroadcastReceipt, ContractBinding, PollPolicy, ReceiptStatus, SubmitError};

use crate::{
    client::ClientCtx,
    contract::{self, NOMINATE, NOMINATION_SIZE, REPORT_MISSED_SLEEP},
    delegation::DecisionResult,
    error::OperatorError,
    mapper::ArgumentMapper,
};

#[derive(Clone)]
pub struct OperatorClient {
    ctx: ClientCtx,
}

impl OperatorClient {
    pub(super) fn new(ctx: ClientCtx) -> Self {
        Self { ctx }
    }

    /// Address transactions are sent from.
    pub fn address(&self) -> Address {
        self.ctx.signer().address()
    }

    /// Submits `function(args)` on any contract.
    pub async fn submit(
        &self,
        binding: &ContractBinding,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<BroadcastReceipt, SubmitError> {
        self.ctx
            .pipeline()
            .submit(binding, function, args, self.ctx.signer())
            .await
    }

    /// Reports that the challenger missed their sleep target on `day_id`.
    ///
    /// ### Arguments
    ///
    /// * `challenge_id` - The challenge being tracked
    /// * `day_id` - The day within the challenge that was missed
    pub async fn report_missed_sleep(
        &self,
        challenge_id: U256,
        day_id: U256,
    ) -> Result<BroadcastReceipt, OperatorError> {
        let address = self.ctx.cfg().contract_address.ok_or_else(|| {
            OperatorError::InvalidParams("no SleepFine contract address configured".into())
        })?;
        let receipt = self
            .submit(
                &contract::sleep_fine(address),
                REPORT_MISSED_SLEEP,
                &[
                    DynSolValue::Uint(challenge_id, 256),
                    DynSolValue::Uint(day_id, 256),
                ],
            )
            .await?;
        Ok(receipt)
    }

    /// Nominates the validators selected in `decision`.
    pub async fn nominate(
        &self,
        decision: DecisionResult,
    ) -> Result<BroadcastReceipt, OperatorError> {
        let address = self.ctx.cfg().staking_address.ok_or_else(|| {
            OperatorError::InvalidParams("no staking contract address configured".into())
        })?;
        let binding = contract::validator_staking(address);
        let function = binding
            .function(NOMINATE)
            .map_err(|e| OperatorError::InvalidParams(e.to_string()))?;

        let args = ArgumentMapper::new(function.clone())
            .with_selection_size(NOMINATION_SIZE)
            .map(decision)?;
        Ok(self.submit(&binding, NOMINATE, &args).await?)
    }

    pub async fn get_receipt(&self, tx_hash: B256) -> Result<ReceiptStatus, SubmitError> {
        self.ctx.pipeline().get_receipt(tx_hash).await
    }

    pub async fn wait_for_receipt(
        &self,
        tx_hash: B256,
        poll: PollPolicy,
    ) -> Result<ReceiptStatus, SubmitError> {
        self.ctx.pipeline().wait_for_receipt(tx_hash, poll).await
    }
}
