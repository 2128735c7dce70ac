// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Issuer-side rewards steps. Each step stands alone and may be retried.

use tracing::info;

use super::{RewardsStep, RewardsTarget, StepReceipt};
use crate::backend::{DepositRewardsRequest, SetRewardTokenRequest, TokenBackend};
use crate::blockchain::encoding::{parse_positive_amount, to_base_units, TOKEN_DECIMALS};
use crate::error::ValidationError;
use crate::workflow::WorkflowError;

pub async fn set_reward_token(
    backend: &dyn TokenBackend,
    target: &RewardsTarget,
    reward_token: &str,
) -> Result<StepReceipt, WorkflowError> {
    target.check()?;
    if reward_token.trim().is_empty() {
        return Err(ValidationError::IncompleteForm.into());
    }

    let tx_id = backend
        .set_reward_token(&SetRewardTokenRequest {
            contract_address: target.contract_address.trim().to_string(),
            reward_token_address: reward_token.trim().to_string(),
            wallet_id: target.wallet_id.trim().to_string(),
            chain_id: target.chain.backend_id().to_string(),
        })
        .await?;

    info!(contract = %target.contract_address, tx_id = %tx_id, "Reward token set");
    Ok(StepReceipt {
        step: RewardsStep::SetRewardToken,
        message: format!("Reward token set! TX ID: {tx_id}"),
        tx_id,
        approve_tx_id: None,
    })
}

pub async fn take_snapshot(
    backend: &dyn TokenBackend,
    target: &RewardsTarget,
) -> Result<StepReceipt, WorkflowError> {
    target.check()?;

    let tx_id = backend.take_snapshot(&target.action_request()).await?;

    info!(contract = %target.contract_address, tx_id = %tx_id, "Snapshot taken");
    Ok(StepReceipt {
        step: RewardsStep::TakeSnapshot,
        message: format!("Snapshot taken! TX ID: {tx_id}"),
        tx_id,
        approve_tx_id: None,
    })
}

/// Deposit `amount` whole reward tokens, approving the transfer first when
/// `auto_approve` is set.
pub async fn deposit_rewards(
    backend: &dyn TokenBackend,
    target: &RewardsTarget,
    amount: &str,
    auto_approve: bool,
) -> Result<StepReceipt, WorkflowError> {
    target.check()?;
    if amount.trim().is_empty() {
        return Err(ValidationError::IncompleteForm.into());
    }
    let units = parse_positive_amount(amount)?;

    let receipt = backend
        .deposit_rewards(&DepositRewardsRequest {
            contract_address: target.contract_address.trim().to_string(),
            amount: to_base_units(units, TOKEN_DECIMALS).to_string(),
            wallet_id: target.wallet_id.trim().to_string(),
            chain_id: target.chain.backend_id().to_string(),
            auto_approve,
        })
        .await?;

    let mut message = String::new();
    if let Some(approve) = &receipt.approve_tx_id {
        message.push_str(&format!("Approval TX: {approve}\n"));
    }
    message.push_str(&format!("Deposit TX: {}", receipt.deposit_tx_id));

    info!(
        contract = %target.contract_address,
        units,
        deposit_tx_id = %receipt.deposit_tx_id,
        "Rewards deposited"
    );
    Ok(StepReceipt {
        step: RewardsStep::Deposit,
        tx_id: receipt.deposit_tx_id,
        approve_tx_id: receipt.approve_tx_id,
        message,
    })
}
