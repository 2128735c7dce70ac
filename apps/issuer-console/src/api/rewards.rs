// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Rewards distribution endpoints.
//!
//! Issuer steps (reward token, snapshot, deposit) and investor actions
//! (claim, delegate) each run under their own busy key. After a successful
//! issuer step the contract's rewards info is re-read in the background; a
//! claim re-reads the investor's claimable amount.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::hold;
use crate::{
    blockchain::Chain,
    busy::forms,
    error::{ApiError, ErrorDisplay},
    models::CustodyMode,
    rewards::{
        fetch_rewards_info,
        investor::{self, WalletResolution},
        issuer, RewardsTarget, StepReceipt,
    },
    state::AppState,
    store::ContractKey,
    views::{ClaimableView, RewardsInfoView},
    workflow::{delegate_votes, CustodyRoute, DelegateOutcome, DelegateSpec},
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct InfoQuery {
    pub chain: Chain,
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ChainQuery {
    pub chain: Chain,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct WalletQuery {
    pub chain: Chain,
    /// Wallet id kept when the lookup fails.
    #[serde(default)]
    pub current_wallet_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetRewardTokenBody {
    #[serde(flatten)]
    pub target: RewardsTarget,
    pub reward_token_address: String,
}

fn approve_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DepositBody {
    #[serde(flatten)]
    pub target: RewardsTarget,
    /// Whole reward tokens.
    pub amount: String,
    #[serde(default = "approve_by_default")]
    pub auto_approve: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClaimBody {
    #[serde(flatten)]
    pub target: RewardsTarget,
    /// Investor whose claimable amount is re-read afterwards.
    #[serde(default)]
    pub investor: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DelegateBody {
    #[serde(default)]
    pub custody: CustodyMode,
    #[serde(flatten)]
    pub spec: DelegateSpec,
    /// Managed delegation delegates to the investor unless told otherwise.
    #[serde(default)]
    pub investor: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DelegateResponse {
    pub message: String,
    pub outcome: DelegateOutcome,
}

#[utoipa::path(
    get,
    path = "/v1/rewards/info/{contract}",
    params(
        ("contract" = String, Path, description = "Rewards distribution contract"),
        InfoQuery
    ),
    tag = "Rewards",
    responses(
        (status = 200, body = RewardsInfoView),
        (status = 502, body = ErrorDisplay)
    )
)]
pub async fn rewards_info(
    State(state): State<AppState>,
    Path(contract): Path<String>,
    Query(query): Query<InfoQuery>,
) -> Result<Json<RewardsInfoView>, ApiError> {
    let key = ContractKey::new(query.chain, &contract);

    if !query.refresh {
        if let Some(cached) = state.store.read().await.rewards_info(&key) {
            return Ok(Json(RewardsInfoView::new(&key, cached)));
        }
    }

    let cached = fetch_rewards_info(state.backend.as_ref(), &state.store, &key).await?;
    Ok(Json(RewardsInfoView::new(&key, &cached)))
}

#[utoipa::path(
    post,
    path = "/v1/rewards/set-reward-token",
    request_body = SetRewardTokenBody,
    tag = "Rewards",
    responses(
        (status = 200, body = StepReceipt),
        (status = 409, body = ErrorDisplay),
        (status = 422, body = ErrorDisplay),
        (status = 502, body = ErrorDisplay)
    )
)]
pub async fn set_reward_token(
    State(state): State<AppState>,
    Json(body): Json<SetRewardTokenBody>,
) -> Result<Json<StepReceipt>, ApiError> {
    let _guard = hold(
        &state,
        forms::rewards("set-reward-token", &body.target.contract_address),
    )?;
    let receipt = issuer::set_reward_token(
        state.backend.as_ref(),
        &body.target,
        &body.reward_token_address,
    )
    .await?;
    state.refresh.rewards_info(body.target.key());
    Ok(Json(receipt))
}

#[utoipa::path(
    post,
    path = "/v1/rewards/take-snapshot",
    request_body = RewardsTarget,
    tag = "Rewards",
    responses(
        (status = 200, body = StepReceipt),
        (status = 409, body = ErrorDisplay),
        (status = 422, body = ErrorDisplay),
        (status = 502, body = ErrorDisplay)
    )
)]
pub async fn take_snapshot(
    State(state): State<AppState>,
    Json(target): Json<RewardsTarget>,
) -> Result<Json<StepReceipt>, ApiError> {
    let _guard = hold(&state, forms::rewards("take-snapshot", &target.contract_address))?;
    let receipt = issuer::take_snapshot(state.backend.as_ref(), &target).await?;
    state.refresh.rewards_info(target.key());
    Ok(Json(receipt))
}

#[utoipa::path(
    post,
    path = "/v1/rewards/deposit",
    request_body = DepositBody,
    tag = "Rewards",
    responses(
        (status = 200, body = StepReceipt),
        (status = 409, body = ErrorDisplay),
        (status = 422, body = ErrorDisplay),
        (status = 502, body = ErrorDisplay)
    )
)]
pub async fn deposit(
    State(state): State<AppState>,
    Json(body): Json<DepositBody>,
) -> Result<Json<StepReceipt>, ApiError> {
    let _guard = hold(&state, forms::rewards("deposit", &body.target.contract_address))?;
    let receipt = issuer::deposit_rewards(
        state.backend.as_ref(),
        &body.target,
        &body.amount,
        body.auto_approve,
    )
    .await?;
    state.refresh.rewards_info(body.target.key());
    Ok(Json(receipt))
}

#[utoipa::path(
    post,
    path = "/v1/rewards/claim",
    request_body = ClaimBody,
    tag = "Rewards",
    responses(
        (status = 200, body = StepReceipt),
        (status = 409, body = ErrorDisplay),
        (status = 422, body = ErrorDisplay),
        (status = 502, body = ErrorDisplay)
    )
)]
pub async fn claim(
    State(state): State<AppState>,
    Json(body): Json<ClaimBody>,
) -> Result<Json<StepReceipt>, ApiError> {
    let _guard = hold(&state, forms::rewards("claim", &body.target.contract_address))?;
    let receipt = investor::claim(state.backend.as_ref(), &body.target).await?;

    if let Some(investor) = body.investor.filter(|i| !i.trim().is_empty()) {
        state.refresh.claimable(body.target.key(), investor);
    }
    Ok(Json(receipt))
}

/// Give the investor's tokens voting power for future snapshots.
#[utoipa::path(
    post,
    path = "/v1/rewards/delegate",
    request_body = DelegateBody,
    tag = "Rewards",
    responses(
        (status = 200, body = DelegateResponse),
        (status = 400, description = "Wallet not connected or wrong network", body = ErrorDisplay),
        (status = 409, body = ErrorDisplay),
        (status = 422, body = ErrorDisplay),
        (status = 502, body = ErrorDisplay)
    )
)]
pub async fn delegate(
    State(state): State<AppState>,
    Json(body): Json<DelegateBody>,
) -> Result<Json<DelegateResponse>, ApiError> {
    let _guard = hold(
        &state,
        forms::rewards("delegate", &body.spec.token_contract_address),
    )?;

    let mut spec = body.spec;
    spec.delegatee = spec.delegatee.filter(|d| !d.trim().is_empty());
    if body.custody == CustodyMode::Managed && spec.delegatee.is_none() {
        spec.delegatee = body.investor;
    }

    let route = CustodyRoute::resolve(body.custody, state.wallet())?;
    let outcome = delegate_votes(state.backend.as_ref(), route, &spec).await?;
    Ok(Json(DelegateResponse {
        message: outcome.message(),
        outcome,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/rewards/claimable/{contract}/{investor}",
    params(
        ("contract" = String, Path, description = "Rewards distribution contract"),
        ("investor" = String, Path, description = "Investor address"),
        ChainQuery
    ),
    tag = "Rewards",
    responses(
        (status = 200, body = ClaimableView),
        (status = 502, body = ErrorDisplay)
    )
)]
pub async fn claimable(
    State(state): State<AppState>,
    Path((contract, investor_address)): Path<(String, String)>,
    Query(query): Query<ChainQuery>,
) -> Result<Json<ClaimableView>, ApiError> {
    let key = ContractKey::new(query.chain, &contract);
    let cached =
        investor::check_claimable(state.backend.as_ref(), &state.store, &key, &investor_address)
            .await?;
    Ok(Json(ClaimableView::new(&investor_address, &cached)))
}

/// Find the custodial wallet behind an investor address.
#[utoipa::path(
    get,
    path = "/v1/rewards/wallets/{address}",
    params(
        ("address" = String, Path, description = "Investor address"),
        WalletQuery
    ),
    tag = "Rewards",
    responses((status = 200, body = WalletResolution))
)]
pub async fn find_wallet(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<WalletQuery>,
) -> Json<WalletResolution> {
    Json(
        investor::resolve_wallet_id(
            state.backend.as_ref(),
            &address,
            query.chain,
            query.current_wallet_id,
        )
        .await,
    )
}
