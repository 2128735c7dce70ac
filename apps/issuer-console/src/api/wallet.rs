// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::hold;
use crate::{
    blockchain::{wallet::bind_chain, Chain, WalletAdapter, WalletError},
    busy::forms,
    error::{ApiError, ErrorDisplay},
    state::AppState,
    workflow::address_hex,
};

/// Self-custody wallet session as seen by the dashboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct WalletStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// EVM chain id the wallet is on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Set when the chain is one the console supports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<Chain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SwitchNetworkRequest {
    pub chain: Chain,
}

async fn status_of(wallet: &dyn WalletAdapter) -> Result<WalletStatus, WalletError> {
    let account = wallet.current_account().await?;
    let chain_id = wallet.current_chain().await?;
    let chain = Chain::from_evm_chain_id(chain_id);

    Ok(WalletStatus {
        connected: true,
        account: Some(address_hex(&account)),
        chain_id: Some(chain_id),
        chain,
        network: chain.map(|c| c.network().name.to_string()),
    })
}

#[utoipa::path(
    get,
    path = "/v1/wallet",
    tag = "Wallet",
    responses(
        (status = 200, body = WalletStatus),
        (status = 502, description = "Wallet RPC unavailable", body = ErrorDisplay)
    )
)]
pub async fn wallet_status(State(state): State<AppState>) -> Result<Json<WalletStatus>, ApiError> {
    let Some(wallet) = state.wallet() else {
        return Ok(Json(WalletStatus {
            connected: false,
            account: None,
            chain_id: None,
            chain: None,
            network: None,
        }));
    };
    Ok(Json(status_of(wallet).await?))
}

/// Move the wallet to another supported network. Waits for any in-flight
/// self-custody transaction to be confirmed first.
#[utoipa::path(
    post,
    path = "/v1/wallet/switch",
    request_body = SwitchNetworkRequest,
    tag = "Wallet",
    responses(
        (status = 200, body = WalletStatus),
        (status = 400, description = "No wallet, or the switch failed", body = ErrorDisplay),
        (status = 409, body = ErrorDisplay)
    )
)]
pub async fn switch_network(
    State(state): State<AppState>,
    Json(request): Json<SwitchNetworkRequest>,
) -> Result<Json<WalletStatus>, ApiError> {
    let _guard = hold(&state, forms::wallet_switch())?;
    let wallet = state.wallet().ok_or(WalletError::NotConnected)?;

    let network = bind_chain(wallet, request.chain).await?;
    info!(chain = %network.chain, "Wallet network switched");
    Ok(Json(status_of(wallet).await?))
}
