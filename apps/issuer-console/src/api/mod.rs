// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    blockchain::Chain,
    busy::BusyGuard,
    documents::DocumentDraft,
    error::{ApiError, ErrorDisplay},
    models::{Claimable, CustodyMode, Holder, RewardsInfo, TokenRecord, TokenStatus},
    rewards::{investor::WalletResolution, RewardsStep, RewardsTarget, StepReceipt},
    state::AppState,
    store::Cached,
    views::{
        Badge, ClaimableView, HolderTable, ReviewSummary, RewardsInfoView, StepHeader, StepState,
        Tone, TokenDetail, TokenRow, TokenTable, WizardView,
    },
    wizard::{DetailsUpdate, TokenForm, WizardStep},
    workflow::{DelegateOutcome, DelegateSpec, DeployOutcome, MintOrder, MintOutcome},
};

pub mod health;
pub mod rewards;
pub mod tokens;
pub mod wallet;
pub mod wizard;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/tokens", get(tokens::list_tokens))
        .route("/tokens/{chain}/{address}", get(tokens::token_detail))
        .route("/tokens/{chain}/{address}/holders", get(tokens::list_holders))
        .route("/tokens/{chain}/{address}/mint", post(tokens::mint))
        .route(
            "/tokens/{chain}/{address}/documents",
            post(tokens::attach_document),
        )
        .route("/wizard", post(wizard::create_wizard))
        .route(
            "/wizard/{wizard_id}",
            get(wizard::get_wizard).delete(wizard::delete_wizard),
        )
        .route("/wizard/{wizard_id}/details", put(wizard::update_details))
        .route("/wizard/{wizard_id}/partitions", post(wizard::add_partition))
        .route(
            "/wizard/{wizard_id}/partitions/{index}",
            put(wizard::update_partition).delete(wizard::remove_partition),
        )
        .route("/wizard/{wizard_id}/continue", post(wizard::advance))
        .route("/wizard/{wizard_id}/back", post(wizard::back))
        .route("/wizard/{wizard_id}/confirm", post(wizard::confirm))
        .route("/wallet", get(wallet::wallet_status))
        .route("/wallet/switch", post(wallet::switch_network))
        .route("/rewards/info/{contract}", get(rewards::rewards_info))
        .route("/rewards/set-reward-token", post(rewards::set_reward_token))
        .route("/rewards/take-snapshot", post(rewards::take_snapshot))
        .route("/rewards/deposit", post(rewards::deposit))
        .route("/rewards/claim", post(rewards::claim))
        .route("/rewards/delegate", post(rewards::delegate))
        .route(
            "/rewards/claimable/{contract}/{investor}",
            get(rewards::claimable),
        )
        .route("/rewards/wallets/{address}", get(rewards::find_wallet))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

/// `?refresh=true` bypasses cached reads.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RefreshQuery {
    #[serde(default)]
    pub refresh: bool,
}

/// Token list from the cache while fresh, otherwise from the backend.
pub(crate) async fn token_list(
    state: &AppState,
    refresh: bool,
) -> Result<Cached<Vec<TokenRecord>>, ApiError> {
    if !refresh {
        if let Some(cached) = state.store.read().await.tokens.fresh() {
            return Ok(cached.clone());
        }
    }

    let tokens = state.backend.list_tokens().await?;
    let cached = Cached::now(tokens.clone());
    state.store.write().await.tokens.replace(tokens);
    Ok(cached)
}

/// Look a token up by chain and contract (or owner) address.
pub(crate) async fn find_token(
    state: &AppState,
    chain_id: &str,
    address: &str,
) -> Result<TokenRecord, ApiError> {
    let cached = state
        .store
        .read()
        .await
        .find_token(chain_id, address)
        .cloned();
    if let Some(token) = cached {
        return Ok(token);
    }

    token_list(state, true)
        .await?
        .value
        .into_iter()
        .find(|token| token.matches(chain_id, address))
        .ok_or_else(|| ApiError::not_found("Token not found"))
}

/// Claim the busy slot of one form, or refuse the submission.
pub(crate) fn hold(state: &AppState, key: String) -> Result<BusyGuard, ApiError> {
    state.busy.try_acquire(key).ok_or_else(ApiError::busy)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        tokens::list_tokens,
        tokens::token_detail,
        tokens::list_holders,
        tokens::mint,
        tokens::attach_document,
        wizard::create_wizard,
        wizard::get_wizard,
        wizard::delete_wizard,
        wizard::update_details,
        wizard::add_partition,
        wizard::update_partition,
        wizard::remove_partition,
        wizard::advance,
        wizard::back,
        wizard::confirm,
        wallet::wallet_status,
        wallet::switch_network,
        rewards::rewards_info,
        rewards::set_reward_token,
        rewards::take_snapshot,
        rewards::deposit,
        rewards::claim,
        rewards::delegate,
        rewards::claimable,
        rewards::find_wallet
    ),
    components(
        schemas(
            ErrorDisplay,
            Chain,
            CustodyMode,
            TokenStatus,
            TokenRecord,
            Holder,
            RewardsInfo,
            Claimable,
            Tone,
            Badge,
            TokenRow,
            TokenTable,
            TokenDetail,
            HolderTable,
            RewardsInfoView,
            ClaimableView,
            StepState,
            StepHeader,
            ReviewSummary,
            WizardView,
            WizardStep,
            TokenForm,
            DetailsUpdate,
            DocumentDraft,
            MintOrder,
            MintOutcome,
            DeployOutcome,
            DelegateSpec,
            DelegateOutcome,
            RewardsTarget,
            RewardsStep,
            StepReceipt,
            WalletResolution,
            health::HealthResponse,
            health::HealthChecks,
            tokens::MintResponse,
            tokens::DocumentUpload,
            tokens::DocumentResponse,
            wizard::PartitionUpdate,
            wizard::BackResponse,
            wizard::DeployResponse,
            wallet::WalletStatus,
            wallet::SwitchNetworkRequest,
            rewards::SetRewardTokenBody,
            rewards::DepositBody,
            rewards::ClaimBody,
            rewards::DelegateBody,
            rewards::DelegateResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and dependency checks"),
        (name = "Tokens", description = "Issued tokens, holders, minting and documents"),
        (name = "Wizard", description = "Three-step token deployment"),
        (name = "Wallet", description = "Self-custody wallet session"),
        (name = "Rewards", description = "Rewards distribution for issuers and investors")
    )
)]
struct ApiDoc;
