// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Deploy wizard sessions.
//!
//! A session walks Asset Details → Capital Structure → Review & Sign and is
//! closed once a deployment goes out. A failed deployment leaves the session
//! on the review step so the operator can retry.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::hold;
use crate::{
    busy::forms,
    error::{ApiError, ErrorDisplay},
    state::AppState,
    views::WizardView,
    wizard::{BackOutcome, DetailsUpdate},
    workflow::{deploy_token, CustodyRoute, DeployOutcome},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PartitionUpdate {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BackResponse {
    /// Back from the first step closes the session.
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wizard: Option<WizardView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeployResponse {
    pub message: String,
    /// Set when the outcome needs the operator's attention.
    pub warning: bool,
    pub outcome: DeployOutcome,
}

#[utoipa::path(
    post,
    path = "/v1/wizard",
    tag = "Wizard",
    responses((status = 201, body = WizardView))
)]
pub async fn create_wizard(State(state): State<AppState>) -> (StatusCode, Json<WizardView>) {
    let mut store = state.store.write().await;
    let wizard = store.open_wizard();
    info!(wizard = %wizard.id(), "Wizard opened");
    (StatusCode::CREATED, Json(WizardView::from(wizard)))
}

#[utoipa::path(
    get,
    path = "/v1/wizard/{wizard_id}",
    params(("wizard_id" = Uuid, Path, description = "Wizard session id")),
    tag = "Wizard",
    responses(
        (status = 200, body = WizardView),
        (status = 404, body = ErrorDisplay)
    )
)]
pub async fn get_wizard(
    State(state): State<AppState>,
    Path(wizard_id): Path<Uuid>,
) -> Result<Json<WizardView>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(WizardView::from(store.wizard(wizard_id)?)))
}

#[utoipa::path(
    delete,
    path = "/v1/wizard/{wizard_id}",
    params(("wizard_id" = Uuid, Path, description = "Wizard session id")),
    tag = "Wizard",
    responses(
        (status = 204, description = "Wizard closed"),
        (status = 404, body = ErrorDisplay),
        (status = 409, description = "Deployment in flight", body = ErrorDisplay)
    )
)]
pub async fn delete_wizard(
    State(state): State<AppState>,
    Path(wizard_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let _guard = hold(&state, forms::deploy(wizard_id))?;
    state.store.write().await.close_wizard(wizard_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/v1/wizard/{wizard_id}/details",
    params(("wizard_id" = Uuid, Path, description = "Wizard session id")),
    request_body = DetailsUpdate,
    tag = "Wizard",
    responses(
        (status = 200, body = WizardView),
        (status = 404, body = ErrorDisplay)
    )
)]
pub async fn update_details(
    State(state): State<AppState>,
    Path(wizard_id): Path<Uuid>,
    Json(update): Json<DetailsUpdate>,
) -> Result<Json<WizardView>, ApiError> {
    let mut store = state.store.write().await;
    let wizard = store.wizard_mut(wizard_id)?;
    wizard.update_details(update);
    Ok(Json(WizardView::from(&*wizard)))
}

/// Append an empty tranche row.
#[utoipa::path(
    post,
    path = "/v1/wizard/{wizard_id}/partitions",
    params(("wizard_id" = Uuid, Path, description = "Wizard session id")),
    tag = "Wizard",
    responses(
        (status = 200, body = WizardView),
        (status = 404, body = ErrorDisplay)
    )
)]
pub async fn add_partition(
    State(state): State<AppState>,
    Path(wizard_id): Path<Uuid>,
) -> Result<Json<WizardView>, ApiError> {
    let mut store = state.store.write().await;
    let wizard = store.wizard_mut(wizard_id)?;
    wizard.add_partition();
    Ok(Json(WizardView::from(&*wizard)))
}

#[utoipa::path(
    put,
    path = "/v1/wizard/{wizard_id}/partitions/{index}",
    params(
        ("wizard_id" = Uuid, Path, description = "Wizard session id"),
        ("index" = usize, Path, description = "Tranche row, from zero")
    ),
    request_body = PartitionUpdate,
    tag = "Wizard",
    responses(
        (status = 200, body = WizardView),
        (status = 404, body = ErrorDisplay),
        (status = 422, body = ErrorDisplay)
    )
)]
pub async fn update_partition(
    State(state): State<AppState>,
    Path((wizard_id, index)): Path<(Uuid, usize)>,
    Json(update): Json<PartitionUpdate>,
) -> Result<Json<WizardView>, ApiError> {
    let mut store = state.store.write().await;
    let wizard = store.wizard_mut(wizard_id)?;
    wizard.update_partition(index, update.name)?;
    Ok(Json(WizardView::from(&*wizard)))
}

#[utoipa::path(
    delete,
    path = "/v1/wizard/{wizard_id}/partitions/{index}",
    params(
        ("wizard_id" = Uuid, Path, description = "Wizard session id"),
        ("index" = usize, Path, description = "Tranche row, from zero")
    ),
    tag = "Wizard",
    responses(
        (status = 200, body = WizardView),
        (status = 404, body = ErrorDisplay),
        (status = 422, description = "Last row or bad index", body = ErrorDisplay)
    )
)]
pub async fn remove_partition(
    State(state): State<AppState>,
    Path((wizard_id, index)): Path<(Uuid, usize)>,
) -> Result<Json<WizardView>, ApiError> {
    let mut store = state.store.write().await;
    let wizard = store.wizard_mut(wizard_id)?;
    wizard.remove_partition(index)?;
    Ok(Json(WizardView::from(&*wizard)))
}

#[utoipa::path(
    post,
    path = "/v1/wizard/{wizard_id}/continue",
    params(("wizard_id" = Uuid, Path, description = "Wizard session id")),
    tag = "Wizard",
    responses(
        (status = 200, body = WizardView),
        (status = 404, body = ErrorDisplay),
        (status = 422, description = "Step incomplete", body = ErrorDisplay)
    )
)]
pub async fn advance(
    State(state): State<AppState>,
    Path(wizard_id): Path<Uuid>,
) -> Result<Json<WizardView>, ApiError> {
    let mut store = state.store.write().await;
    let wizard = store.wizard_mut(wizard_id)?;
    wizard.advance()?;
    Ok(Json(WizardView::from(&*wizard)))
}

#[utoipa::path(
    post,
    path = "/v1/wizard/{wizard_id}/back",
    params(("wizard_id" = Uuid, Path, description = "Wizard session id")),
    tag = "Wizard",
    responses(
        (status = 200, body = BackResponse),
        (status = 404, body = ErrorDisplay)
    )
)]
pub async fn back(
    State(state): State<AppState>,
    Path(wizard_id): Path<Uuid>,
) -> Result<Json<BackResponse>, ApiError> {
    let mut store = state.store.write().await;
    match store.wizard_mut(wizard_id)?.back() {
        BackOutcome::Moved(_) => Ok(Json(BackResponse {
            cancelled: false,
            wizard: Some(WizardView::from(store.wizard(wizard_id)?)),
        })),
        BackOutcome::Cancelled => {
            store.close_wizard(wizard_id)?;
            info!(wizard = %wizard_id, "Wizard cancelled");
            Ok(Json(BackResponse {
                cancelled: true,
                wizard: None,
            }))
        }
    }
}

/// Deploy the reviewed token through the selected custody mode.
#[utoipa::path(
    post,
    path = "/v1/wizard/{wizard_id}/confirm",
    params(("wizard_id" = Uuid, Path, description = "Wizard session id")),
    tag = "Wizard",
    responses(
        (status = 200, body = DeployResponse),
        (status = 400, description = "Wallet not connected or wrong network", body = ErrorDisplay),
        (status = 404, body = ErrorDisplay),
        (status = 409, description = "Deployment in flight or signature rejected", body = ErrorDisplay),
        (status = 422, body = ErrorDisplay),
        (status = 502, body = ErrorDisplay)
    )
)]
pub async fn confirm(
    State(state): State<AppState>,
    Path(wizard_id): Path<Uuid>,
) -> Result<Json<DeployResponse>, ApiError> {
    let _guard = hold(&state, forms::deploy(wizard_id))?;

    let (spec, mode) = {
        let store = state.store.read().await;
        let wizard = store.wizard(wizard_id)?;
        (wizard.confirm()?, wizard.form().mode)
    };

    let route = CustodyRoute::resolve(mode, state.wallet())?;
    let outcome = deploy_token(state.backend.as_ref(), route, &spec).await?;

    {
        let mut store = state.store.write().await;
        store.tokens.invalidate();
        // The deployment stands even if the session is already gone.
        if store.close_wizard(wizard_id).is_err() {
            warn!(wizard = %wizard_id, "Wizard closed while its deployment was in flight");
        }
    }

    if outcome.is_warning() {
        warn!(wizard = %wizard_id, symbol = %spec.symbol, "Deployment mined without a contract address");
    } else {
        info!(wizard = %wizard_id, symbol = %spec.symbol, custody = ?route, "Deployment finished");
    }

    Ok(Json(DeployResponse {
        message: outcome.message(),
        warning: outcome.is_warning(),
        outcome,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};

    use super::*;
    use crate::api::router;
    use crate::blockchain::{Chain, WalletAdapter};
    use crate::testing::{send, FakeBackend, FakeWallet};

    async fn open(app: &axum::Router) -> String {
        let (status, view) = send(app, "POST", "/v1/wizard", None).await;
        assert_eq!(status, StatusCode::CREATED);
        view["id"].as_str().unwrap().to_string()
    }

    async fn to_review(app: &axum::Router, id: &str, details: Value) {
        let (status, _) = send(app, "PUT", &format!("/v1/wizard/{id}/details"), Some(details)).await;
        assert_eq!(status, StatusCode::OK);
        for _ in 0..2 {
            let (status, body) = send(app, "POST", &format!("/v1/wizard/{id}/continue"), None).await;
            assert_eq!(status, StatusCode::OK, "{body}");
        }
    }

    #[tokio::test]
    async fn new_wizard_starts_on_asset_details() {
        let app = router(AppState::managed_only(Arc::new(FakeBackend::default())));
        let (_, view) = send(&app, "POST", "/v1/wizard", None).await;

        assert_eq!(view["step"], "asset_details");
        assert_eq!(view["can_continue"], false);
        assert_eq!(view["form"]["partitions"], json!(["Class A"]));
        assert_eq!(view["steps"][2]["title"], "Review & Sign");
    }

    #[tokio::test]
    async fn continue_requires_name_and_symbol() {
        let app = router(AppState::managed_only(Arc::new(FakeBackend::default())));
        let id = open(&app).await;

        let (status, body) = send(&app, "POST", &format!("/v1/wizard/{id}/continue"), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "Token name and symbol are required to continue");
    }

    #[tokio::test]
    async fn partitions_are_edited_by_index() {
        let app = router(AppState::managed_only(Arc::new(FakeBackend::default())));
        let id = open(&app).await;

        send(&app, "POST", &format!("/v1/wizard/{id}/partitions"), None).await;
        let (status, view) = send(
            &app,
            "PUT",
            &format!("/v1/wizard/{id}/partitions/1"),
            Some(json!({"name": "Class B"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["form"]["partitions"], json!(["Class A", "Class B"]));

        send(&app, "DELETE", &format!("/v1/wizard/{id}/partitions/0"), None).await;
        let (status, body) =
            send(&app, "DELETE", &format!("/v1/wizard/{id}/partitions/0"), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "At least one tranche row must remain");
    }

    #[tokio::test]
    async fn back_from_first_step_closes_the_session() {
        let app = router(AppState::managed_only(Arc::new(FakeBackend::default())));
        let id = open(&app).await;

        let (_, body) = send(&app, "POST", &format!("/v1/wizard/{id}/back"), None).await;
        assert_eq!(body["cancelled"], true);

        let (status, _) = send(&app, "GET", &format!("/v1/wizard/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn managed_confirm_deploys_and_closes_session() {
        let backend = Arc::new(FakeBackend::default());
        let state = AppState::managed_only(backend.clone());
        let app = router(state.clone());
        send(&app, "GET", "/v1/tokens", None).await;
        assert!(!state.store.read().await.tokens.is_stale());
        let id = open(&app).await;
        to_review(&app, &id, json!({"name": "Fund I", "symbol": "FUN"})).await;

        let (_, review) = send(&app, "GET", &format!("/v1/wizard/{id}"), None).await;
        assert_eq!(review["summary"]["custody"], "Managed (Custody Provider)");

        let (status, body) = send(&app, "POST", &format!("/v1/wizard/{id}/confirm"), None).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["message"], "Deployment Submitted! Tx ID: cobo-tx-1");
        assert_eq!(body["warning"], false);
        assert_eq!(backend.requests("deploy_token").len(), 1);
        assert!(state.store.read().await.tokens.is_stale());

        let (status, _) = send(&app, "GET", &format!("/v1/wizard/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn failed_deploy_keeps_session_on_review() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail("deploy_token", "insufficient gas", Some("gas_error"));
        let app = router(AppState::managed_only(backend));
        let id = open(&app).await;
        to_review(&app, &id, json!({"name": "Fund I", "symbol": "FUN"})).await;

        let (status, body) = send(&app, "POST", &format!("/v1/wizard/{id}/confirm"), None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["message"], "insufficient gas");
        assert_eq!(body["detail"], "Error Type: gas_error");

        let (status, view) = send(&app, "GET", &format!("/v1/wizard/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["step"], "review");
    }

    #[tokio::test]
    async fn confirm_before_review_is_refused() {
        let backend = Arc::new(FakeBackend::default());
        let app = router(AppState::managed_only(backend.clone()));
        let id = open(&app).await;

        let (status, _) = send(&app, "POST", &format!("/v1/wizard/{id}/confirm"), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(backend.operations().is_empty());
    }

    #[tokio::test]
    async fn self_custody_confirm_signs_from_wallet() {
        let backend = Arc::new(FakeBackend::default());
        let wallet: Arc<dyn WalletAdapter> = Arc::new(FakeWallet::on(Chain::BscBnb));
        let state = AppState::new(
            backend.clone(),
            Some(wallet),
            crate::rewards::DEFAULT_REFRESH_DELAY,
            tokio_util::sync::CancellationToken::new(),
        );
        let app = router(state);
        let id = open(&app).await;
        to_review(
            &app,
            &id,
            json!({"name": "Fund I", "symbol": "FUN", "mode": "SELF_CUSTODY", "chain": "BSC_BNB"}),
        )
        .await;

        let (status, body) = send(&app, "POST", &format!("/v1/wizard/{id}/confirm"), None).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["outcome"]["outcome"], "deployed");
        assert_eq!(
            backend.operations(),
            vec!["artifacts", "register_token"]
        );
    }

    #[tokio::test]
    async fn self_custody_without_wallet_is_not_connected() {
        let app = router(AppState::managed_only(Arc::new(FakeBackend::default())));
        let id = open(&app).await;
        to_review(
            &app,
            &id,
            json!({"name": "Fund I", "symbol": "FUN", "mode": "SELF_CUSTODY"}),
        )
        .await;

        let (status, body) = send(&app, "POST", &format!("/v1/wizard/{id}/confirm"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Error Type: wallet_not_connected");
    }

    #[tokio::test]
    async fn session_cannot_be_deleted_while_deploying() {
        let backend = Arc::new(FakeBackend::default());
        let fake = Arc::new(FakeWallet::on(Chain::BscBnb));
        let wallet: Arc<dyn WalletAdapter> = fake.clone();
        let state = AppState::new(
            backend.clone(),
            Some(wallet),
            crate::rewards::DEFAULT_REFRESH_DELAY,
            tokio_util::sync::CancellationToken::new(),
        );
        let app = router(state.clone());
        send(&app, "GET", "/v1/tokens", None).await;
        let id = open(&app).await;
        to_review(
            &app,
            &id,
            json!({"name": "Fund I", "symbol": "FUN", "mode": "SELF_CUSTODY", "chain": "BSC_BNB"}),
        )
        .await;

        // Park the deployment on the wallet until the delete has been tried.
        let bound = fake.network_lock().lock().await;
        let confirm = tokio::spawn({
            let app = app.clone();
            let uri = format!("/v1/wizard/{id}/confirm");
            async move { send(&app, "POST", &uri, None).await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let (status, body) = send(&app, "DELETE", &format!("/v1/wizard/{id}"), None).await;
        assert_eq!(status, StatusCode::CONFLICT, "{body}");

        drop(bound);
        let (status, body) = confirm.await.unwrap();
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["outcome"]["outcome"], "deployed");
        assert!(state.store.read().await.tokens.is_stale());

        let (status, _) = send(&app, "GET", &format!("/v1/wizard/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
