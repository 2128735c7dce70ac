// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::blockchain::Chain;
use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Tokenization backend reachability.
    pub backend: String,
    /// Self-custody wallet RPC status. Absent when no signer is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<String>,
    /// Network the wallet is on, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_chain: Option<Chain>,
}

async fn check_backend(state: &AppState) -> String {
    match state.backend.list_tokens().await {
        Ok(_) => "ok".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Backend health check failed");
            "unavailable".to_string()
        }
    }
}

async fn check_wallet(state: &AppState) -> (Option<String>, Option<Chain>) {
    let Some(wallet) = state.wallet() else {
        return (None, None);
    };
    match wallet.current_chain().await {
        Ok(chain_id) => (Some("ok".to_string()), Chain::from_evm_chain_id(chain_id)),
        Err(e) => {
            tracing::warn!(error = %e, "Wallet health check failed");
            (Some("unavailable".to_string()), None)
        }
    }
}

/// Health check endpoint handler.
///
/// Returns 200 if all checks pass, 503 if any check fails.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "A dependency is unavailable", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let backend = check_backend(&state).await;
    let (wallet, wallet_chain) = check_wallet(&state).await;

    let all_ok = backend == "ok" && wallet.as_deref().is_none_or(|w| w == "ok");

    let response = HealthResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: Some(HealthChecks {
            service: "ok".to_string(),
            backend,
            wallet,
            wallet_chain,
        }),
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler. Does not check dependencies.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        checks: None,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api::router;
    use crate::blockchain::WalletAdapter;
    use crate::testing::{send, FakeBackend, FakeWallet};

    #[tokio::test]
    async fn liveness_is_always_ok() {
        let app = router(AppState::managed_only(Arc::new(FakeBackend::default())));
        let (status, body) = send(&app, "GET", "/health/live", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn health_reports_wallet_network() {
        let wallet: Arc<dyn WalletAdapter> = Arc::new(FakeWallet::on(Chain::Sepolia));
        let state = AppState::new(
            Arc::new(FakeBackend::default()),
            Some(wallet),
            crate::rewards::DEFAULT_REFRESH_DELAY,
            tokio_util::sync::CancellationToken::new(),
        );
        let (status, body) = send(&router(state), "GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["backend"], "ok");
        assert_eq!(body["checks"]["wallet"], "ok");
        assert_eq!(body["checks"]["wallet_chain"], "ETH_SEPOLIA");
    }

    #[tokio::test]
    async fn unreachable_backend_degrades_health() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail("list_tokens", "connection refused", None);
        let app = router(AppState::managed_only(backend));

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "degraded");
        assert!(body["checks"].get("wallet").is_none());
    }
}
