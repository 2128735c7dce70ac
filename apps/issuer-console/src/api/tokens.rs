// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token list, management panel, minting and document linking.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::{find_token, hold, token_list, RefreshQuery};
use crate::{
    busy::forms,
    documents::{self, DocumentDraft},
    error::{ApiError, ErrorDisplay},
    models::Holder,
    state::AppState,
    store::Cached,
    views::{HolderTable, TokenDetail, TokenTable},
    workflow::{mint_tokens, CustodyRoute, MintOrder, MintOutcome},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct MintResponse {
    pub message: String,
    pub outcome: MintOutcome,
}

/// Document link form. The file travels base64-encoded and only its hash
/// is forwarded; a precomputed `hash` is accepted instead of a file.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DocumentUpload {
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub file_base64: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub message: String,
    pub hash: String,
}

#[utoipa::path(
    get,
    path = "/v1/tokens",
    params(RefreshQuery),
    tag = "Tokens",
    responses(
        (status = 200, body = TokenTable),
        (status = 502, body = ErrorDisplay)
    )
)]
pub async fn list_tokens(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<TokenTable>, ApiError> {
    let tokens = token_list(&state, query.refresh).await?;
    Ok(Json(TokenTable::from(&tokens)))
}

#[utoipa::path(
    get,
    path = "/v1/tokens/{chain}/{address}",
    params(
        ("chain" = String, Path, description = "Backend chain id, e.g. BSC_BNB"),
        ("address" = String, Path, description = "Contract address, or owner while pending")
    ),
    tag = "Tokens",
    responses(
        (status = 200, body = TokenDetail),
        (status = 404, body = ErrorDisplay)
    )
)]
pub async fn token_detail(
    State(state): State<AppState>,
    Path((chain, address)): Path<(String, String)>,
) -> Result<Json<TokenDetail>, ApiError> {
    let token = find_token(&state, &chain, &address).await?;
    Ok(Json(TokenDetail::from(&token)))
}

#[utoipa::path(
    get,
    path = "/v1/tokens/{chain}/{address}/holders",
    params(
        ("chain" = String, Path, description = "Backend chain id"),
        ("address" = String, Path, description = "Contract address, or owner while pending"),
        RefreshQuery
    ),
    tag = "Tokens",
    responses(
        (status = 200, body = HolderTable),
        (status = 404, body = ErrorDisplay),
        (status = 502, body = ErrorDisplay)
    )
)]
pub async fn list_holders(
    State(state): State<AppState>,
    Path((chain, address)): Path<(String, String)>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<HolderTable>, ApiError> {
    if !query.refresh {
        if let Some(cached) = state.store.read().await.holders(&chain, &address) {
            return Ok(Json(HolderTable::from(cached)));
        }
    }

    let token = find_token(&state, &chain, &address).await?;
    let operation_address = token
        .operation_address()
        .ok_or_else(|| ApiError::not_found("Token has no address yet"))?;
    let holders: Vec<Holder> = state
        .backend
        .holders(&token.chain_id, operation_address)
        .await?;

    let cached = Cached::now(holders.clone());
    state
        .store
        .write()
        .await
        .store_holders(&chain, &address, holders);
    Ok(Json(HolderTable::from(&cached)))
}

/// Issue tokens into one partition. Self-custody tokens are signed by the
/// connected wallet, managed tokens by the custody provider.
#[utoipa::path(
    post,
    path = "/v1/tokens/{chain}/{address}/mint",
    params(
        ("chain" = String, Path, description = "Backend chain id"),
        ("address" = String, Path, description = "Contract address, or owner while pending")
    ),
    request_body = MintOrder,
    tag = "Tokens",
    responses(
        (status = 200, body = MintResponse),
        (status = 400, description = "Wallet not connected or wrong network", body = ErrorDisplay),
        (status = 409, description = "Mint already in flight or signature rejected", body = ErrorDisplay),
        (status = 422, body = ErrorDisplay),
        (status = 502, body = ErrorDisplay)
    )
)]
pub async fn mint(
    State(state): State<AppState>,
    Path((chain, address)): Path<(String, String)>,
    Json(order): Json<MintOrder>,
) -> Result<Json<MintResponse>, ApiError> {
    let _guard = hold(&state, forms::mint(&chain.to_ascii_uppercase(), &address))?;

    let token = find_token(&state, &chain, &address).await?;
    let route = CustodyRoute::resolve(token.token_type, state.wallet())?;
    let outcome = mint_tokens(state.backend.as_ref(), route, &token, &order).await?;

    {
        let mut store = state.store.write().await;
        store.invalidate_holders(&chain, &address);
        store.tokens.invalidate();
    }

    info!(symbol = %token.symbol, partition = %order.partition, custody = ?route, "Mint finished");
    Ok(Json(MintResponse {
        message: outcome.message(),
        outcome,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/tokens/{chain}/{address}/documents",
    params(
        ("chain" = String, Path, description = "Backend chain id"),
        ("address" = String, Path, description = "Contract address, or owner while pending")
    ),
    request_body = DocumentUpload,
    tag = "Tokens",
    responses(
        (status = 200, body = DocumentResponse),
        (status = 409, body = ErrorDisplay),
        (status = 422, body = ErrorDisplay),
        (status = 502, body = ErrorDisplay)
    )
)]
pub async fn attach_document(
    State(state): State<AppState>,
    Path((chain, address)): Path<(String, String)>,
    Json(upload): Json<DocumentUpload>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let _guard = hold(&state, forms::document(&chain.to_ascii_uppercase(), &address))?;

    let mut draft = DocumentDraft {
        name: upload.name,
        uri: upload.uri,
        hash: upload.hash.filter(|h| !h.trim().is_empty()),
    };
    if let Some(encoded) = upload.file_base64.as_deref() {
        draft.attach_base64(encoded)?;
    }

    let token = find_token(&state, &chain, &address).await?;
    documents::attach_document(state.backend.as_ref(), &token, &draft).await?;

    Ok(Json(DocumentResponse {
        message: "Document Linked!".to_string(),
        hash: draft.hash.unwrap_or_default(),
    }))
}
