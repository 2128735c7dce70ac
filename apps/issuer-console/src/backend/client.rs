// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `reqwest` implementation of [`TokenBackend`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::types::*;
use super::TokenBackend;
use crate::models::{Claimable, Holder, RewardsInfo, TokenRecord, WalletLookup};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const SUCCESS: &str = "success";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("Backend request failed: {0}")]
    Transport(String),

    #[error("{}", status_message(.status, .detail))]
    Status {
        status: u16,
        detail: Option<String>,
        error_type: Option<String>,
    },

    #[error("{detail}")]
    Rejected { detail: String },

    #[error("Backend response was invalid: {0}")]
    InvalidResponse(String),
}

fn status_message(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => detail.clone(),
        None => format!("Backend returned HTTP {status}"),
    }
}

impl BackendError {
    /// Backend-provided error classification, if any.
    pub fn error_type(&self) -> Option<&str> {
        match self {
            BackendError::Status { error_type, .. } => error_type.as_deref(),
            _ => None,
        }
    }
}

impl<T> Envelope<T> {
    fn rejection(&self, fallback: &str) -> BackendError {
        BackendError::Rejected {
            detail: self
                .detail
                .clone()
                .or_else(|| self.message.clone())
                .unwrap_or_else(|| fallback.to_string()),
        }
    }

    /// Transaction id of a successful mutation.
    pub fn into_tx_id(self, fallback: &str) -> Result<String, BackendError> {
        if self.status != SUCCESS {
            return Err(self.rejection(fallback));
        }
        self.tx_id
            .ok_or_else(|| BackendError::InvalidResponse("missing tx_id in response".to_string()))
    }

    /// Payload of a successful read.
    pub fn into_data(self, fallback: &str) -> Result<T, BackendError> {
        if self.status != SUCCESS {
            return Err(self.rejection(fallback));
        }
        self.data
            .ok_or_else(|| BackendError::InvalidResponse("missing data in response".to_string()))
    }
}

/// HTTP client for the tokenization backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: Url,
    http: Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let base_url =
            Url::parse(base_url).map_err(|e| BackendError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(base_url.to_string()));
        }

        let http = Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(|e| BackendError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL; segments are percent-encoded.
    fn endpoint(&self, segments: &[&str], chain_id: Option<&str>) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if let Some(chain_id) = chain_id {
            url.query_pairs_mut().append_pair("chain_id", chain_id);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        chain_id: Option<&str>,
    ) -> Result<T, BackendError> {
        let url = self.endpoint(segments, chain_id)?;
        debug!(%url, "GET backend");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        read_json(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, BackendError> {
        let url = self.endpoint(segments, None)?;
        debug!(%url, "POST backend");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| BackendError::Transport(e.to_string()))?;

    if !status.is_success() {
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
        warn!(
            status = status.as_u16(),
            error_type = body.error_type.as_deref().unwrap_or("-"),
            "Backend call failed"
        );
        return Err(BackendError::Status {
            status: status.as_u16(),
            detail: body.detail_text(),
            error_type: body.error_type,
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| BackendError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl TokenBackend for HttpBackend {
    async fn list_tokens(&self) -> Result<Vec<TokenRecord>, BackendError> {
        self.get_json(&["tokens"], None).await
    }

    async fn deploy_token(
        &self,
        request: &DeployTokenRequest,
    ) -> Result<DeployTokenResponse, BackendError> {
        self.post_json(&["tokens", "deploy"], request).await
    }

    async fn register_token(&self, request: &RegisterTokenRequest) -> Result<(), BackendError> {
        let _: serde_json::Value = self.post_json(&["tokens", "register"], request).await?;
        Ok(())
    }

    async fn artifacts(&self) -> Result<ContractArtifacts, BackendError> {
        self.get_json(&["artifacts"], None).await
    }

    async fn mint(&self, request: &MintRequest) -> Result<(), BackendError> {
        let _: serde_json::Value = self.post_json(&["tokens", "mint"], request).await?;
        Ok(())
    }

    async fn register_mint(&self, request: &RegisterMintRequest) -> Result<(), BackendError> {
        let _: serde_json::Value = self
            .post_json(&["tokens", "mint", "register"], request)
            .await?;
        Ok(())
    }

    async fn holders(&self, chain_id: &str, address: &str) -> Result<Vec<Holder>, BackendError> {
        self.get_json(&["tokens", chain_id, address, "holders"], None)
            .await
    }

    async fn attach_document(&self, request: &DocumentRequest) -> Result<(), BackendError> {
        let _: serde_json::Value = self.post_json(&["tokens", "document"], request).await?;
        Ok(())
    }

    async fn rewards_info(&self, contract: &str, chain_id: &str) -> Result<RewardsInfo, BackendError> {
        let envelope: Envelope<RewardsInfo> = self
            .get_json(&["rewards", "info", contract], Some(chain_id))
            .await?;
        envelope.into_data("Failed to fetch rewards info")
    }

    async fn set_reward_token(&self, request: &SetRewardTokenRequest) -> Result<String, BackendError> {
        let envelope: Envelope<serde_json::Value> = self
            .post_json(&["rewards", "set-reward-token"], request)
            .await?;
        envelope.into_tx_id("Failed to set reward token")
    }

    async fn take_snapshot(&self, request: &RewardsActionRequest) -> Result<String, BackendError> {
        let envelope: Envelope<serde_json::Value> = self
            .post_json(&["rewards", "take-snapshot"], request)
            .await?;
        envelope.into_tx_id("Failed to take snapshot")
    }

    async fn deposit_rewards(
        &self,
        request: &DepositRewardsRequest,
    ) -> Result<DepositReceipt, BackendError> {
        let envelope: Envelope<DepositReceipt> =
            self.post_json(&["rewards", "deposit"], request).await?;
        envelope.into_data("Failed to deposit rewards")
    }

    async fn claim_rewards(&self, request: &RewardsActionRequest) -> Result<String, BackendError> {
        let envelope: Envelope<serde_json::Value> =
            self.post_json(&["rewards", "claim"], request).await?;
        envelope.into_tx_id("Failed to claim rewards")
    }

    async fn delegate(&self, request: &DelegateRequest) -> Result<String, BackendError> {
        let envelope: Envelope<serde_json::Value> =
            self.post_json(&["rewards", "delegate"], request).await?;
        envelope.into_tx_id("Failed to delegate tokens")
    }

    async fn claimable(
        &self,
        contract: &str,
        investor: &str,
        chain_id: &str,
    ) -> Result<Claimable, BackendError> {
        let envelope: Envelope<Claimable> = self
            .get_json(&["rewards", "claimable", contract, investor], Some(chain_id))
            .await?;
        envelope.into_data("Failed to fetch claimable amount")
    }

    async fn find_wallet_by_address(
        &self,
        address: &str,
        chain_id: &str,
    ) -> Result<WalletLookup, BackendError> {
        self.get_json(&["wallets", "find-by-address", address], Some(chain_id))
            .await
    }
}
