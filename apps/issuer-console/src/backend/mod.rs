// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tokenization backend API.
//!
//! Managed custody, contract artifacts, registration of self-custody results,
//! holder accounting, documents and rewards all live behind the backend. The
//! console reaches it through the [`TokenBackend`] capability so workflows
//! can be exercised against a fake.

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::models::{Claimable, Holder, RewardsInfo, TokenRecord, WalletLookup};

pub use client::{BackendError, HttpBackend};
pub use types::*;

#[async_trait]
pub trait TokenBackend: Send + Sync {
    async fn list_tokens(&self) -> Result<Vec<TokenRecord>, BackendError>;

    async fn deploy_token(
        &self,
        request: &DeployTokenRequest,
    ) -> Result<DeployTokenResponse, BackendError>;

    async fn register_token(&self, request: &RegisterTokenRequest) -> Result<(), BackendError>;

    async fn artifacts(&self) -> Result<ContractArtifacts, BackendError>;

    async fn mint(&self, request: &MintRequest) -> Result<(), BackendError>;

    async fn register_mint(&self, request: &RegisterMintRequest) -> Result<(), BackendError>;

    async fn holders(&self, chain_id: &str, address: &str) -> Result<Vec<Holder>, BackendError>;

    async fn attach_document(&self, request: &DocumentRequest) -> Result<(), BackendError>;

    async fn rewards_info(&self, contract: &str, chain_id: &str) -> Result<RewardsInfo, BackendError>;

    /// Returns the custody provider transaction id.
    async fn set_reward_token(&self, request: &SetRewardTokenRequest) -> Result<String, BackendError>;

    async fn take_snapshot(&self, request: &RewardsActionRequest) -> Result<String, BackendError>;

    async fn deposit_rewards(
        &self,
        request: &DepositRewardsRequest,
    ) -> Result<DepositReceipt, BackendError>;

    async fn claim_rewards(&self, request: &RewardsActionRequest) -> Result<String, BackendError>;

    async fn delegate(&self, request: &DelegateRequest) -> Result<String, BackendError>;

    async fn claimable(
        &self,
        contract: &str,
        investor: &str,
        chain_id: &str,
    ) -> Result<Claimable, BackendError>;

    async fn find_wallet_by_address(
        &self,
        address: &str,
        chain_id: &str,
    ) -> Result<WalletLookup, BackendError>;
}
