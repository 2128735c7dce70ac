// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Rewards Distribution
//!
//! Issuers configure a distribution contract in three independent steps
//! (reward token, snapshot, deposit); investors check what they can claim,
//! claim it, and delegate their voting power so they count in the next
//! snapshot. Every mutation is executed by the backend through the custody
//! provider and identified by a custodial wallet id.
//!
//! Reads are cached in the [`ConsoleStore`]. After a mutation the
//! [`RefreshScheduler`] re-reads the affected value once the chain has had a
//! moment to include the transaction.

pub mod investor;
pub mod issuer;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::backend::{BackendError, RewardsActionRequest, TokenBackend};
use crate::blockchain::Chain;
use crate::error::ValidationError;
use crate::models::{Claimable, RewardsInfo};
use crate::store::{Cached, ConsoleStore, ContractKey};

/// Default delay before re-reading state after a mutation.
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(3000);

/// Rewards contract and the custodial wallet acting on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RewardsTarget {
    pub contract_address: String,
    pub wallet_id: String,
    pub chain: Chain,
}

impl RewardsTarget {
    pub(crate) fn check(&self) -> Result<(), ValidationError> {
        if self.contract_address.trim().is_empty() || self.wallet_id.trim().is_empty() {
            return Err(ValidationError::IncompleteForm);
        }
        Ok(())
    }

    pub fn key(&self) -> ContractKey {
        ContractKey::new(self.chain, &self.contract_address)
    }

    pub(crate) fn action_request(&self) -> RewardsActionRequest {
        RewardsActionRequest {
            contract_address: self.contract_address.trim().to_string(),
            wallet_id: self.wallet_id.trim().to_string(),
            chain_id: self.chain.backend_id().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RewardsStep {
    SetRewardToken,
    TakeSnapshot,
    Deposit,
    Claim,
}

/// Custody provider transactions created by one rewards step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StepReceipt {
    pub step: RewardsStep,
    pub tx_id: String,
    /// Token approval preceding a deposit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approve_tx_id: Option<String>,
    pub message: String,
}

/// Fetch and cache the state of a rewards contract.
pub async fn fetch_rewards_info(
    backend: &dyn TokenBackend,
    store: &RwLock<ConsoleStore>,
    key: &ContractKey,
) -> Result<Cached<RewardsInfo>, BackendError> {
    let info = backend
        .rewards_info(&key.contract, key.chain.backend_id())
        .await?;
    let cached = Cached::now(info.clone());
    store.write().await.store_rewards_info(key.clone(), info);
    Ok(cached)
}

/// Fetch and cache an investor's claimable rewards.
pub async fn fetch_claimable(
    backend: &dyn TokenBackend,
    store: &RwLock<ConsoleStore>,
    key: &ContractKey,
    investor: &str,
) -> Result<Cached<Claimable>, BackendError> {
    let claimable = backend
        .claimable(&key.contract, investor.trim(), key.chain.backend_id())
        .await?;
    let cached = Cached::now(claimable.clone());
    store
        .write()
        .await
        .store_claimable(key.clone(), investor, claimable);
    Ok(cached)
}

/// Delayed re-reads after rewards mutations.
#[derive(Clone)]
pub struct RefreshScheduler {
    backend: Arc<dyn TokenBackend>,
    store: Arc<RwLock<ConsoleStore>>,
    delay: Duration,
    shutdown: CancellationToken,
}

impl RefreshScheduler {
    pub fn new(
        backend: Arc<dyn TokenBackend>,
        store: Arc<RwLock<ConsoleStore>>,
        delay: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            backend,
            store,
            delay,
            shutdown,
        }
    }

    /// Re-read rewards info for `key` after the delay.
    pub fn rewards_info(&self, key: ContractKey) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            if !this.wait().await {
                return;
            }
            match fetch_rewards_info(this.backend.as_ref(), &this.store, &key).await {
                Ok(_) => debug!(contract = %key.contract, "Rewards info refreshed"),
                Err(e) => warn!(contract = %key.contract, error = %e, "Rewards info refresh failed"),
            }
        })
    }

    /// Re-read an investor's claimable amount after the delay.
    pub fn claimable(&self, key: ContractKey, investor: String) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            if !this.wait().await {
                return;
            }
            match fetch_claimable(this.backend.as_ref(), &this.store, &key, &investor).await {
                Ok(_) => debug!(contract = %key.contract, investor = %investor, "Claimable refreshed"),
                Err(e) => warn!(contract = %key.contract, error = %e, "Claimable refresh failed"),
            }
        })
    }

    /// Sleep for the delay; false when shutting down first.
    async fn wait(&self) -> bool {
        tokio::select! {
            _ = self.shutdown.cancelled() => false,
            _ = tokio::time::sleep(self.delay) => true,
        }
    }
}
