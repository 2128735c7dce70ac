// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Investor-side rewards: claimable amounts, claims and wallet lookup.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use super::{fetch_claimable, RewardsStep, RewardsTarget, StepReceipt};
use crate::backend::TokenBackend;
use crate::blockchain::Chain;
use crate::error::ValidationError;
use crate::models::Claimable;
use crate::store::{Cached, ConsoleStore, ContractKey};
use crate::workflow::WorkflowError;

/// Investor inputs shorter than this are still being typed.
pub const MIN_LOOKUP_LEN: usize = 10;

const FOUND: &str = "success";
const NOT_FOUND: &str = "not_found";

/// Read an investor's claimable and claimed rewards.
pub async fn check_claimable(
    backend: &dyn TokenBackend,
    store: &RwLock<ConsoleStore>,
    key: &ContractKey,
    investor: &str,
) -> Result<Cached<Claimable>, WorkflowError> {
    if key.contract.is_empty() || investor.trim().is_empty() {
        return Err(ValidationError::IncompleteForm.into());
    }
    Ok(fetch_claimable(backend, store, key, investor).await?)
}

/// Claim accrued rewards through the investor's custodial wallet.
pub async fn claim(
    backend: &dyn TokenBackend,
    target: &RewardsTarget,
) -> Result<StepReceipt, WorkflowError> {
    target.check()?;

    let tx_id = backend.claim_rewards(&target.action_request()).await?;

    info!(contract = %target.contract_address, wallet_id = %target.wallet_id, tx_id = %tx_id, "Claim submitted");
    Ok(StepReceipt {
        step: RewardsStep::Claim,
        message: format!("Claim transaction submitted! TX ID: {tx_id}"),
        tx_id,
        approve_tx_id: None,
    })
}

/// How the custodial wallet id for an investor address was decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "resolution", rename_all = "snake_case")]
pub enum WalletResolution {
    /// Input too short to look up; nothing changes.
    Skipped,
    /// The address belongs to a known custodial wallet.
    Found {
        wallet_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        wallet_name: Option<String>,
    },
    /// Unknown address; the backend's default wallet is used instead.
    Fallback {
        wallet_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Lookup failed; the current wallet id stays in place.
    Kept {
        #[serde(skip_serializing_if = "Option::is_none")]
        wallet_id: Option<String>,
        reason: String,
    },
}

impl WalletResolution {
    /// Wallet id to use from now on.
    pub fn wallet_id(&self) -> Option<&str> {
        match self {
            WalletResolution::Found { wallet_id, .. }
            | WalletResolution::Fallback { wallet_id, .. } => Some(wallet_id),
            WalletResolution::Kept { wallet_id, .. } => wallet_id.as_deref(),
            WalletResolution::Skipped => None,
        }
    }
}

/// Find the custodial wallet id for `investor`. Never fails: a failed
/// lookup keeps `current`.
pub async fn resolve_wallet_id(
    backend: &dyn TokenBackend,
    investor: &str,
    chain: Chain,
    current: Option<String>,
) -> WalletResolution {
    let investor = investor.trim();
    if investor.len() < MIN_LOOKUP_LEN {
        return WalletResolution::Skipped;
    }

    let kept = |reason: String| WalletResolution::Kept {
        wallet_id: current.clone(),
        reason,
    };

    let lookup = match backend.find_wallet_by_address(investor, chain.backend_id()).await {
        Ok(lookup) => lookup,
        Err(e) => {
            warn!(investor = %investor, error = %e, "Wallet lookup failed, keeping current wallet id");
            return kept(e.to_string());
        }
    };

    match (lookup.status.as_str(), lookup.wallet_id) {
        (FOUND, Some(wallet_id)) => {
            debug!(wallet_id = %wallet_id, "Wallet id resolved from investor address");
            WalletResolution::Found {
                wallet_id,
                wallet_name: lookup.wallet_name,
            }
        }
        (NOT_FOUND, Some(wallet_id)) => {
            info!(investor = %investor, wallet_id = %wallet_id, "Investor address unknown, using default wallet");
            WalletResolution::Fallback {
                wallet_id,
                message: lookup.message,
            }
        }
        (status, _) => kept(
            lookup
                .message
                .unwrap_or_else(|| format!("wallet lookup returned `{status}`")),
        ),
    }
}
