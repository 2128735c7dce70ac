// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Domain Records
//!
//! Projections of backend- and chain-owned entities. The console never holds
//! authoritative copies: every record here is refetchable and replaced
//! wholesale on refresh.
//!
//! ## Model Categories
//!
//! - **Tokens**: issued security tokens and their partitions
//! - **Holders**: per-partition balances derived from registered mints
//! - **Rewards**: distribution contract state and investor claimables

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Custody
// =============================================================================

/// Who signs transactions for a token.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustodyMode {
    /// Backend-held keys execute transactions on the issuer's behalf.
    #[default]
    Managed,
    /// The operator's own wallet signs and submits.
    #[serde(alias = "BYOW")]
    SelfCustody,
}

impl CustodyMode {
    pub fn label(self) -> &'static str {
        match self {
            CustodyMode::Managed => "Managed (Custody Provider)",
            CustodyMode::SelfCustody => "Self-Custody",
        }
    }
}

// =============================================================================
// Tokens
// =============================================================================

/// Deployment status reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TokenStatus {
    #[default]
    #[serde(alias = "Submitted")]
    Pending,
    Deployed,
    Failed,
}

/// An issued security token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenRecord {
    pub name: String,
    pub symbol: String,
    /// Custody classification.
    #[serde(rename = "type", default)]
    pub token_type: CustodyMode,
    /// Backend chain identifier (e.g. `BSC_BNB`).
    pub chain_id: String,
    /// Known once deployment completes.
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub status: TokenStatus,
    /// Partition (tranche) names in display order.
    #[serde(default)]
    pub partitions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_id: Option<String>,
}

impl TokenRecord {
    /// Address used to key backend token operations.
    ///
    /// Managed deployments may not know their contract address yet; the
    /// backend then keys the token by its owner.
    pub fn operation_address(&self) -> Option<&str> {
        self.contract_address
            .as_deref()
            .or(self.owner.as_deref())
            .filter(|address| !address.is_empty())
    }

    /// Whether this record is addressed by `address` (contract or owner).
    pub fn matches(&self, chain_id: &str, address: &str) -> bool {
        self.chain_id.eq_ignore_ascii_case(chain_id)
            && self
                .operation_address()
                .is_some_and(|own| own.eq_ignore_ascii_case(address))
    }

    pub fn has_partition(&self, partition: &str) -> bool {
        self.partitions.iter().any(|p| p == partition)
    }
}

/// A holder balance within one partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Holder {
    pub address: String,
    pub partition: String,
    /// Balance in display units, as reported by the backend.
    #[serde(deserialize_with = "string_or_number")]
    pub balance: String,
}

// =============================================================================
// Rewards
// =============================================================================

/// State of a rewards distribution contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewardsInfo {
    /// Reward token address; zero address until set.
    #[serde(default)]
    pub reward_token: Option<String>,
    /// Block of the latest snapshot; zero before the first snapshot.
    #[serde(default)]
    pub snapshot_block: u64,
    /// Base units.
    #[serde(default, deserialize_with = "string_or_number")]
    pub total_snapshot_supply: String,
    /// Base units.
    #[serde(default, deserialize_with = "string_or_number")]
    pub total_reward_amount: String,
    #[serde(default)]
    pub current_block: u64,
}

/// Claimable and already-claimed rewards of one investor, in base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claimable {
    #[serde(deserialize_with = "string_or_number")]
    pub claimable: String,
    #[serde(deserialize_with = "string_or_number")]
    pub claimed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investor: Option<String>,
}

/// Custodial wallet lookup result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WalletLookup {
    /// `success` or `not_found`.
    pub status: String,
    #[serde(default)]
    pub wallet_id: Option<String>,
    #[serde(default)]
    pub wallet_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Accept integers or strings for amounts the backend may send either way.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok("0".to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected amount, found {other}"
        ))),
    }
}
