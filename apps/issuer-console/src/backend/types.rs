// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wire types of the tokenization backend.

use serde::{Deserialize, Serialize};

use crate::models::CustodyMode;

/// `POST /tokens/deploy`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployTokenRequest {
    pub chain_id: String,
    pub name: String,
    pub symbol: String,
    pub partitions: Vec<String>,
    pub supply: u64,
}

/// Managed deployment acceptance. Acceptance is not deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployTokenResponse {
    pub tx_id: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub wallet_id: Option<String>,
}

/// `POST /tokens/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterTokenRequest {
    pub chain_id: String,
    pub name: String,
    pub symbol: String,
    pub contract_address: String,
    pub tx_hash: String,
    pub partitions: Vec<String>,
    pub owner: String,
    #[serde(rename = "type")]
    pub token_type: CustodyMode,
}

/// `GET /artifacts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractArtifacts {
    pub abi: serde_json::Value,
    pub bytecode: String,
}

/// `POST /tokens/mint`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    pub chain_id: String,
    pub contract_address: String,
    pub partition: String,
    pub to_address: String,
    /// Whole display units.
    pub amount: u128,
}

/// `POST /tokens/mint/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterMintRequest {
    pub chain_id: String,
    pub contract_address: String,
    pub partition: String,
    pub to_address: String,
    /// Whole display units.
    pub amount: u128,
    pub tx_hash: String,
}

/// `POST /tokens/document`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub chain_id: String,
    pub contract_address: String,
    pub name: String,
    pub uri: String,
    pub hash: String,
}

/// `POST /rewards/set-reward-token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRewardTokenRequest {
    pub contract_address: String,
    pub reward_token_address: String,
    pub wallet_id: String,
    pub chain_id: String,
}

/// `POST /rewards/take-snapshot` and `POST /rewards/claim`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardsActionRequest {
    pub contract_address: String,
    pub wallet_id: String,
    pub chain_id: String,
}

/// `POST /rewards/deposit`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRewardsRequest {
    pub contract_address: String,
    /// Base units as a decimal string; exceeds JSON-safe integers.
    pub amount: String,
    pub wallet_id: String,
    pub chain_id: String,
    pub auto_approve: bool,
}

/// `POST /rewards/delegate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateRequest {
    pub token_contract_address: String,
    pub delegatee_address: String,
    pub wallet_id: String,
    pub chain_id: String,
}

/// Transactions created by a deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceipt {
    #[serde(default)]
    pub approve_tx_id: Option<String>,
    pub deposit_tx_id: String,
}

/// Envelope used by the rewards and wallet endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    #[serde(default)]
    pub tx_id: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body of a failed backend call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub error_type: Option<String>,
}

impl ErrorBody {
    /// `detail` may be a string or a structured validation report.
    pub fn detail_text(&self) -> Option<String> {
        match &self.detail {
            Some(serde_json::Value::String(text)) => Some(text.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }
}
