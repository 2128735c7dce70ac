// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # View Models
//!
//! Serializable projections returned by the HTTP surface. They carry
//! everything a client needs to render the dashboard (labels, links,
//! formatted amounts, empty-state text) so that no client has to repeat the
//! formatting rules.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::blockchain::encoding::{format_units, parse_base_units, TOKEN_DECIMALS};
use crate::blockchain::{explorer_address_url, Chain};
use crate::models::{Claimable, CustodyMode, Holder, RewardsInfo, TokenRecord, TokenStatus};
use crate::store::{Cached, ContractKey};
use crate::wizard::{TokenForm, Wizard, WizardStep};

pub const NO_HOLDERS: &str = "No holders found.";
pub const NO_CLAIMABLE: &str = "No claimable rewards available for this address";
const MISSING: &str = "-";
const NOT_SET: &str = "Not Set";
const NOT_TAKEN: &str = "Not Taken";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Neutral,
    Warning,
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Badge {
    pub label: &'static str,
    pub tone: Tone,
}

impl From<TokenStatus> for Badge {
    fn from(status: TokenStatus) -> Self {
        match status {
            TokenStatus::Pending => Badge {
                label: "Pending",
                tone: Tone::Warning,
            },
            TokenStatus::Deployed => Badge {
                label: "Deployed",
                tone: Tone::Success,
            },
            TokenStatus::Failed => Badge {
                label: "Failed",
                tone: Tone::Danger,
            },
        }
    }
}

impl From<CustodyMode> for Badge {
    fn from(mode: CustodyMode) -> Self {
        Badge {
            label: mode.label(),
            tone: Tone::Neutral,
        }
    }
}

fn network_name(chain_id: &str) -> String {
    Chain::from_backend_id(chain_id)
        .map(|chain| chain.network().name.to_string())
        .unwrap_or_else(|| chain_id.to_string())
}

// =============================================================================
// Tokens
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TokenRow {
    pub name: String,
    pub symbol: String,
    pub chain_id: String,
    pub network: String,
    pub custody: Badge,
    pub status: Badge,
    /// Contract address, or `-` while unknown.
    pub contract_address: String,
    /// Explorer link, or `#` when there is nothing to link.
    pub explorer_url: String,
    pub partitions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl From<&TokenRecord> for TokenRow {
    fn from(token: &TokenRecord) -> Self {
        let address = token
            .contract_address
            .as_deref()
            .filter(|address| !address.is_empty());

        TokenRow {
            name: token.name.clone(),
            symbol: token.symbol.clone(),
            chain_id: token.chain_id.clone(),
            network: network_name(&token.chain_id),
            custody: token.token_type.into(),
            status: token.status.into(),
            contract_address: address.unwrap_or(MISSING).to_string(),
            explorer_url: explorer_address_url(&token.chain_id, address),
            partitions: token.partitions.clone(),
            tx_id: token.tx_id.clone(),
            tx_hash: token.tx_hash.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TokenTable {
    pub rows: Vec<TokenRow>,
    pub fetched_at: DateTime<Utc>,
}

impl From<&Cached<Vec<TokenRecord>>> for TokenTable {
    fn from(cached: &Cached<Vec<TokenRecord>>) -> Self {
        TokenTable {
            rows: cached.value.iter().map(TokenRow::from).collect(),
            fetched_at: cached.fetched_at,
        }
    }
}

/// Token management panel header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TokenDetail {
    #[serde(flatten)]
    pub row: TokenRow,
    /// Address used for holder, mint and document operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Whether minting signs from the operator's wallet.
    pub wallet_signed: bool,
}

impl From<&TokenRecord> for TokenDetail {
    fn from(token: &TokenRecord) -> Self {
        TokenDetail {
            row: token.into(),
            operation_address: token.operation_address().map(str::to_string),
            owner: token.owner.clone(),
            wallet_signed: token.token_type == CustodyMode::SelfCustody,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HolderTable {
    pub rows: Vec<Holder>,
    /// Shown instead of the table when there are no rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_text: Option<&'static str>,
    pub fetched_at: DateTime<Utc>,
}

impl From<&Cached<Vec<Holder>>> for HolderTable {
    fn from(cached: &Cached<Vec<Holder>>) -> Self {
        HolderTable {
            rows: cached.value.clone(),
            empty_text: cached.value.is_empty().then_some(NO_HOLDERS),
            fetched_at: cached.fetched_at,
        }
    }
}

// =============================================================================
// Rewards
// =============================================================================

fn format_base_units(raw: &str) -> String {
    parse_base_units(raw)
        .map(|amount| format_units(amount, TOKEN_DECIMALS))
        .unwrap_or_else(|| raw.to_string())
}

fn short_address(address: &str) -> String {
    let head = address.get(..6);
    let tail = address.len().checked_sub(4).and_then(|start| address.get(start..));
    match (head, tail) {
        (Some(head), Some(tail)) if address.len() > 10 => format!("{head}...{tail}"),
        _ => address.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RewardsInfoView {
    pub contract_address: String,
    pub chain: Chain,
    pub reward_token_set: bool,
    /// Shortened reward token address, or `Not Set`.
    pub reward_token: String,
    pub snapshot_taken: bool,
    /// Snapshot block, or `Not Taken`.
    pub snapshot: String,
    pub total_snapshot_supply: String,
    pub total_reward_amount: String,
    pub current_block: u64,
    pub raw: RewardsInfo,
    pub fetched_at: DateTime<Utc>,
}

impl RewardsInfoView {
    pub fn new(key: &ContractKey, cached: &Cached<RewardsInfo>) -> Self {
        let info = &cached.value;
        let reward_token = info
            .reward_token
            .as_deref()
            .filter(|token| !token.is_empty() && !is_zero_address(token));
        let snapshot_taken = info.snapshot_block > 0;

        RewardsInfoView {
            contract_address: key.contract.clone(),
            chain: key.chain,
            reward_token_set: reward_token.is_some(),
            reward_token: reward_token.map_or_else(|| NOT_SET.to_string(), short_address),
            snapshot_taken,
            snapshot: if snapshot_taken {
                info.snapshot_block.to_string()
            } else {
                NOT_TAKEN.to_string()
            },
            total_snapshot_supply: format_base_units(&info.total_snapshot_supply),
            total_reward_amount: format_base_units(&info.total_reward_amount),
            current_block: info.current_block,
            raw: info.clone(),
            fetched_at: cached.fetched_at,
        }
    }
}

fn is_zero_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|hex| !hex.is_empty() && hex.bytes().all(|b| b == b'0'))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ClaimableView {
    pub investor: String,
    /// Base units.
    pub claimable: String,
    /// Base units.
    pub claimed: String,
    pub formatted_claimable: String,
    pub formatted_claimed: String,
    pub can_claim: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
    pub fetched_at: DateTime<Utc>,
}

impl ClaimableView {
    pub fn new(investor: &str, cached: &Cached<Claimable>) -> Self {
        let claimable = &cached.value;
        let can_claim = parse_base_units(&claimable.claimable).is_some_and(|v| !v.is_zero());

        ClaimableView {
            investor: investor.trim().to_string(),
            claimable: claimable.claimable.clone(),
            claimed: claimable.claimed.clone(),
            formatted_claimable: format_base_units(&claimable.claimable),
            formatted_claimed: format_base_units(&claimable.claimed),
            can_claim,
            notice: (!can_claim).then_some(NO_CLAIMABLE),
            fetched_at: cached.fetched_at,
        }
    }
}

// =============================================================================
// Wizard
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Done,
    Current,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StepHeader {
    pub number: u8,
    pub title: &'static str,
    pub state: StepState,
}

/// Deployment summary shown on the review step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReviewSummary {
    pub custody: &'static str,
    pub network: String,
    pub name: String,
    pub symbol: String,
    pub partitions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct WizardView {
    pub id: Uuid,
    pub step: WizardStep,
    pub steps: Vec<StepHeader>,
    pub form: TokenForm,
    pub can_continue: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReviewSummary>,
}

impl From<&Wizard> for WizardView {
    fn from(wizard: &Wizard) -> Self {
        let current = wizard.step();
        let steps = WizardStep::ALL
            .into_iter()
            .map(|step| StepHeader {
                number: step.number(),
                title: step.title(),
                state: match step.cmp(&current) {
                    std::cmp::Ordering::Less => StepState::Done,
                    std::cmp::Ordering::Equal => StepState::Current,
                    std::cmp::Ordering::Greater => StepState::Upcoming,
                },
            })
            .collect();

        let form = wizard.form();
        let summary = (current == WizardStep::Review).then(|| ReviewSummary {
            custody: form.mode.label(),
            network: form.chain.to_string(),
            name: form.name.trim().to_string(),
            symbol: form.symbol.trim().to_string(),
            partitions: form.valid_partitions(),
        });

        WizardView {
            id: wizard.id(),
            step: current,
            steps,
            form: form.clone(),
            can_continue: wizard.can_continue(),
            summary,
        }
    }
}
