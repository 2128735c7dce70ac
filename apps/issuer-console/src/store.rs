// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory console state.
//!
//! Everything here is either a session (wizards) or a cache of backend
//! reads. Caches are replaced wholesale when refetched and are never edited
//! in place; writes only mark them stale.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::blockchain::Chain;
use crate::error::ApiError;
use crate::models::{Claimable, Holder, RewardsInfo, TokenRecord};
use crate::wizard::Wizard;

/// A fetched value and when it was fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cached<T> {
    pub value: T,
    pub fetched_at: DateTime<Utc>,
}

impl<T> Cached<T> {
    pub fn now(value: T) -> Self {
        Self {
            value,
            fetched_at: Utc::now(),
        }
    }
}

/// Last fetched token list.
#[derive(Debug, Default)]
pub struct TokenListCache {
    entry: Option<Cached<Vec<TokenRecord>>>,
    stale: bool,
}

impl TokenListCache {
    /// Fresh contents, if any.
    pub fn fresh(&self) -> Option<&Cached<Vec<TokenRecord>>> {
        self.entry.as_ref().filter(|_| !self.stale)
    }

    /// Last contents regardless of staleness.
    pub fn last(&self) -> Option<&Cached<Vec<TokenRecord>>> {
        self.entry.as_ref()
    }

    pub fn replace(&mut self, tokens: Vec<TokenRecord>) {
        self.entry = Some(Cached::now(tokens));
        self.stale = false;
    }

    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn is_stale(&self) -> bool {
        self.stale || self.entry.is_none()
    }
}

/// Key of a token-scoped cache entry.
fn token_key(chain_id: &str, address: &str) -> String {
    format!("{}:{}", chain_id.to_ascii_uppercase(), address.to_ascii_lowercase())
}

/// Key of a rewards contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractKey {
    pub chain: Chain,
    pub contract: String,
}

impl ContractKey {
    pub fn new(chain: Chain, contract: &str) -> Self {
        Self {
            chain,
            contract: contract.trim().to_ascii_lowercase(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ConsoleStore {
    pub tokens: TokenListCache,
    wizards: HashMap<Uuid, Wizard>,
    holders: HashMap<String, Cached<Vec<Holder>>>,
    rewards_info: HashMap<ContractKey, Cached<RewardsInfo>>,
    claimables: HashMap<(ContractKey, String), Cached<Claimable>>,
}

impl ConsoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- wizards -----------------------------------------------------------

    pub fn open_wizard(&mut self) -> &Wizard {
        let wizard = Wizard::new();
        let id = wizard.id();
        self.wizards.entry(id).or_insert(wizard)
    }

    pub fn wizard(&self, id: Uuid) -> Result<&Wizard, ApiError> {
        self.wizards
            .get(&id)
            .ok_or_else(|| ApiError::not_found("Wizard not found"))
    }

    pub fn wizard_mut(&mut self, id: Uuid) -> Result<&mut Wizard, ApiError> {
        self.wizards
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("Wizard not found"))
    }

    pub fn close_wizard(&mut self, id: Uuid) -> Result<Wizard, ApiError> {
        self.wizards
            .remove(&id)
            .ok_or_else(|| ApiError::not_found("Wizard not found"))
    }

    // ---- tokens ------------------------------------------------------------

    /// Find a token in the last fetched list.
    pub fn find_token(&self, chain_id: &str, address: &str) -> Option<&TokenRecord> {
        self.tokens
            .last()?
            .value
            .iter()
            .find(|token| token.matches(chain_id, address))
    }

    pub fn holders(&self, chain_id: &str, address: &str) -> Option<&Cached<Vec<Holder>>> {
        self.holders.get(&token_key(chain_id, address))
    }

    pub fn store_holders(&mut self, chain_id: &str, address: &str, holders: Vec<Holder>) {
        self.holders
            .insert(token_key(chain_id, address), Cached::now(holders));
    }

    pub fn invalidate_holders(&mut self, chain_id: &str, address: &str) {
        self.holders.remove(&token_key(chain_id, address));
    }

    // ---- rewards -----------------------------------------------------------

    pub fn rewards_info(&self, key: &ContractKey) -> Option<&Cached<RewardsInfo>> {
        self.rewards_info.get(key)
    }

    pub fn store_rewards_info(&mut self, key: ContractKey, info: RewardsInfo) {
        self.rewards_info.insert(key, Cached::now(info));
    }

    pub fn claimable(&self, key: &ContractKey, investor: &str) -> Option<&Cached<Claimable>> {
        self.claimables
            .get(&(key.clone(), investor.trim().to_ascii_lowercase()))
    }

    pub fn store_claimable(&mut self, key: ContractKey, investor: &str, claimable: Claimable) {
        self.claimables.insert(
            (key, investor.trim().to_ascii_lowercase()),
            Cached::now(claimable),
        );
    }
}
