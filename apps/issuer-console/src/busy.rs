// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-form in-flight submissions.
//!
//! A form key is held by a [`BusyGuard`] for the duration of one submission.
//! A second submission of the same key is refused until the guard drops,
//! whether the first one succeeded, failed or unwound.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
pub struct BusyRegistry {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl BusyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn keys(&self) -> MutexGuard<'_, HashSet<String>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim `key`, or `None` while another submission holds it.
    pub fn try_acquire(&self, key: impl Into<String>) -> Option<BusyGuard> {
        let key = key.into();
        if !self.keys().insert(key.clone()) {
            tracing::debug!(form = %key, "Submission refused, form busy");
            return None;
        }
        Some(BusyGuard {
            registry: self.clone(),
            key,
        })
    }

    pub fn is_busy(&self, key: &str) -> bool {
        self.keys().contains(key)
    }
}

/// Releases its form key on drop.
#[derive(Debug)]
pub struct BusyGuard {
    registry: BusyRegistry,
    key: String,
}

impl BusyGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.registry.keys().remove(&self.key);
    }
}

/// Form keys used by the HTTP handlers.
pub mod forms {
    use uuid::Uuid;

    pub fn deploy(wizard: Uuid) -> String {
        format!("deploy:{wizard}")
    }

    pub fn mint(chain_id: &str, address: &str) -> String {
        format!("mint:{}:{}", chain_id, address.to_ascii_lowercase())
    }

    pub fn document(chain_id: &str, address: &str) -> String {
        format!("document:{}:{}", chain_id, address.to_ascii_lowercase())
    }

    /// Issuer and investor rewards actions, one form per action and contract.
    pub fn rewards(action: &str, contract: &str) -> String {
        format!("rewards:{}:{}", action, contract.to_ascii_lowercase())
    }

    pub fn wallet_switch() -> String {
        "wallet:switch".to_string()
    }
}
