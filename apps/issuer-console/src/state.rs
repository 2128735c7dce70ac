// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::backend::TokenBackend;
use crate::blockchain::WalletAdapter;
use crate::busy::BusyRegistry;
use crate::rewards::{RefreshScheduler, DEFAULT_REFRESH_DELAY};
use crate::store::ConsoleStore;

/// Capabilities and state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn TokenBackend>,
    /// Connected self-custody wallet, if a signer key is configured.
    pub wallet: Option<Arc<dyn WalletAdapter>>,
    pub store: Arc<RwLock<ConsoleStore>>,
    pub busy: BusyRegistry,
    pub refresh: RefreshScheduler,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn TokenBackend>,
        wallet: Option<Arc<dyn WalletAdapter>>,
        refresh_delay: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        let store = Arc::new(RwLock::new(ConsoleStore::new()));
        let refresh = RefreshScheduler::new(
            backend.clone(),
            store.clone(),
            refresh_delay,
            shutdown.clone(),
        );
        Self {
            backend,
            wallet,
            store,
            busy: BusyRegistry::new(),
            refresh,
            shutdown,
        }
    }

    /// State without a wallet and with the default refresh delay.
    pub fn managed_only(backend: Arc<dyn TokenBackend>) -> Self {
        Self::new(backend, None, DEFAULT_REFRESH_DELAY, CancellationToken::new())
    }

    pub fn wallet(&self) -> Option<&dyn WalletAdapter> {
        self.wallet.as_deref()
    }
}
