// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Self-custody wallet backed by a locally held key and EVM JSON-RPC.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, TxHash},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use tokio::sync::Mutex;
use url::Url;

use super::types::{Chain, TxReceipt};
use super::wallet::{ContractWrite, WalletAdapter, WalletError};

/// Default interval between receipt polls.
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How long to wait for a receipt before giving up.
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(600);

/// Wallet session for a single local signing key.
pub struct LocalWallet {
    address: Address,
    wallet: EthereumWallet,
    rpc_urls: HashMap<Chain, Url>,
    active: RwLock<Chain>,
    network_lock: Mutex<()>,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl LocalWallet {
    /// Create a wallet session starting on `initial`.
    pub fn new(
        signer: PrivateKeySigner,
        rpc_urls: HashMap<Chain, Url>,
        initial: Chain,
        poll_interval: Duration,
    ) -> Self {
        let address = signer.address();
        Self {
            address,
            wallet: EthereumWallet::from(signer),
            rpc_urls,
            active: RwLock::new(initial),
            network_lock: Mutex::new(()),
            poll_interval,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
        }
    }

    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    /// Account that signs every transaction.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Network the wallet currently sends to.
    pub fn active_chain(&self) -> Chain {
        match self.active.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_active_chain(&self, chain: Chain) {
        match self.active.write() {
            Ok(mut guard) => *guard = chain,
            Err(poisoned) => *poisoned.into_inner() = chain,
        }
    }

    fn rpc_url(&self, chain: Chain) -> Option<Url> {
        self.rpc_urls.get(&chain).cloned()
    }

    fn active_rpc_url(&self) -> Result<Url, WalletError> {
        let chain = self.active_chain();
        self.rpc_url(chain)
            .ok_or_else(|| WalletError::Rpc(format!("no RPC endpoint configured for {chain}")))
    }

    async fn send(&self, tx: TransactionRequest) -> Result<TxHash, WalletError> {
        let url = self.active_rpc_url()?;
        let provider = ProviderBuilder::new()
            .wallet(self.wallet.clone())
            .connect_http(url);

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| WalletError::TransactionFailed(format!("Failed to send: {}", e)))?;

        Ok(*pending.tx_hash())
    }
}

#[async_trait]
impl WalletAdapter for LocalWallet {
    async fn current_account(&self) -> Result<Address, WalletError> {
        Ok(self.address)
    }

    async fn current_chain(&self) -> Result<u64, WalletError> {
        let url = self.active_rpc_url()?;
        let provider = ProviderBuilder::new().connect_http(url);
        provider
            .get_chain_id()
            .await
            .map_err(|e| WalletError::Rpc(e.to_string()))
    }

    async fn switch_chain(&self, chain: Chain) -> Result<(), WalletError> {
        let url = self
            .rpc_url(chain)
            .ok_or_else(|| WalletError::switch_failed(chain, "no RPC endpoint configured"))?;

        let provider = ProviderBuilder::new().connect_http(url);
        let reported = provider
            .get_chain_id()
            .await
            .map_err(|e| WalletError::switch_failed(chain, e.to_string()))?;

        if reported != chain.evm_chain_id() {
            return Err(WalletError::switch_failed(
                chain,
                format!("RPC endpoint reports chain {reported}"),
            ));
        }

        self.set_active_chain(chain);
        tracing::info!(chain = %chain, "Wallet switched network");
        Ok(())
    }

    async fn deploy_contract(&self, init_code: Bytes) -> Result<TxHash, WalletError> {
        let tx = TransactionRequest::default()
            .from(self.address)
            .with_deploy_code(init_code);

        let hash = self.send(tx).await?;
        tracing::info!(tx_hash = %hash, "Contract creation sent");
        Ok(hash)
    }

    async fn write_contract(&self, call: ContractWrite) -> Result<TxHash, WalletError> {
        let tx = TransactionRequest::default()
            .from(self.address)
            .to(call.address)
            .input(call.calldata.into());

        let hash = self.send(tx).await?;
        tracing::info!(
            tx_hash = %hash,
            contract = %call.address,
            function = call.function,
            "Contract call sent"
        );
        Ok(hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, WalletError> {
        let url = self.active_rpc_url()?;
        let provider = ProviderBuilder::new().connect_http(url);

        let poll = async {
            loop {
                let receipt = provider
                    .get_transaction_receipt(tx_hash)
                    .await
                    .map_err(|e| WalletError::Rpc(format!("Failed to get receipt: {}", e)))?;

                if let Some(receipt) = receipt {
                    return Ok(TxReceipt {
                        tx_hash,
                        block_number: receipt.block_number.unwrap_or(0),
                        success: receipt.status(),
                        contract_address: receipt.contract_address,
                    });
                }

                tokio::time::sleep(self.poll_interval).await;
            }
        };

        tokio::time::timeout(self.receipt_timeout, poll)
            .await
            .map_err(|_| {
                WalletError::Rpc(format!(
                    "no receipt for {tx_hash} after {}s",
                    self.receipt_timeout.as_secs()
                ))
            })?
    }

    fn network_lock(&self) -> &Mutex<()> {
        &self.network_lock
    }
}
