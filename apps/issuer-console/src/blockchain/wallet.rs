// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Self-custody wallet capability.
//!
//! Workflows never own a wallet session: they borrow a [`WalletAdapter`]
//! injected through application state. Production uses
//! [`LocalWallet`](super::local_wallet::LocalWallet); tests supply fakes.

use alloy::primitives::{Address, Bytes, TxHash};
use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};

use super::types::{Chain, TxReceipt};

/// A contract call to be signed and sent by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractWrite {
    /// Target contract
    pub address: Address,
    /// Entry point name, for logs
    pub function: &'static str,
    /// ABI-encoded calldata including the selector
    pub calldata: Bytes,
}

/// Wallet failures, each carrying the message shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("Wallet not connected")]
    NotConnected,

    #[error("Transaction rejected by user")]
    Rejected,

    #[error("Please switch your wallet to {network}: {reason}")]
    SwitchFailed { network: String, reason: String },

    #[error("Wallet is on unsupported chain {0}")]
    UnsupportedChain(u64),

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    #[error("Wallet RPC error: {0}")]
    Rpc(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

impl WalletError {
    pub fn switch_failed(chain: Chain, reason: impl Into<String>) -> Self {
        WalletError::SwitchFailed {
            network: chain.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable identifier for the error display's detail line.
    pub fn error_type(&self) -> &'static str {
        match self {
            WalletError::NotConnected => "wallet_not_connected",
            WalletError::Rejected => "wallet_rejected",
            WalletError::SwitchFailed { .. } => "wrong_network",
            WalletError::UnsupportedChain(_) => "unsupported_chain",
            WalletError::InvalidKey(_) => "invalid_key",
            WalletError::Rpc(_) => "wallet_rpc_error",
            WalletError::TransactionFailed(_) => "transaction_failed",
        }
    }
}

/// Connected wallet session: account, chain, signing and receipts.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Account that signs transactions.
    async fn current_account(&self) -> Result<Address, WalletError>;

    /// EVM chain id the wallet is currently on.
    async fn current_chain(&self) -> Result<u64, WalletError>;

    /// Ask the wallet to move to another network.
    async fn switch_chain(&self, chain: Chain) -> Result<(), WalletError>;

    /// Send a contract-creation transaction with the given init code.
    async fn deploy_contract(&self, init_code: Bytes) -> Result<TxHash, WalletError>;

    /// Send a state-changing contract call.
    async fn write_contract(&self, call: ContractWrite) -> Result<TxHash, WalletError>;

    /// Wait until the transaction has a receipt.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, WalletError>;

    /// Held while a sequence depends on the wallet staying on one network.
    fn network_lock(&self) -> &Mutex<()>;
}

/// Exclusive use of the wallet on one network.
///
/// While alive, no other switch or chain-bound sequence can run, so every
/// send and receipt poll goes to `chain`.
#[must_use = "the wallet may change network once the binding is dropped"]
pub struct ChainBinding<'a> {
    pub chain: Chain,
    _guard: MutexGuard<'a, ()>,
}

impl std::fmt::Debug for ChainBinding<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainBinding").field("chain", &self.chain).finish()
    }
}

/// Take the wallet's network lock and move it to `target`.
///
/// Hold the binding from the switch until the last receipt is in.
pub async fn bind_chain(
    wallet: &dyn WalletAdapter,
    target: Chain,
) -> Result<ChainBinding<'_>, WalletError> {
    let guard = wallet.network_lock().lock().await;
    ensure_chain(wallet, target).await?;
    Ok(ChainBinding {
        chain: target,
        _guard: guard,
    })
}

/// Make sure the wallet is on `target`, switching if needed.
///
/// Nothing else may be sent to the wallet when this fails.
pub async fn ensure_chain(wallet: &dyn WalletAdapter, target: Chain) -> Result<(), WalletError> {
    let current = wallet.current_chain().await?;
    if current == target.evm_chain_id() {
        return Ok(());
    }

    tracing::info!(
        current_chain = current,
        target_chain = target.evm_chain_id(),
        "Requesting wallet chain switch"
    );

    wallet.switch_chain(target).await.map_err(|e| match e {
        WalletError::SwitchFailed { .. } => e,
        WalletError::Rejected => WalletError::switch_failed(target, "switch request rejected"),
        other => WalletError::switch_failed(target, other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeWallet, WalletCall};

    #[tokio::test]
    async fn already_on_target_sends_nothing() {
        let wallet = FakeWallet::on(Chain::BscBnb);
        ensure_chain(&wallet, Chain::BscBnb).await.unwrap();
        assert!(wallet.calls().is_empty());
    }

    #[tokio::test]
    async fn other_network_is_switched() {
        let wallet = FakeWallet::on(Chain::Ethereum);
        ensure_chain(&wallet, Chain::Polygon).await.unwrap();

        assert_eq!(wallet.calls(), vec![WalletCall::SwitchChain(Chain::Polygon)]);
        assert_eq!(wallet.current_chain().await.unwrap(), Chain::Polygon.evm_chain_id());
    }

    #[tokio::test]
    async fn rejected_switch_names_the_target_network() {
        let wallet = FakeWallet::on(Chain::Ethereum);
        *wallet.switch_error.lock().unwrap() = Some(WalletError::Rejected);

        let err = ensure_chain(&wallet, Chain::BscBnb).await.unwrap_err();
        assert!(matches!(err, WalletError::SwitchFailed { .. }));
        assert_eq!(err.error_type(), "wrong_network");
        assert!(err.to_string().contains("BNB Smart Chain"));
    }

    #[tokio::test]
    async fn binding_blocks_other_switches_until_dropped() {
        let wallet = FakeWallet::on(Chain::Ethereum);
        let binding = bind_chain(&wallet, Chain::BscBnb).await.unwrap();
        assert_eq!(binding.chain, Chain::BscBnb);
        assert!(wallet.network_lock().try_lock().is_err());

        drop(binding);
        let binding = bind_chain(&wallet, Chain::Polygon).await.unwrap();
        assert_eq!(binding.chain, Chain::Polygon);
        assert_eq!(
            wallet.calls(),
            vec![
                WalletCall::SwitchChain(Chain::BscBnb),
                WalletCall::SwitchChain(Chain::Polygon)
            ]
        );
    }

    #[tokio::test]
    async fn failed_switch_releases_the_lock() {
        let wallet = FakeWallet::on(Chain::Ethereum);
        *wallet.switch_error.lock().unwrap() = Some(WalletError::Rejected);

        bind_chain(&wallet, Chain::BscBnb).await.unwrap_err();
        assert!(wallet.network_lock().try_lock().is_ok());
    }
}
