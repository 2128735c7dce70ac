// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Custody Workflows
//!
//! Deployment, minting and delegation each exist in two shapes:
//!
//! - **Managed**: a single backend request; the custody provider signs and
//!   submits. No wallet is touched.
//! - **Self-custody**: the operator's wallet signs. The wallet is moved to
//!   the token's network first, then contract artifacts are fetched, calls
//!   encoded, the transaction sent and its receipt awaited, and finally the
//!   result is registered with the backend.
//!
//! The custody mode is resolved once per invocation into a [`CustodyRoute`],
//! so a self-custody run can never start without a wallet. Steps run strictly
//! in order; the first failure aborts the remaining steps.

pub mod delegate;
pub mod deploy;
pub mod mint;

use alloy::primitives::{Address, TxHash};

use crate::backend::BackendError;
use crate::blockchain::contracts::ArtifactError;
use crate::blockchain::{TxReceipt, WalletAdapter, WalletError};
use crate::error::ValidationError;
use crate::models::CustodyMode;

pub use delegate::{delegate_votes, DelegateOutcome, DelegateSpec};
pub use deploy::{deploy_token, DeployOutcome, DeploySpec};
pub use mint::{mint_tokens, MintOrder, MintOutcome};

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Custody mode bound to the capability that executes it.
#[derive(Clone, Copy)]
pub enum CustodyRoute<'a> {
    Managed,
    SelfCustody { wallet: &'a dyn WalletAdapter },
}

impl<'a> CustodyRoute<'a> {
    /// Bind `mode` to the connected wallet, if it needs one.
    pub fn resolve(
        mode: CustodyMode,
        wallet: Option<&'a dyn WalletAdapter>,
    ) -> Result<Self, WalletError> {
        match mode {
            CustodyMode::Managed => Ok(CustodyRoute::Managed),
            CustodyMode::SelfCustody => wallet
                .map(|wallet| CustodyRoute::SelfCustody { wallet })
                .ok_or(WalletError::NotConnected),
        }
    }

    pub fn mode(&self) -> CustodyMode {
        match self {
            CustodyRoute::Managed => CustodyMode::Managed,
            CustodyRoute::SelfCustody { .. } => CustodyMode::SelfCustody,
        }
    }
}

impl std::fmt::Debug for CustodyRoute<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mode().label())
    }
}

/// Wait for `tx_hash` and require successful execution.
pub(crate) async fn confirmed(
    wallet: &dyn WalletAdapter,
    tx_hash: TxHash,
) -> Result<TxReceipt, WalletError> {
    let receipt = wallet.wait_for_receipt(tx_hash).await?;
    if !receipt.success {
        return Err(WalletError::TransactionFailed(format!(
            "transaction {} reverted in block {}",
            hash_hex(&tx_hash),
            receipt.block_number
        )));
    }
    Ok(receipt)
}

pub(crate) fn hash_hex(tx_hash: &TxHash) -> String {
    alloy::hex::encode_prefixed(tx_hash)
}

pub(crate) fn address_hex(address: &Address) -> String {
    address.to_checksum(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::Chain;
    use crate::testing::FakeWallet;

    #[test]
    fn managed_route_needs_no_wallet() {
        let route = CustodyRoute::resolve(CustodyMode::Managed, None).unwrap();
        assert_eq!(route.mode(), CustodyMode::Managed);
    }

    #[test]
    fn self_custody_without_wallet_is_not_connected() {
        let err = CustodyRoute::resolve(CustodyMode::SelfCustody, None).unwrap_err();
        assert_eq!(err, WalletError::NotConnected);
        assert_eq!(err.to_string(), "Wallet not connected");
    }

    #[test]
    fn self_custody_binds_the_wallet() {
        let wallet = FakeWallet::on(Chain::BscBnb);
        let wallet: &dyn WalletAdapter = &wallet;
        let route = CustodyRoute::resolve(CustodyMode::SelfCustody, Some(wallet)).unwrap();
        assert!(matches!(route, CustodyRoute::SelfCustody { .. }));
    }

    #[tokio::test]
    async fn reverted_receipt_is_a_failed_transaction() {
        let wallet = FakeWallet::on(Chain::BscBnb);
        *wallet.receipt_success.lock().unwrap() = false;

        let err = confirmed(&wallet, TxHash::with_last_byte(7)).await.unwrap_err();
        assert!(matches!(err, WalletError::TransactionFailed(ref msg) if msg.contains("reverted")));
    }
}
