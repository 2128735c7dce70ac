// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token deployment.

use alloy::primitives::B256;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use super::{address_hex, confirmed, hash_hex, CustodyRoute, WorkflowError};
use crate::backend::{DeployTokenRequest, RegisterTokenRequest, TokenBackend};
use crate::blockchain::contracts::CompiledToken;
use crate::blockchain::encoding::encode_partitions;
use crate::blockchain::wallet::bind_chain;
use crate::blockchain::{Chain, WalletAdapter};
use crate::error::ValidationError;
use crate::models::CustodyMode;

/// What to deploy. Partitions are already trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeploySpec {
    pub name: String,
    pub symbol: String,
    pub partitions: Vec<String>,
    pub chain: Chain,
}

/// Result of a deployment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeployOutcome {
    /// Accepted by the custody provider; the token stays pending until it lands.
    Submitted { tx_id: String },
    /// Mined and registered with the backend.
    Deployed {
        contract_address: String,
        tx_hash: String,
    },
    /// Mined, but the receipt carried no contract address. Nothing was registered.
    DeployedAddressUnknown { tx_hash: String },
}

impl DeployOutcome {
    pub fn message(&self) -> String {
        match self {
            DeployOutcome::Submitted { tx_id } => format!("Deployment Submitted! Tx ID: {tx_id}"),
            DeployOutcome::Deployed { tx_hash, .. } => format!("Deployed via Wallet! Tx: {tx_hash}"),
            DeployOutcome::DeployedAddressUnknown { tx_hash } => format!(
                "Deployment {tx_hash} was mined but no contract address was reported; the token was not registered"
            ),
        }
    }

    /// Whether the operator needs to follow up by hand.
    pub fn is_warning(&self) -> bool {
        matches!(self, DeployOutcome::DeployedAddressUnknown { .. })
    }
}

/// Deploy a new security token through `route`.
pub async fn deploy_token(
    backend: &dyn TokenBackend,
    route: CustodyRoute<'_>,
    spec: &DeploySpec,
) -> Result<DeployOutcome, WorkflowError> {
    if spec.name.trim().is_empty() || spec.symbol.trim().is_empty() {
        return Err(ValidationError::DetailsIncomplete.into());
    }
    let partitions = encode_partitions(&spec.partitions)?;

    match route {
        CustodyRoute::Managed => deploy_managed(backend, spec).await,
        CustodyRoute::SelfCustody { wallet } => {
            deploy_with_wallet(backend, wallet, spec, partitions).await
        }
    }
}

async fn deploy_managed(
    backend: &dyn TokenBackend,
    spec: &DeploySpec,
) -> Result<DeployOutcome, WorkflowError> {
    let request = DeployTokenRequest {
        chain_id: spec.chain.backend_id().to_string(),
        name: spec.name.clone(),
        symbol: spec.symbol.clone(),
        partitions: spec.partitions.clone(),
        supply: 0,
    };

    let response = backend.deploy_token(&request).await?;
    info!(
        chain = %spec.chain,
        symbol = %spec.symbol,
        tx_id = %response.tx_id,
        "Managed deployment submitted"
    );

    Ok(DeployOutcome::Submitted {
        tx_id: response.tx_id,
    })
}

async fn deploy_with_wallet(
    backend: &dyn TokenBackend,
    wallet: &dyn WalletAdapter,
    spec: &DeploySpec,
    partitions: Vec<B256>,
) -> Result<DeployOutcome, WorkflowError> {
    let network = bind_chain(wallet, spec.chain).await?;

    let artifacts = backend.artifacts().await?;
    let compiled = CompiledToken::from_artifact(&artifacts.abi, &artifacts.bytecode)?;
    compiled.ensure_deployable()?;

    let owner = wallet.current_account().await?;
    let init_code = compiled.init_code(&spec.name, &spec.symbol, partitions, owner);

    let tx_hash = wallet.deploy_contract(init_code).await?;
    info!(chain = %spec.chain, tx_hash = %tx_hash, "Token deployment sent from wallet");

    let receipt = confirmed(wallet, tx_hash).await?;
    drop(network);
    let tx_hash = hash_hex(&receipt.tx_hash);

    let Some(contract) = receipt.contract_address else {
        warn!(
            tx_hash = %tx_hash,
            block = receipt.block_number,
            "Deployment mined without a contract address"
        );
        return Ok(DeployOutcome::DeployedAddressUnknown { tx_hash });
    };

    let contract_address = address_hex(&contract);
    backend
        .register_token(&RegisterTokenRequest {
            chain_id: spec.chain.backend_id().to_string(),
            name: spec.name.clone(),
            symbol: spec.symbol.clone(),
            contract_address: contract_address.clone(),
            tx_hash: tx_hash.clone(),
            partitions: spec.partitions.clone(),
            owner: address_hex(&owner),
            token_type: CustodyMode::SelfCustody,
        })
        .await?;

    info!(
        contract_address = %contract_address,
        block = receipt.block_number,
        "Self-custody token registered"
    );

    Ok(DeployOutcome::Deployed {
        contract_address,
        tx_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::WalletError;
    use crate::testing::{FakeBackend, FakeWallet, WalletCall, DEPLOYED, OWNER};
    use serde_json::json;

    fn fund_spec() -> DeploySpec {
        DeploySpec {
            name: "Fund I".into(),
            symbol: "FUN".into(),
            partitions: vec!["Class A".into(), "Class B".into()],
            chain: Chain::BscBnb,
        }
    }

    #[tokio::test]
    async fn managed_deploy_is_one_backend_request() {
        let backend = FakeBackend::default();
        let wallet = FakeWallet::on(Chain::Ethereum);

        let outcome = deploy_token(&backend, CustodyRoute::Managed, &fund_spec())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DeployOutcome::Submitted {
                tx_id: "cobo-tx-1".into()
            }
        );
        assert_eq!(backend.operations(), vec!["deploy_token"]);
        assert_eq!(
            backend.requests("deploy_token")[0],
            json!({
                "chain_id": "BSC_BNB",
                "name": "Fund I",
                "symbol": "FUN",
                "partitions": ["Class A", "Class B"],
                "supply": 0
            })
        );
        assert!(wallet.calls().is_empty());
    }

    #[tokio::test]
    async fn self_custody_deploys_from_wallet_and_registers() {
        let backend = FakeBackend::default();
        let wallet = FakeWallet::on(Chain::BscBnb);

        let outcome = deploy_token(
            &backend,
            CustodyRoute::SelfCustody { wallet: &wallet },
            &fund_spec(),
        )
        .await
        .unwrap();

        let DeployOutcome::Deployed {
            contract_address, ..
        } = &outcome
        else {
            panic!("unexpected outcome {outcome:?}");
        };
        assert_eq!(contract_address, &DEPLOYED.to_checksum(None));

        assert_eq!(backend.operations(), vec!["artifacts", "register_token"]);
        let registered = &backend.requests("register_token")[0];
        assert_eq!(registered["type"], "SELF_CUSTODY");
        assert_eq!(registered["owner"], OWNER.to_checksum(None));
        assert_eq!(registered["partitions"], json!(["Class A", "Class B"]));

        let calls = wallet.calls();
        assert!(matches!(calls[0], WalletCall::Deploy(ref code) if code.starts_with(&[0x60, 0x80])));
        assert!(matches!(calls[1], WalletCall::Receipt(_)));
        assert_eq!(calls.len(), 2);
    }

    #[tokio::test]
    async fn wallet_on_another_chain_is_switched_first() {
        let backend = FakeBackend::default();
        let wallet = FakeWallet::on(Chain::Ethereum);

        deploy_token(
            &backend,
            CustodyRoute::SelfCustody { wallet: &wallet },
            &fund_spec(),
        )
        .await
        .unwrap();

        assert_eq!(wallet.calls()[0], WalletCall::SwitchChain(Chain::BscBnb));
    }

    #[tokio::test]
    async fn failed_switch_aborts_before_anything_is_sent() {
        let backend = FakeBackend::default();
        let wallet = FakeWallet::on(Chain::Ethereum);
        *wallet.switch_error.lock().unwrap() = Some(WalletError::Rejected);

        let err = deploy_token(
            &backend,
            CustodyRoute::SelfCustody { wallet: &wallet },
            &fund_spec(),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("BNB Smart Chain"));
        assert_eq!(wallet.calls(), vec![WalletCall::SwitchChain(Chain::BscBnb)]);
        assert!(backend.operations().is_empty());
    }

    #[tokio::test]
    async fn missing_contract_address_is_reported_and_not_registered() {
        let backend = FakeBackend::default();
        let wallet = FakeWallet::on(Chain::BscBnb);
        *wallet.receipt_address.lock().unwrap() = None;

        let outcome = deploy_token(
            &backend,
            CustodyRoute::SelfCustody { wallet: &wallet },
            &fund_spec(),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, DeployOutcome::DeployedAddressUnknown { .. }));
        assert!(outcome.is_warning());
        assert_eq!(backend.operations(), vec!["artifacts"]);
    }

    #[tokio::test]
    async fn rejected_signature_registers_nothing() {
        let backend = FakeBackend::default();
        let wallet = FakeWallet::on(Chain::BscBnb);
        *wallet.send_error.lock().unwrap() = Some(WalletError::Rejected);

        let err = deploy_token(
            &backend,
            CustodyRoute::SelfCustody { wallet: &wallet },
            &fund_spec(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Transaction rejected by user");
        assert_eq!(backend.operations(), vec!["artifacts"]);
    }

    #[tokio::test]
    async fn oversized_partition_fails_before_any_call() {
        let backend = FakeBackend::default();
        let mut spec = fund_spec();
        spec.partitions = vec!["A tranche name that is far too long".into()];

        let err = deploy_token(&backend, CustodyRoute::Managed, &spec)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Validation(ValidationError::PartitionTooLong { .. })
        ));
        assert!(backend.operations().is_empty());
    }

    #[tokio::test]
    async fn managed_backend_failure_keeps_detail() {
        let backend = FakeBackend::default();
        backend.fail("deploy_token", "Custody wallet not configured", Some("config_error"));

        let err = deploy_token(&backend, CustodyRoute::Managed, &fund_spec())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Custody wallet not configured");
    }

    #[tokio::test]
    async fn concurrent_deploys_each_send_on_their_own_network() {
        let backend = FakeBackend::default();
        let wallet = FakeWallet::on(Chain::Ethereum);
        let route = CustodyRoute::SelfCustody { wallet: &wallet };
        let polygon = DeploySpec {
            chain: Chain::Polygon,
            ..fund_spec()
        };
        let bsc_spec = fund_spec();

        let (bsc, matic) = tokio::join!(
            deploy_token(&backend, route, &bsc_spec),
            deploy_token(&backend, route, &polygon),
        );
        bsc.unwrap();
        matic.unwrap();

        assert_eq!(wallet.sent_on(), vec![Chain::BscBnb, Chain::Polygon]);
        let registered: Vec<_> = backend
            .requests("register_token")
            .iter()
            .map(|r| r["chain_id"].clone())
            .collect();
        assert_eq!(registered, vec![json!("BSC_BNB"), json!("MATIC_POLYGON")]);
    }
}
