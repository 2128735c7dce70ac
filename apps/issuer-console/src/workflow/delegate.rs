// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Voting-power delegation, required before a holder counts in a snapshot.

use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::{address_hex, confirmed, hash_hex, CustodyRoute, WorkflowError};
use crate::backend::{DelegateRequest, TokenBackend};
use crate::blockchain::contracts::delegate_calldata;
use crate::blockchain::encoding::parse_address;
use crate::blockchain::wallet::bind_chain;
use crate::blockchain::{Chain, ContractWrite};
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DelegateSpec {
    pub token_contract_address: String,
    pub chain: Chain,
    /// Defaults to the investor (managed) or the wallet account (self-custody).
    #[serde(default)]
    pub delegatee: Option<String>,
    /// Custodial wallet; managed delegation only.
    #[serde(default)]
    pub wallet_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DelegateOutcome {
    Submitted { tx_id: String },
    Confirmed { tx_hash: String, delegatee: String },
}

impl DelegateOutcome {
    pub fn message(&self) -> String {
        match self {
            DelegateOutcome::Submitted { tx_id } => format!(
                "Delegation successful! TX ID: {tx_id}. Your tokens now have voting power for snapshots."
            ),
            DelegateOutcome::Confirmed { tx_hash, delegatee } => format!(
                "Delegated to {delegatee}. TX: {tx_hash}. Your tokens now have voting power for snapshots."
            ),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub async fn delegate_votes(
    backend: &dyn TokenBackend,
    route: CustodyRoute<'_>,
    spec: &DelegateSpec,
) -> Result<DelegateOutcome, WorkflowError> {
    let contract = parse_address("token contract", &spec.token_contract_address)?;

    match route {
        CustodyRoute::Managed => {
            let wallet_id = non_empty(spec.wallet_id.as_deref())
                .ok_or(ValidationError::MissingField("Wallet ID"))?;
            let delegatee = non_empty(spec.delegatee.as_deref())
                .ok_or(ValidationError::MissingField("Delegatee address"))?;

            let tx_id = backend
                .delegate(&DelegateRequest {
                    token_contract_address: address_hex(&contract),
                    delegatee_address: delegatee.to_string(),
                    wallet_id: wallet_id.to_string(),
                    chain_id: spec.chain.backend_id().to_string(),
                })
                .await?;

            info!(tx_id = %tx_id, "Managed delegation submitted");
            Ok(DelegateOutcome::Submitted { tx_id })
        }
        CustodyRoute::SelfCustody { wallet } => {
            let delegatee = match non_empty(spec.delegatee.as_deref()) {
                Some(raw) => parse_address("delegatee", raw)?,
                None => wallet.current_account().await?,
            };

            let network = bind_chain(wallet, spec.chain).await?;

            let tx_hash = wallet
                .write_contract(ContractWrite {
                    address: contract,
                    function: "delegate",
                    calldata: delegate_calldata(delegatee),
                })
                .await?;
            let receipt = confirmed(wallet, tx_hash).await?;
            drop(network);

            info!(delegatee = %delegatee, block = receipt.block_number, "Votes delegated from wallet");
            Ok(DelegateOutcome::Confirmed {
                tx_hash: hash_hex(&receipt.tx_hash),
                delegatee: address_hex(&delegatee),
            })
        }
    }
}
