// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Partitioned issuance to a holder.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::{confirmed, hash_hex, CustodyRoute, WorkflowError};
use crate::backend::{MintRequest, RegisterMintRequest, TokenBackend};
use crate::blockchain::contracts::{issue_by_partition_calldata, CompiledToken, ISSUE_BY_PARTITION};
use crate::blockchain::encoding::{
    encode_partition, parse_address, parse_positive_amount, to_base_units, TOKEN_DECIMALS,
};
use crate::blockchain::wallet::bind_chain;
use crate::blockchain::{Chain, ContractWrite, WalletAdapter};
use crate::error::ValidationError;
use crate::models::TokenRecord;

/// Mint form as entered by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MintOrder {
    pub partition: String,
    /// Recipient address.
    pub recipient: String,
    /// Whole display units, as typed.
    pub amount: String,
}

/// A mint order that passed local validation.
struct CheckedMint {
    partition: String,
    recipient: Address,
    units: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MintOutcome {
    /// Accepted by the custody provider.
    Submitted,
    /// Mined from the operator's wallet and registered with the backend.
    Confirmed { tx_hash: String, block_number: u64 },
}

impl MintOutcome {
    pub fn message(&self) -> String {
        match self {
            MintOutcome::Submitted => "Minting Submitted!".to_string(),
            MintOutcome::Confirmed { tx_hash, .. } => {
                format!("Minting Confirmed & Registered! Tx: {tx_hash}")
            }
        }
    }
}

fn check_order(token: &TokenRecord, order: &MintOrder) -> Result<CheckedMint, ValidationError> {
    if !token.has_partition(&order.partition) {
        return Err(ValidationError::UnknownPartition(order.partition.clone()));
    }
    Ok(CheckedMint {
        partition: order.partition.clone(),
        recipient: parse_address("recipient", &order.recipient)?,
        units: parse_positive_amount(&order.amount)?,
    })
}

/// Mint `order` on `token` through `route`.
///
/// Nothing is sent anywhere unless the partition belongs to the token, the
/// recipient is an address and the amount is a positive whole number.
pub async fn mint_tokens(
    backend: &dyn TokenBackend,
    route: CustodyRoute<'_>,
    token: &TokenRecord,
    order: &MintOrder,
) -> Result<MintOutcome, WorkflowError> {
    let mint = check_order(token, order)?;

    match route {
        CustodyRoute::Managed => mint_managed(backend, token, mint).await,
        CustodyRoute::SelfCustody { wallet } => {
            let chain = Chain::from_backend_id(&token.chain_id)
                .ok_or_else(|| ValidationError::UnsupportedChain(token.chain_id.clone()))?;
            let contract = token
                .contract_address
                .as_deref()
                .ok_or(ValidationError::NotDeployed)
                .and_then(|raw| parse_address("contract", raw))?;
            mint_with_wallet(backend, wallet, token, chain, contract, mint).await
        }
    }
}

async fn mint_managed(
    backend: &dyn TokenBackend,
    token: &TokenRecord,
    mint: CheckedMint,
) -> Result<MintOutcome, WorkflowError> {
    let contract_address = token
        .operation_address()
        .ok_or(ValidationError::NotDeployed)?
        .to_string();

    backend
        .mint(&MintRequest {
            chain_id: token.chain_id.clone(),
            contract_address,
            partition: mint.partition,
            to_address: mint.recipient.to_checksum(None),
            amount: mint.units,
        })
        .await?;

    info!(symbol = %token.symbol, units = mint.units, "Managed mint submitted");
    Ok(MintOutcome::Submitted)
}

async fn mint_with_wallet(
    backend: &dyn TokenBackend,
    wallet: &dyn WalletAdapter,
    token: &TokenRecord,
    chain: Chain,
    contract: Address,
    mint: CheckedMint,
) -> Result<MintOutcome, WorkflowError> {
    let network = bind_chain(wallet, chain).await?;

    let artifacts = backend.artifacts().await?;
    CompiledToken::from_artifact(&artifacts.abi, &artifacts.bytecode)?.ensure_issuable()?;

    let partition = encode_partition(&mint.partition)?;
    let value = to_base_units(mint.units, TOKEN_DECIMALS);

    let tx_hash = wallet
        .write_contract(ContractWrite {
            address: contract,
            function: ISSUE_BY_PARTITION,
            calldata: issue_by_partition_calldata(partition, mint.recipient, value),
        })
        .await?;
    info!(tx_hash = %tx_hash, "Mint sent, waiting for confirmation");

    let receipt = confirmed(wallet, tx_hash).await?;
    drop(network);
    let tx_hash = hash_hex(&receipt.tx_hash);

    backend
        .register_mint(&RegisterMintRequest {
            chain_id: token.chain_id.clone(),
            contract_address: contract.to_checksum(None),
            partition: mint.partition,
            to_address: mint.recipient.to_checksum(None),
            amount: mint.units,
            tx_hash: tx_hash.clone(),
        })
        .await?;

    Ok(MintOutcome::Confirmed {
        tx_hash,
        block_number: receipt.block_number,
    })
}
