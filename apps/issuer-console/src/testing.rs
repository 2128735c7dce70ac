// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Recording fakes for the backend and wallet capabilities.

use std::collections::HashMap;
use std::sync::Mutex;

use alloy::primitives::{Address, Bytes, TxHash, B256};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use crate::backend::*;
use crate::blockchain::contracts::tests::token_abi;
use crate::blockchain::{Chain, ContractWrite, TxReceipt, WalletAdapter, WalletError};
use crate::models::{Claimable, Holder, RewardsInfo, TokenRecord, WalletLookup};

pub(crate) const OWNER: Address = Address::new([0x0a; 20]);
pub(crate) const DEPLOYED: Address = Address::new([0xc0; 20]);

/// Backend fake recording `(operation, request)` pairs in call order.
pub(crate) struct FakeBackend {
    pub calls: Mutex<Vec<(&'static str, Value)>>,
    pub tokens: Mutex<Vec<TokenRecord>>,
    pub holders: Mutex<Vec<Holder>>,
    pub rewards_info: Mutex<RewardsInfo>,
    pub claimable: Mutex<Claimable>,
    pub lookup: Mutex<WalletLookup>,
    pub deposit: Mutex<DepositReceipt>,
    pub artifacts: ContractArtifacts,
    failures: Mutex<HashMap<&'static str, (String, Option<String>)>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
            holders: Mutex::new(Vec::new()),
            rewards_info: Mutex::new(RewardsInfo {
                reward_token: None,
                snapshot_block: 0,
                total_snapshot_supply: "0".into(),
                total_reward_amount: "0".into(),
                current_block: 10,
            }),
            claimable: Mutex::new(Claimable {
                claimable: "0".into(),
                claimed: "0".into(),
                investor: None,
            }),
            lookup: Mutex::new(WalletLookup {
                status: "success".into(),
                wallet_id: Some("w-investor".into()),
                wallet_name: Some("Investor".into()),
                message: None,
            }),
            deposit: Mutex::new(DepositReceipt {
                approve_tx_id: None,
                deposit_tx_id: "dep-1".into(),
            }),
            artifacts: ContractArtifacts {
                abi: token_abi(),
                bytecode: "0x6080604052".into(),
            },
            failures: Mutex::new(HashMap::new()),
        }
    }
}

impl FakeBackend {
    /// Make `operation` fail with an HTTP 500 carrying `detail`.
    pub fn fail(&self, operation: &'static str, detail: &str, error_type: Option<&str>) {
        self.failures.lock().unwrap().insert(
            operation,
            (detail.to_string(), error_type.map(str::to_string)),
        );
    }

    pub fn operations(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().iter().map(|(op, _)| *op).collect()
    }

    pub fn requests(&self, operation: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _)| *op == operation)
            .map(|(_, body)| body.clone())
            .collect()
    }

    fn record(&self, operation: &'static str, body: impl Serialize) -> Result<(), BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push((operation, serde_json::to_value(body).unwrap()));
        match self.failures.lock().unwrap().get(operation) {
            Some((detail, error_type)) => Err(BackendError::Status {
                status: 500,
                detail: Some(detail.clone()),
                error_type: error_type.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TokenBackend for FakeBackend {
    async fn list_tokens(&self) -> Result<Vec<TokenRecord>, BackendError> {
        self.record("list_tokens", Value::Null)?;
        Ok(self.tokens.lock().unwrap().clone())
    }

    async fn deploy_token(
        &self,
        request: &DeployTokenRequest,
    ) -> Result<DeployTokenResponse, BackendError> {
        self.record("deploy_token", request)?;
        Ok(DeployTokenResponse {
            tx_id: "cobo-tx-1".into(),
            owner: Some("0xmanagedowner".into()),
            wallet_id: Some("w-issuer".into()),
        })
    }

    async fn register_token(&self, request: &RegisterTokenRequest) -> Result<(), BackendError> {
        self.record("register_token", request)
    }

    async fn artifacts(&self) -> Result<ContractArtifacts, BackendError> {
        self.record("artifacts", Value::Null)?;
        Ok(self.artifacts.clone())
    }

    async fn mint(&self, request: &MintRequest) -> Result<(), BackendError> {
        self.record("mint", request)
    }

    async fn register_mint(&self, request: &RegisterMintRequest) -> Result<(), BackendError> {
        self.record("register_mint", request)
    }

    async fn holders(&self, chain_id: &str, address: &str) -> Result<Vec<Holder>, BackendError> {
        self.record("holders", json!({"chain_id": chain_id, "address": address}))?;
        Ok(self.holders.lock().unwrap().clone())
    }

    async fn attach_document(&self, request: &DocumentRequest) -> Result<(), BackendError> {
        self.record("attach_document", request)
    }

    async fn rewards_info(&self, contract: &str, chain_id: &str) -> Result<RewardsInfo, BackendError> {
        self.record("rewards_info", json!({"contract": contract, "chain_id": chain_id}))?;
        Ok(self.rewards_info.lock().unwrap().clone())
    }

    async fn set_reward_token(&self, request: &SetRewardTokenRequest) -> Result<String, BackendError> {
        self.record("set_reward_token", request)?;
        Ok("set-1".into())
    }

    async fn take_snapshot(&self, request: &RewardsActionRequest) -> Result<String, BackendError> {
        self.record("take_snapshot", request)?;
        Ok("snap-1".into())
    }

    async fn deposit_rewards(
        &self,
        request: &DepositRewardsRequest,
    ) -> Result<DepositReceipt, BackendError> {
        self.record("deposit_rewards", request)?;
        Ok(self.deposit.lock().unwrap().clone())
    }

    async fn claim_rewards(&self, request: &RewardsActionRequest) -> Result<String, BackendError> {
        self.record("claim_rewards", request)?;
        Ok("claim-1".into())
    }

    async fn delegate(&self, request: &DelegateRequest) -> Result<String, BackendError> {
        self.record("delegate", request)?;
        Ok("delegate-1".into())
    }

    async fn claimable(
        &self,
        contract: &str,
        investor: &str,
        chain_id: &str,
    ) -> Result<Claimable, BackendError> {
        self.record(
            "claimable",
            json!({"contract": contract, "investor": investor, "chain_id": chain_id}),
        )?;
        Ok(self.claimable.lock().unwrap().clone())
    }

    async fn find_wallet_by_address(
        &self,
        address: &str,
        chain_id: &str,
    ) -> Result<WalletLookup, BackendError> {
        self.record(
            "find_wallet_by_address",
            json!({"address": address, "chain_id": chain_id}),
        )?;
        Ok(self.lookup.lock().unwrap().clone())
    }
}

/// A call observed by [`FakeWallet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WalletCall {
    SwitchChain(Chain),
    Deploy(Bytes),
    Write(ContractWrite),
    Receipt(TxHash),
}

/// Wallet fake. Read-only queries (`current_account`, `current_chain`) are not recorded.
///
/// Every method yields first, so concurrent workflows interleave.
pub(crate) struct FakeWallet {
    pub calls: Mutex<Vec<WalletCall>>,
    /// Active network at each send.
    pub sent_on: Mutex<Vec<Chain>>,
    pub chain: Mutex<Chain>,
    pub switch_error: Mutex<Option<WalletError>>,
    pub send_error: Mutex<Option<WalletError>>,
    pub receipt_success: Mutex<bool>,
    pub receipt_address: Mutex<Option<Address>>,
    network_lock: tokio::sync::Mutex<()>,
}

impl FakeWallet {
    pub fn on(chain: Chain) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            chain: Mutex::new(chain),
            switch_error: Mutex::new(None),
            send_error: Mutex::new(None),
            receipt_success: Mutex::new(true),
            receipt_address: Mutex::new(Some(DEPLOYED)),
            sent_on: Mutex::new(Vec::new()),
            network_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn calls(&self) -> Vec<WalletCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<ContractWrite> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                WalletCall::Write(write) => Some(write),
                _ => None,
            })
            .collect()
    }

    pub fn sent_on(&self) -> Vec<Chain> {
        self.sent_on.lock().unwrap().clone()
    }

    fn send(&self, call: WalletCall) -> Result<TxHash, WalletError> {
        self.sent_on.lock().unwrap().push(*self.chain.lock().unwrap());
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        if let Some(err) = self.send_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(B256::with_last_byte(calls.len() as u8))
    }
}

#[async_trait]
impl WalletAdapter for FakeWallet {
    async fn current_account(&self) -> Result<Address, WalletError> {
        tokio::task::yield_now().await;
        Ok(OWNER)
    }

    async fn current_chain(&self) -> Result<u64, WalletError> {
        tokio::task::yield_now().await;
        Ok(self.chain.lock().unwrap().evm_chain_id())
    }

    async fn switch_chain(&self, chain: Chain) -> Result<(), WalletError> {
        tokio::task::yield_now().await;
        self.calls.lock().unwrap().push(WalletCall::SwitchChain(chain));
        if let Some(err) = self.switch_error.lock().unwrap().clone() {
            return Err(err);
        }
        *self.chain.lock().unwrap() = chain;
        Ok(())
    }

    async fn deploy_contract(&self, init_code: Bytes) -> Result<TxHash, WalletError> {
        tokio::task::yield_now().await;
        self.send(WalletCall::Deploy(init_code))
    }

    async fn write_contract(&self, call: ContractWrite) -> Result<TxHash, WalletError> {
        tokio::task::yield_now().await;
        self.send(WalletCall::Write(call))
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, WalletError> {
        tokio::task::yield_now().await;
        self.calls.lock().unwrap().push(WalletCall::Receipt(tx_hash));
        Ok(TxReceipt {
            tx_hash,
            block_number: 100,
            success: *self.receipt_success.lock().unwrap(),
            contract_address: *self.receipt_address.lock().unwrap(),
        })
    }

    fn network_lock(&self) -> &tokio::sync::Mutex<()> {
        &self.network_lock
    }
}

/// A self-custody token deployed at [`DEPLOYED`] on BNB Smart Chain.
pub(crate) fn self_custody_token() -> TokenRecord {
    TokenRecord {
        name: "Fund I".into(),
        symbol: "FUN".into(),
        token_type: crate::models::CustodyMode::SelfCustody,
        chain_id: "BSC_BNB".into(),
        contract_address: Some(DEPLOYED.to_checksum(None)),
        status: crate::models::TokenStatus::Deployed,
        partitions: vec!["Class A".into(), "Class B".into()],
        owner: Some(OWNER.to_checksum(None)),
        tx_id: None,
        tx_hash: None,
        wallet_id: None,
    }
}

/// A managed token whose contract address is not known yet.
pub(crate) fn pending_managed_token() -> TokenRecord {
    TokenRecord {
        name: "Fund II".into(),
        symbol: "FII".into(),
        token_type: crate::models::CustodyMode::Managed,
        chain_id: "BSC_BNB".into(),
        contract_address: None,
        status: crate::models::TokenStatus::Pending,
        partitions: vec!["Class A".into()],
        owner: Some("0x00000000000000000000000000000000000000aa".into()),
        tx_id: Some("cobo-tx-9".into()),
        tx_hash: None,
        wallet_id: Some("w-issuer".into()),
    }
}

/// Send one request through `app` and decode the JSON reply (`Null` when empty).
pub(crate) async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (axum::http::StatusCode, Value) {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tower::ServiceExt;

    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
