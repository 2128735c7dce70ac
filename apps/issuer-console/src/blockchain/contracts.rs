// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Security token contract interfaces and compiled artifacts.

use alloy::{
    json_abi::JsonAbi,
    primitives::{Address, Bytes, B256, U256},
    sol,
    sol_types::{SolCall, SolValue},
};

// Entry points the console calls directly from a self-custody wallet.
sol! {
    interface IERC1400 {
        function issueByPartition(bytes32 partition, address tokenHolder, uint256 value, bytes data) external;
    }

    interface IVotes {
        function delegate(address delegatee) external;
    }
}

/// Name of the issuance entry point looked up in fetched artifacts.
pub const ISSUE_BY_PARTITION: &str = "issueByPartition";

/// Constructor shape: `(string name, string symbol, bytes32[] partitions, address owner)`.
const CONSTRUCTOR_INPUTS: usize = 4;

/// Errors in contract artifacts served by the backend.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Contract ABI could not be decoded: {0}")]
    InvalidAbi(String),

    #[error("Contract bytecode is not valid hex: {0}")]
    InvalidBytecode(String),

    #[error("Contract bytecode is empty")]
    EmptyBytecode,

    #[error("Contract ABI has no constructor")]
    MissingConstructor,

    #[error("Contract constructor takes {found} arguments, expected {expected}")]
    ConstructorArity { expected: usize, found: usize },

    #[error("Contract ABI has no `{0}` function")]
    MissingFunction(&'static str),
}

/// Security token interface and creation bytecode, as served by `/artifacts`.
#[derive(Debug, Clone)]
pub struct CompiledToken {
    abi: JsonAbi,
    bytecode: Bytes,
}

impl CompiledToken {
    /// Decode the raw artifact pair.
    pub fn from_artifact(abi: &serde_json::Value, bytecode: &str) -> Result<Self, ArtifactError> {
        let abi: JsonAbi = serde_json::from_value(abi.clone())
            .map_err(|e| ArtifactError::InvalidAbi(e.to_string()))?;

        let bytecode = alloy::hex::decode(bytecode.trim())
            .map_err(|e| ArtifactError::InvalidBytecode(e.to_string()))?;

        Ok(Self {
            abi,
            bytecode: Bytes::from(bytecode),
        })
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Check the artifact can be deployed with the console's constructor arguments.
    pub fn ensure_deployable(&self) -> Result<(), ArtifactError> {
        if self.bytecode.is_empty() {
            return Err(ArtifactError::EmptyBytecode);
        }

        let constructor = self
            .abi
            .constructor
            .as_ref()
            .ok_or(ArtifactError::MissingConstructor)?;

        if constructor.inputs.len() != CONSTRUCTOR_INPUTS {
            return Err(ArtifactError::ConstructorArity {
                expected: CONSTRUCTOR_INPUTS,
                found: constructor.inputs.len(),
            });
        }
        Ok(())
    }

    /// Check the artifact exposes the partitioned issuance entry point.
    pub fn ensure_issuable(&self) -> Result<(), ArtifactError> {
        if self.abi.functions.contains_key(ISSUE_BY_PARTITION) {
            Ok(())
        } else {
            Err(ArtifactError::MissingFunction(ISSUE_BY_PARTITION))
        }
    }

    /// Creation code followed by the ABI-encoded constructor arguments.
    pub fn init_code(&self, name: &str, symbol: &str, partitions: Vec<B256>, owner: Address) -> Bytes {
        let args = (name.to_string(), symbol.to_string(), partitions, owner).abi_encode_params();

        let mut code = Vec::with_capacity(self.bytecode.len() + args.len());
        code.extend_from_slice(&self.bytecode);
        code.extend_from_slice(&args);
        Bytes::from(code)
    }
}

/// Calldata for `issueByPartition(partition, holder, value, 0x)`.
pub fn issue_by_partition_calldata(partition: B256, holder: Address, value: U256) -> Bytes {
    IERC1400::issueByPartitionCall {
        partition,
        tokenHolder: holder,
        value,
        data: Bytes::new(),
    }
    .abi_encode()
    .into()
}

/// Calldata for `delegate(delegatee)`.
pub fn delegate_calldata(delegatee: Address) -> Bytes {
    IVotes::delegateCall { delegatee }.abi_encode().into()
}
