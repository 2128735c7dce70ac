// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Supported networks and chain-level types.
//!
//! The backend identifies networks by custody-provider style identifiers
//! (`BSC_BNB`, `ETH_SEPOLIA`, ...). The wallet side works with EVM chain ids.
//! [`Chain`] maps between the two.

use std::fmt;

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// EVM network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// EVM chain ID
    pub chain_id: u64,
    /// Default public RPC endpoint
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

pub const ETH_MAINNET: NetworkConfig = NetworkConfig {
    name: "Ethereum",
    chain_id: 1,
    rpc_url: "https://ethereum-rpc.publicnode.com",
    explorer_url: "https://etherscan.io",
};

pub const ETH_SEPOLIA: NetworkConfig = NetworkConfig {
    name: "Sepolia",
    chain_id: 11_155_111,
    rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
    explorer_url: "https://sepolia.etherscan.io",
};

pub const BSC_MAINNET: NetworkConfig = NetworkConfig {
    name: "BNB Smart Chain",
    chain_id: 56,
    rpc_url: "https://bsc-dataseed.binance.org",
    explorer_url: "https://bscscan.com",
};

pub const POLYGON_MAINNET: NetworkConfig = NetworkConfig {
    name: "Polygon",
    chain_id: 137,
    rpc_url: "https://polygon-rpc.com",
    explorer_url: "https://polygonscan.com",
};

/// A network the console can deploy to or read from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub enum Chain {
    #[serde(rename = "ETH")]
    Ethereum,
    #[serde(rename = "ETH_SEPOLIA", alias = "SEPOLIA", alias = "SETH")]
    Sepolia,
    #[serde(rename = "BSC_BNB")]
    BscBnb,
    #[serde(rename = "MATIC_POLYGON", alias = "MATIC")]
    Polygon,
}

impl Chain {
    pub const ALL: [Chain; 4] = [
        Chain::Ethereum,
        Chain::Sepolia,
        Chain::BscBnb,
        Chain::Polygon,
    ];

    /// Identifier used by the backend API.
    pub fn backend_id(self) -> &'static str {
        match self {
            Chain::Ethereum => "ETH",
            Chain::Sepolia => "ETH_SEPOLIA",
            Chain::BscBnb => "BSC_BNB",
            Chain::Polygon => "MATIC_POLYGON",
        }
    }

    /// Parse a backend identifier, accepting the legacy aliases.
    pub fn from_backend_id(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ETH" => Some(Chain::Ethereum),
            "ETH_SEPOLIA" | "SEPOLIA" | "SETH" => Some(Chain::Sepolia),
            "BSC_BNB" => Some(Chain::BscBnb),
            "MATIC_POLYGON" | "MATIC" => Some(Chain::Polygon),
            _ => None,
        }
    }

    pub fn from_evm_chain_id(chain_id: u64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|chain| chain.network().chain_id == chain_id)
    }

    pub fn network(self) -> &'static NetworkConfig {
        match self {
            Chain::Ethereum => &ETH_MAINNET,
            Chain::Sepolia => &ETH_SEPOLIA,
            Chain::BscBnb => &BSC_MAINNET,
            Chain::Polygon => &POLYGON_MAINNET,
        }
    }

    pub fn evm_chain_id(self) -> u64 {
        self.network().chain_id
    }

    /// Name of the environment variable overriding this chain's RPC URL.
    pub fn rpc_env_var(self) -> String {
        format!("RPC_URL_{}", self.backend_id())
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.network().name, self.backend_id())
    }
}

/// Explorer link for an address on a backend-identified chain.
///
/// Unknown chains and missing addresses yield `#` so the link renders inert.
pub fn explorer_address_url(chain_id: &str, address: Option<&str>) -> String {
    match (Chain::from_backend_id(chain_id), address) {
        (Some(chain), Some(address)) if !address.is_empty() => {
            format!("{}/address/{}", chain.network().explorer_url, address)
        }
        _ => "#".to_string(),
    }
}

/// Explorer link for a transaction hash.
pub fn explorer_tx_url(chain: Chain, tx_hash: &str) -> String {
    format!("{}/tx/{}", chain.network().explorer_url, tx_hash)
}

/// Transaction receipt as seen by the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block number where the transaction was included
    pub block_number: u64,
    /// Whether execution succeeded
    pub success: bool,
    /// Address of the created contract, for contract-creation transactions
    pub contract_address: Option<Address>,
}
