// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM integration for self-custody operations.
//!
//! This module provides:
//! - Supported networks and explorer links
//! - Partition, address and amount encoding
//! - Security token artifacts and calldata
//! - The wallet capability and its local-key implementation

pub mod contracts;
pub mod encoding;
pub mod local_wallet;
pub mod signing;
pub mod types;
pub mod wallet;

pub use local_wallet::LocalWallet;
pub use types::*;
pub use wallet::{ContractWrite, WalletAdapter, WalletError};
