// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Issuer Console - Security Token Issuance Operator Service
//!
//! This crate backs the issuance dashboard: it deploys and mints partitioned
//! security tokens through either managed custody (the backend's custody
//! provider signs) or self-custody (a locally held key signs), links legal
//! documents, and drives rewards distribution for issuers and investors.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `backend` - Tokenization backend REST client
//! - `blockchain` - Networks, encoding, contract artifacts and the wallet
//! - `workflow` - Custody-routed deploy, mint and delegate operations
//! - `wizard` - Three-step deploy wizard
//! - `rewards` - Rewards distribution flows and background refresh
//! - `store` - In-memory caches and wizard sessions

pub mod api;
pub mod backend;
pub mod blockchain;
pub mod busy;
pub mod config;
pub mod documents;
pub mod error;
pub mod models;
pub mod rewards;
pub mod state;
pub mod store;
pub mod views;
pub mod wizard;
pub mod workflow;

#[cfg(test)]
mod testing;
