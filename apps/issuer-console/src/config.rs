// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup. Malformed
//! values are errors; only unset variables fall back to defaults.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `API_BASE_URL` | Tokenization backend REST base URL | `http://localhost:8000` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `SIGNER_KEY_PATH` | PEM or hex key file enabling self-custody | unset |
//! | `SIGNER_PRIVATE_KEY` | Hex key, alternative to `SIGNER_KEY_PATH` | unset |
//! | `WALLET_CHAIN` | Network the self-custody wallet starts on | `BSC_BNB` |
//! | `RPC_URL_<CHAIN>` | RPC endpoint override, e.g. `RPC_URL_BSC_BNB` | public RPC |
//! | `REWARDS_REFRESH_DELAY_MS` | Delay before re-reading rewards state after a mutation | `3000` |
//! | `RECEIPT_POLL_INTERVAL_MS` | Receipt polling interval of the local wallet | `2000` |
//! | `BACKEND_TIMEOUT_SECS` | Backend HTTP timeout | `30` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | Serve HTTPS when both are set | plain HTTP |
//!
//! Without a signer key no wallet is connected and every self-custody
//! operation fails with "Wallet not connected".

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alloy::signers::local::PrivateKeySigner;
use url::Url;

use crate::blockchain::signing::{signer_from_file, signer_from_hex};
use crate::blockchain::{Chain, WalletError};

pub const API_BASE_URL_ENV: &str = "API_BASE_URL";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const SIGNER_KEY_PATH_ENV: &str = "SIGNER_KEY_PATH";
pub const SIGNER_PRIVATE_KEY_ENV: &str = "SIGNER_PRIVATE_KEY";
pub const WALLET_CHAIN_ENV: &str = "WALLET_CHAIN";
pub const REWARDS_REFRESH_DELAY_MS_ENV: &str = "REWARDS_REFRESH_DELAY_MS";
pub const RECEIPT_POLL_INTERVAL_MS_ENV: &str = "RECEIPT_POLL_INTERVAL_MS";
pub const BACKEND_TIMEOUT_SECS_ENV: &str = "BACKEND_TIMEOUT_SECS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got `{value}`")]
    Invalid {
        var: String,
        expected: &'static str,
        value: String,
    },

    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),

    #[error("{0} and {1} are mutually exclusive")]
    Conflict(&'static str, &'static str),

    #[error("Signer key: {0}")]
    Signer(#[from] WalletError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Where the self-custody key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum SignerSource {
    File(PathBuf),
    Hex(String),
}

impl fmt::Debug for SignerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerSource::File(path) => f.debug_tuple("File").field(path).finish(),
            SignerSource::Hex(_) => f.write_str("Hex(<redacted>)"),
        }
    }
}

impl SignerSource {
    pub fn load(&self) -> Result<PrivateKeySigner, WalletError> {
        match self {
            SignerSource::File(path) => signer_from_file(path),
            SignerSource::Hex(hex) => signer_from_hex(hex),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub api_base_url: String,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub signer: Option<SignerSource>,
    pub wallet_chain: Chain,
    /// Effective RPC endpoint per chain, defaults included.
    pub rpc_urls: HashMap<Chain, Url>,
    pub rewards_refresh_delay: Duration,
    pub receipt_poll_interval: Duration,
    pub backend_timeout: Duration,
    pub tls: Option<TlsPaths>,
}

impl ConsoleConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_base_url = get(API_BASE_URL_ENV).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        Url::parse(&api_base_url).map_err(|_| invalid(API_BASE_URL_ENV, "an absolute URL", &api_base_url))?;

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            None => LogFormat::Pretty,
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(v) if v.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            Some(v) => return Err(invalid(LOG_FORMAT_ENV, "`json` or `pretty`", v)),
        };

        let signer = match (get(SIGNER_KEY_PATH_ENV), get(SIGNER_PRIVATE_KEY_ENV)) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Conflict(SIGNER_KEY_PATH_ENV, SIGNER_PRIVATE_KEY_ENV))
            }
            (Some(path), None) => Some(SignerSource::File(PathBuf::from(path))),
            (None, Some(hex)) => Some(SignerSource::Hex(hex)),
            (None, None) => None,
        };

        let wallet_chain = match get(WALLET_CHAIN_ENV) {
            None => Chain::BscBnb,
            Some(v) => Chain::from_backend_id(&v)
                .ok_or_else(|| invalid(WALLET_CHAIN_ENV, "a supported chain id", &v))?,
        };

        let mut rpc_urls = HashMap::new();
        for chain in Chain::ALL {
            let var = chain.rpc_env_var();
            let raw = get(var.as_str()).unwrap_or_else(|| chain.network().rpc_url.to_string());
            let url = Url::parse(&raw).map_err(|_| invalid(&var, "an RPC URL", &raw))?;
            rpc_urls.insert(chain, url);
        }

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)),
        };

        Ok(Self {
            api_base_url,
            host: get(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, PORT_ENV, "a port number", 8080)?,
            log_format,
            signer,
            wallet_chain,
            rpc_urls,
            rewards_refresh_delay: Duration::from_millis(parse_or(
                &get,
                REWARDS_REFRESH_DELAY_MS_ENV,
                "milliseconds",
                3000,
            )?),
            receipt_poll_interval: Duration::from_millis(parse_or(
                &get,
                RECEIPT_POLL_INTERVAL_MS_ENV,
                "milliseconds",
                2000,
            )?),
            backend_timeout: Duration::from_secs(parse_or(
                &get,
                BACKEND_TIMEOUT_SECS_ENV,
                "seconds",
                30,
            )?),
            tls,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn invalid(var: &str, expected: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        var: var.to_string(),
        expected,
        value: value.to_string(),
    }
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    var: &str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(var) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| invalid(var, expected, &raw)),
    }
}
