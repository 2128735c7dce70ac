// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Loading the self-custody signing key.
//!
//! Keys are accepted as PEM (PKCS#8 or SEC1) or as raw hex.

use alloy::signers::local::PrivateKeySigner;
use k256::SecretKey;

use super::wallet::WalletError;

/// Parse a PEM-encoded secp256k1 key into a hex string (no `0x` prefix).
pub fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, WalletError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| WalletError::InvalidKey(format!("Invalid UTF-8: {}", e)))?;

    let pem = pem::parse(pem_str.trim())
        .map_err(|e| WalletError::InvalidKey(format!("Invalid PEM: {}", e)))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
        .map_err(|e| WalletError::InvalidKey(format!("Invalid key format: {}", e)))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}

/// Create a signer from a hex private key, with or without `0x`.
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, WalletError> {
    let key_bytes = alloy::hex::decode(private_key_hex.trim())
        .map_err(|e| WalletError::InvalidKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes).map_err(|e| WalletError::InvalidKey(e.to_string()))
}

/// Create a signer from PEM-encoded key bytes.
pub fn signer_from_pem(pem_bytes: &[u8]) -> Result<PrivateKeySigner, WalletError> {
    let hex_key = pem_to_hex(pem_bytes)?;
    signer_from_hex(&hex_key)
}

/// Read a key file, accepting either PEM or hex contents.
pub fn signer_from_file(path: &std::path::Path) -> Result<PrivateKeySigner, WalletError> {
    let contents = std::fs::read(path).map_err(|e| {
        WalletError::InvalidKey(format!("cannot read {}: {}", path.display(), e))
    })?;

    if contents.starts_with(b"-----BEGIN") {
        signer_from_pem(&contents)
    } else {
        let text = String::from_utf8_lossy(&contents);
        signer_from_hex(&text)
    }
}
