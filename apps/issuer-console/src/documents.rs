// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Legal document attachment.
//!
//! A document is linked to a token by name, URI and the SHA-256 of its
//! content. The file itself never leaves the console; only its hash does.

use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;
use utoipa::ToSchema;

use crate::backend::{DocumentRequest, TokenBackend};
use crate::error::ValidationError;
use crate::models::TokenRecord;
use crate::workflow::WorkflowError;

/// `0x`-prefixed hex SHA-256 of `bytes`.
pub fn document_hash(bytes: &[u8]) -> String {
    alloy::hex::encode_prefixed(Sha256::digest(bytes))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DocumentDraft {
    pub name: String,
    pub uri: String,
    /// Set by attaching a file.
    #[serde(default)]
    pub hash: Option<String>,
}

impl DocumentDraft {
    /// Hash `bytes` into the draft, replacing any earlier hash.
    pub fn attach_file(&mut self, bytes: &[u8]) -> &str {
        self.hash.insert(document_hash(bytes))
    }

    /// As [`attach_file`](Self::attach_file), for base64-encoded uploads.
    pub fn attach_base64(&mut self, encoded: &str) -> Result<&str, ValidationError> {
        let bytes = Base64::decode_vec(encoded.trim()).map_err(|_| ValidationError::InvalidUpload)?;
        Ok(self.attach_file(&bytes))
    }

    fn to_request(&self, token: &TokenRecord) -> Result<DocumentRequest, ValidationError> {
        let hash = self.hash.as_deref().unwrap_or_default();
        if self.name.trim().is_empty() || self.uri.trim().is_empty() || hash.is_empty() {
            return Err(ValidationError::IncompleteForm);
        }
        let contract_address = token
            .operation_address()
            .ok_or(ValidationError::NotDeployed)?;

        Ok(DocumentRequest {
            chain_id: token.chain_id.clone(),
            contract_address: contract_address.to_string(),
            name: self.name.trim().to_string(),
            uri: self.uri.trim().to_string(),
            hash: hash.to_string(),
        })
    }
}

/// Link `draft` to `token` on the backend.
pub async fn attach_document(
    backend: &dyn TokenBackend,
    token: &TokenRecord,
    draft: &DocumentDraft,
) -> Result<(), WorkflowError> {
    let request = draft.to_request(token)?;
    backend.attach_document(&request).await?;
    info!(symbol = %token.symbol, document = %request.name, "Document linked");
    Ok(())
}
