// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error taxonomy and its HTTP mapping.
//!
//! | Kind | Raised | HTTP |
//! |------|--------|------|
//! | [`ValidationError`] | before any remote call | 422 |
//! | [`WalletError`] | wallet missing, rejected, wrong network, RPC | 400 / 409 / 502 |
//! | [`BackendError`] | backend HTTP failure or rejected envelope | 502 |
//! | busy form | a submission of the same form is in flight | 409 |
//!
//! Every error leaves the handler as an [`ErrorDisplay`] body: the message
//! shown to the operator plus an optional auxiliary detail line.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::backend::BackendError;
use crate::blockchain::contracts::ArtifactError;
use crate::blockchain::WalletError;
use crate::workflow::WorkflowError;

/// Input problems caught before anything is submitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Please fill in all fields")]
    IncompleteForm,

    #[error("Token name and symbol are required to continue")]
    DetailsIncomplete,

    #[error("Tranche `{0}` is listed more than once")]
    DuplicatePartition(String),

    #[error("Tranche `{name}` is {len} bytes long; at most 32 bytes fit in a partition identifier")]
    PartitionTooLong { name: String, len: usize },

    #[error("Tranche `{0}` is not defined for this token")]
    UnknownPartition(String),

    #[error("No tranche row at position {0}")]
    PartitionIndex(usize),

    #[error("At least one tranche row must remain")]
    LastPartition,

    #[error("Amount must be a whole number, got `{0}`")]
    InvalidAmount(String),

    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    #[error("Invalid {field} address `{value}`")]
    InvalidAddress { field: &'static str, value: String },

    #[error("Unsupported chain `{0}`")]
    UnsupportedChain(String),

    #[error("Token has no contract address yet")]
    NotDeployed,

    #[error("Uploaded file is not valid base64")]
    InvalidUpload,

    #[error("{0}")]
    WizardStep(&'static str),
}

/// Structured error shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorDisplay {
    /// Primary message.
    pub message: String,
    /// Auxiliary line, e.g. `Error Type: contract_reverted`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorDisplay {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_error_type(mut self, error_type: Option<&str>) -> Self {
        self.detail = error_type.map(|t| format!("Error Type: {t}"));
        self
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorDisplay,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorDisplay::new(message),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn busy() -> Self {
        Self::conflict("This form is already being submitted")
    }

    pub fn message(&self) -> &str {
        &self.body.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::unprocessable(err.to_string())
    }
}

impl From<WalletError> for ApiError {
    fn from(err: WalletError) -> Self {
        let status = match err {
            WalletError::NotConnected
            | WalletError::SwitchFailed { .. }
            | WalletError::UnsupportedChain(_) => StatusCode::BAD_REQUEST,
            WalletError::Rejected => StatusCode::CONFLICT,
            WalletError::InvalidKey(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WalletError::Rpc(_) | WalletError::TransactionFailed(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            body: ErrorDisplay::new(err.to_string()).with_error_type(Some(err.error_type())),
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        let status = match err {
            BackendError::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            body: ErrorDisplay::new(err.to_string()).with_error_type(err.error_type()),
        }
    }
}

impl From<ArtifactError> for ApiError {
    fn from(err: ArtifactError) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            body: ErrorDisplay::new(err.to_string()).with_error_type(Some("invalid_artifact")),
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Validation(e) => e.into(),
            WorkflowError::Wallet(e) => e.into(),
            WorkflowError::Backend(e) => e.into(),
            WorkflowError::Artifact(e) => e.into(),
        }
    }
}
