//! Application error types with MCP protocol conversion.

use rmcp::model::ErrorCode;
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::models::{TokenId, TransferId};

/// Application-level errors for Provenance.
#[derive(Error, Debug)]
pub enum AppError {
    // Ledger errors
    #[error("Ledger read failed: {0}")]
    LedgerRead(#[from] LedgerError),

    // Domain errors
    #[error("Token not found: {0}")]
    TokenNotFound(TokenId),

    #[error("Transfer not found: {0}")]
    TransferNotFound(TransferId),

    #[error("Lineage cycle detected at token {token_id}: {path:?}")]
    CycleDetected { token_id: TokenId, path: Vec<TokenId> },

    #[error("Token {token_id} references missing parent {parent_id}")]
    DanglingParent {
        token_id: TokenId,
        parent_id: TokenId,
    },

    // Output errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("No ledger snapshot configured. Set [ledger] snapshot or pass --snapshot.")]
    NoLedger,
}

impl From<AppError> for rmcp::model::ErrorData {
    fn from(err: AppError) -> Self {
        let (code, app_code) = match &err {
            AppError::TokenNotFound(_) => (ErrorCode::RESOURCE_NOT_FOUND, "TOKEN_NOT_FOUND"),
            AppError::TransferNotFound(_) => {
                (ErrorCode::RESOURCE_NOT_FOUND, "TRANSFER_NOT_FOUND")
            }
            AppError::CycleDetected { .. } => (ErrorCode::INVALID_PARAMS, "CYCLE_DETECTED"),
            AppError::DanglingParent { .. } => (ErrorCode::INVALID_PARAMS, "DANGLING_PARENT"),
            AppError::LedgerRead(_) => (ErrorCode::INTERNAL_ERROR, "LEDGER_READ_ERROR"),
            AppError::Serialization(_) => (ErrorCode::INTERNAL_ERROR, "SERIALIZATION_ERROR"),
            AppError::Config(_) => (ErrorCode::INTERNAL_ERROR, "CONFIG_ERROR"),
            AppError::NoLedger => (ErrorCode::INVALID_REQUEST, "NO_LEDGER"),
        };

        rmcp::model::ErrorData::new(code, format!("[{}] {}", app_code, err), None)
    }
}
