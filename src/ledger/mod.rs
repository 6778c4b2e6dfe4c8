//! Ledger abstraction for backend-agnostic, read-only access to contract state.
//!
//! The traceability view never writes. Everything it needs is expressed by
//! [`LedgerReader`]: list and fetch tokens, list and fetch transfers.
//!
//! # Usage
//!
//! ```ignore
//! use provenance::ledger::{backends::snapshot::SnapshotLedger, LedgerReader};
//!
//! let ledger = SnapshotLedger::load("ledger.json").await?;
//! for id in ledger.list_token_ids().await? {
//!     if let Some(token) = ledger.get_token(id).await? {
//!         println!("{} {}", token.id, token.name);
//!     }
//! }
//! ```

mod traits;

pub mod backends;

pub use traits::LedgerReader;

use std::path::PathBuf;

use thiserror::Error;

use crate::models::{TokenId, TransferId};

/// Errors raised by ledger backends.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Ledger transport error: {0}")]
    Transport(String),

    #[error("Failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Duplicate token id {0} in snapshot")]
    DuplicateToken(TokenId),

    #[error("Duplicate transfer id {0} in snapshot")]
    DuplicateTransfer(TransferId),
}
