//! In-memory ledger backed by a JSON snapshot of the contract state.
//!
//! A snapshot is the materialized result of the contract's read methods:
//!
//! ```json
//! {
//!   "tokens": [
//!     {"id": 1, "name": "Raw Cotton", "totalSupply": 1000,
//!      "creator": "0x7099...79C8", "parentId": 0, "features": "{}",
//!      "dateCreated": 1700000000}
//!   ],
//!   "transfers": [
//!     {"id": 10, "from": "0x7099...79C8", "to": "0x3C44...93BC",
//!      "tokenId": 1, "amount": 500, "status": "Accepted",
//!      "dateCreated": 1700000050}
//!   ]
//! }
//! ```
//!
//! Record order in the file is the ledger iteration order.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ledger::{LedgerError, LedgerReader};
use crate::models::{Token, TokenId, Transfer, TransferId};

/// Serialized contract state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub transfers: Vec<Transfer>,
}

/// Read-only ledger serving records from a [`LedgerSnapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotLedger {
    tokens: Vec<Token>,
    transfers: Vec<Transfer>,
    token_index: HashMap<TokenId, usize>,
    transfer_index: HashMap<TransferId, usize>,
}

impl SnapshotLedger {
    /// Indexes a snapshot. Duplicate ids are rejected.
    pub fn new(snapshot: LedgerSnapshot) -> Result<Self, LedgerError> {
        let mut token_index = HashMap::with_capacity(snapshot.tokens.len());
        for (pos, token) in snapshot.tokens.iter().enumerate() {
            if token_index.insert(token.id, pos).is_some() {
                return Err(LedgerError::DuplicateToken(token.id));
            }
        }

        let mut transfer_index = HashMap::with_capacity(snapshot.transfers.len());
        for (pos, transfer) in snapshot.transfers.iter().enumerate() {
            if transfer_index.insert(transfer.id, pos).is_some() {
                return Err(LedgerError::DuplicateTransfer(transfer.id));
            }
        }

        Ok(Self {
            tokens: snapshot.tokens,
            transfers: snapshot.transfers,
            token_index,
            transfer_index,
        })
    }

    /// Parses and indexes a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        let snapshot: LedgerSnapshot = serde_json::from_str(json)?;
        Self::new(snapshot)
    }

    /// Loads a JSON snapshot from disk.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LedgerError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let ledger = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            tokens = ledger.tokens.len(),
            transfers = ledger.transfers.len(),
            "Loaded ledger snapshot"
        );
        Ok(ledger)
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }
}

#[async_trait]
impl LedgerReader for SnapshotLedger {
    async fn list_token_ids(&self) -> Result<Vec<TokenId>, LedgerError> {
        Ok(self.tokens.iter().map(|t| t.id).collect())
    }

    async fn get_token(&self, id: TokenId) -> Result<Option<Token>, LedgerError> {
        Ok(self.token_index.get(&id).map(|&pos| self.tokens[pos].clone()))
    }

    async fn list_transfer_ids(&self) -> Result<Vec<TransferId>, LedgerError> {
        Ok(self.transfers.iter().map(|t| t.id).collect())
    }

    async fn get_transfer(&self, id: TransferId) -> Result<Option<Transfer>, LedgerError> {
        Ok(self
            .transfer_index
            .get(&id)
            .map(|&pos| self.transfers[pos].clone()))
    }
}
