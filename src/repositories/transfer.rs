//! Transfer repository for reading and scanning transfer records.

use std::collections::HashMap;

use futures::{stream, StreamExt};
use serde::Serialize;

use crate::context::{AppConfig, AppLedger};
use crate::error::AppError;
use crate::di::FromContext;
use crate::models::{Omission, OmittedRead, TokenId, Transfer, TransferId};

/// Outcome of reading every transfer on the ledger.
///
/// Individual reads that fail or no longer resolve are recorded in
/// `unread` instead of aborting the scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransferScan {
    pub transfers: Vec<Transfer>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unread: Vec<OmittedRead>,
}

impl TransferScan {
    /// Keep only the transfers matching a predicate.
    pub fn filter(mut self, predicate: impl Fn(&Transfer) -> bool) -> Self {
        self.transfers.retain(|t| predicate(t));
        self
    }

    /// Group transfers by token, preserving ledger order within each group.
    pub fn index_by_token(self) -> (HashMap<TokenId, Vec<Transfer>>, Vec<OmittedRead>) {
        let mut index: HashMap<TokenId, Vec<Transfer>> = HashMap::new();
        for transfer in self.transfers {
            index.entry(transfer.token_id).or_default().push(transfer);
        }
        (index, self.unread)
    }
}

/// Repository for Transfer reads.
#[derive(FromContext, Clone)]
pub struct TransferRepository {
    ledger: AppLedger,
    config: AppConfig,
}

impl TransferRepository {
    /// Find a transfer by ID.
    pub async fn find_by_id(&self, id: TransferId) -> Result<Option<Transfer>, AppError> {
        Ok(self.ledger.get_transfer(id).await?)
    }

    /// Get a transfer by ID, failing with `TransferNotFound` when absent.
    pub async fn get(&self, id: TransferId) -> Result<Transfer, AppError> {
        self.find_by_id(id)
            .await?
            .ok_or(AppError::TransferNotFound(id))
    }

    /// Read every transfer on the ledger, in ledger order.
    ///
    /// Failing to list transfer IDs aborts the scan; failing to read a single
    /// transfer is logged and recorded in [`TransferScan::unread`].
    pub async fn scan(&self) -> Result<TransferScan, AppError> {
        let ids = self.ledger.list_transfer_ids().await?;
        let ledger = &self.ledger;

        let results: Vec<_> = stream::iter(ids)
            .map(|id| async move { (id, ledger.get_transfer(id).await) })
            .buffered(self.config.ledger.read_concurrency())
            .collect()
            .await;

        let mut scan = TransferScan::default();
        for (transfer_id, result) in results {
            match result {
                Ok(Some(transfer)) => scan.transfers.push(transfer),
                Ok(None) => {
                    tracing::warn!(transfer_id, "Listed transfer did not resolve");
                    scan.unread.push(OmittedRead {
                        transfer_id,
                        reason: Omission::NotFound,
                    });
                }
                Err(e) => {
                    tracing::warn!(transfer_id, error = %e, "Failed to read transfer");
                    scan.unread.push(OmittedRead {
                        transfer_id,
                        reason: Omission::ReadFailure {
                            cause: e.to_string(),
                        },
                    });
                }
            }
        }

        tracing::debug!(
            read = scan.transfers.len(),
            unread = scan.unread.len(),
            "Scanned transfers"
        );
        Ok(scan)
    }
}
