//! Core trait for ledger access.

use async_trait::async_trait;

use crate::ledger::LedgerError;
use crate::models::{Token, TokenId, Transfer, TransferId};

/// Reads token and transfer records from the supply-chain ledger.
///
/// Unknown ids are reported as `Ok(None)`; `Err` is reserved for transport
/// or decoding failures, so callers can tell "does not exist" apart from
/// "could not be read". Listing operations return ids in ledger order.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Lists every token id, in creation order.
    async fn list_token_ids(&self) -> Result<Vec<TokenId>, LedgerError>;

    /// Fetches a single token.
    async fn get_token(&self, id: TokenId) -> Result<Option<Token>, LedgerError>;

    /// Lists every transfer id, in creation order.
    async fn list_transfer_ids(&self) -> Result<Vec<TransferId>, LedgerError>;

    /// Fetches a single transfer.
    async fn get_transfer(&self, id: TransferId) -> Result<Option<Transfer>, LedgerError>;
}
