//! Catalog service for token and transfer listings.

use crate::error::AppError;
use crate::di::FromContext;
use crate::models::{
    AccountHoldings, Address, Token, TokenId, Transfer, TransferId, TransferStatus,
};
use crate::repositories::{TokenRepository, TransferRepository, TransferScan};

/// Criteria for listing transfers. Empty criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct TransferFilter {
    /// Only transfers of this token.
    pub token_id: Option<TokenId>,
    /// Only transfers sent or received by this account.
    pub account: Option<Address>,
    /// Only pending transfers (addressed to `account`, when given).
    pub pending_only: bool,
}

impl TransferFilter {
    pub fn for_token(token_id: TokenId) -> Self {
        Self {
            token_id: Some(token_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, transfer: &Transfer) -> bool {
        if self.token_id.is_some_and(|id| transfer.token_id != id) {
            return false;
        }
        match (&self.account, self.pending_only) {
            (Some(account), true) => transfer.is_pending_for(account),
            (Some(account), false) => transfer.involves(account),
            (None, true) => transfer.status == TransferStatus::Pending,
            (None, false) => true,
        }
    }
}

/// Service for browsing tokens and transfers.
#[derive(FromContext, Clone)]
pub struct CatalogService {
    token_repo: TokenRepository,
    transfer_repo: TransferRepository,
}

impl CatalogService {
    /// All tokens, in ledger order.
    pub async fn list_tokens(&self) -> Result<Vec<Token>, AppError> {
        self.token_repo.load_all().await
    }

    pub async fn get_token(&self, id: TokenId) -> Result<Token, AppError> {
        self.token_repo.get(id).await
    }

    pub async fn get_transfer(&self, id: TransferId) -> Result<Transfer, AppError> {
        self.transfer_repo.get(id).await
    }

    /// Tokens created by an account.
    pub async fn account_tokens(&self, account: &Address) -> Result<Vec<Token>, AppError> {
        self.token_repo.created_by(account).await
    }

    /// Tokens an account holds, with balances derived from accepted transfers.
    pub async fn holdings(&self, account: &Address) -> Result<AccountHoldings, AppError> {
        tracing::debug!(account = %account.short(), "Deriving holdings");

        let tokens = self.token_repo.load_all().await?;
        let scan = self.transfer_repo.scan().await?;
        Ok(AccountHoldings::derive(
            account.clone(),
            tokens,
            &scan.transfers,
            scan.unread,
        ))
    }

    /// Transfers matching a filter, with any reads that failed.
    pub async fn find_transfers(&self, filter: &TransferFilter) -> Result<TransferScan, AppError> {
        tracing::debug!(
            token_id = ?filter.token_id,
            account = ?filter.account.as_ref().map(Address::short),
            pending_only = filter.pending_only,
            "Listing transfers"
        );
        Ok(self.transfer_repo.scan().await?.filter(|t| filter.matches(t)))
    }
}
