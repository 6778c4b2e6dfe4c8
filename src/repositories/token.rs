//! Token repository for reading token records from the ledger.

use futures::{stream, StreamExt, TryStreamExt};

use crate::context::{AppConfig, AppLedger};
use crate::error::AppError;
use crate::di::FromContext;
use crate::models::{Address, Token, TokenId};

/// Repository for Token reads.
#[derive(FromContext, Clone)]
pub struct TokenRepository {
    ledger: AppLedger,
    config: AppConfig,
}

impl TokenRepository {
    /// Find a token by ID.
    pub async fn find_by_id(&self, id: TokenId) -> Result<Option<Token>, AppError> {
        Ok(self.ledger.get_token(id).await?)
    }

    /// Get a token by ID, failing with `TokenNotFound` when absent.
    pub async fn get(&self, id: TokenId) -> Result<Token, AppError> {
        self.find_by_id(id)
            .await?
            .ok_or(AppError::TokenNotFound(id))
    }

    /// List every token ID in ledger order.
    pub async fn list_ids(&self) -> Result<Vec<TokenId>, AppError> {
        Ok(self.ledger.list_token_ids().await?)
    }

    /// Materialize the full token set in ledger order.
    ///
    /// IDs that no longer resolve are skipped. Read failures propagate, since
    /// a partial set would silently hide whole subtrees from lineage builds.
    pub async fn load_all(&self) -> Result<Vec<Token>, AppError> {
        let ids = self.list_ids().await?;
        let ledger = &self.ledger;

        let fetched: Vec<(TokenId, Option<Token>)> = stream::iter(ids)
            .map(|id| async move { ledger.get_token(id).await.map(|token| (id, token)) })
            .buffered(self.config.ledger.read_concurrency())
            .try_collect()
            .await?;

        let tokens: Vec<Token> = fetched
            .into_iter()
            .filter_map(|(id, token)| {
                if token.is_none() {
                    tracing::debug!(token_id = id, "Listed token did not resolve, skipping");
                }
                token
            })
            .collect();

        tracing::debug!(count = tokens.len(), "Loaded token set");
        Ok(tokens)
    }

    /// Tokens created by an account, in ledger order.
    pub async fn created_by(&self, account: &Address) -> Result<Vec<Token>, AppError> {
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .filter(|t| t.creator.same_account(account))
            .collect())
    }
}
