//! Lineage command handlers.

use color_eyre::Result;

use crate::di::FromRef;
use crate::mcp::tools::lineage::{TokenLevelResult, TraceOriginResult};
use crate::models::TokenId;
use crate::services::{LineageService, ValidationService};

use super::App;

impl App {
    /// Print the lineage tree rooted at a token.
    pub async fn run_tree(&self, token_id: TokenId) -> Result<()> {
        let ctx = self.context().await?;
        let tree = LineageService::from_ref(&ctx).trace(token_id).await?;

        if !tree.is_complete() {
            tracing::warn!(
                token_id,
                unread_transfers = tree.unread_transfers.len(),
                "Lineage tree is incomplete"
            );
        }
        Self::print(&ctx, &tree)
    }

    /// Print the ancestry chain of a token, root first.
    pub async fn run_origin(&self, token_id: TokenId) -> Result<()> {
        let ctx = self.context().await?;
        let chain = LineageService::from_ref(&ctx).trace_origin(token_id).await?;
        Self::print(&ctx, &TraceOriginResult::new(token_id, chain))
    }

    pub async fn run_level(&self, token_id: TokenId) -> Result<()> {
        let ctx = self.context().await?;
        let depth = LineageService::from_ref(&ctx).token_level(token_id).await?;
        Self::print(&ctx, &TokenLevelResult::new(token_id, depth))
    }

    /// Print the validation report; fails when the ledger has issues.
    pub async fn run_validate(&self) -> Result<()> {
        let ctx = self.context().await?;
        let report = ValidationService::from_ref(&ctx).validate().await?;
        Self::print(&ctx, &report)?;

        if !report.is_valid() {
            color_eyre::eyre::bail!("Ledger has {} issue(s)", report.issues.len());
        }
        Ok(())
    }
}
