//! Catalog command handlers.

use color_eyre::Result;

use crate::di::FromRef;
use crate::mcp::tools::catalog::{ListTokensResult, ListTransfersResult};
use crate::models::{Address, TokenId};
use crate::services::{CatalogService, TransferFilter};

use super::App;

impl App {
    pub async fn run_tokens(&self, creator: Option<&str>, holder: Option<&str>) -> Result<()> {
        let ctx = self.context().await?;
        let catalog = CatalogService::from_ref(&ctx);
        let holder = holder.map(Address::from);

        let result =
            ListTokensResult::load(&catalog, creator.map(Address::from), holder.clone()).await?;
        if let Some(holder) = &holder {
            tracing::info!(holder = %holder.short(), tokens = result.count, "Listed holdings");
        }
        if !result.unread.is_empty() {
            tracing::warn!(
                unread_transfers = result.unread.len(),
                "Some transfers could not be read, balances may be incomplete"
            );
        }
        Self::print(&ctx, &result)
    }

    pub async fn run_transfers(
        &self,
        token_id: Option<TokenId>,
        account: Option<&str>,
        pending_only: bool,
    ) -> Result<()> {
        let ctx = self.context().await?;
        let filter = TransferFilter {
            token_id,
            account: account.map(Address::from),
            pending_only,
        };
        let scan = CatalogService::from_ref(&ctx).find_transfers(&filter).await?;

        let count = scan.transfers.len();
        Self::print(
            &ctx,
            &ListTransfersResult {
                transfers: scan.transfers,
                count,
                unread: scan.unread,
            },
        )
    }
}
