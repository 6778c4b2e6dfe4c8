//! Catalog tools for browsing tokens and transfers.

use chrono::{DateTime, Utc};
use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    tool, tool_router, ErrorData as McpError,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::mcp::protocol::Response;
use crate::mcp::server::McpServer;
use crate::models::{Address, Holding, OmittedRead, Token, TokenId, Transfer, TransferId};
use crate::output::OutputFormat;
use crate::services::{CatalogService, TransferFilter};

// ============================================================================
// Parameter Types
// ============================================================================

/// Parameters for list_tokens tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListTokensParams {
    /// Only tokens created by this account (0x address, case-insensitive).
    #[serde(default)]
    pub creator: Option<String>,
    /// Only tokens this account holds, each with its balance.
    #[serde(default)]
    pub holder: Option<String>,
    /// Output format: json or toon (default: configured format).
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
}

/// Parameters for get_token tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetTokenParams {
    pub token_id: TokenId,
    /// Output format: json or toon (default: configured format).
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
}

/// Parameters for get_transfer tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetTransferParams {
    pub transfer_id: TransferId,
    /// Output format: json or toon (default: configured format).
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
}

/// Parameters for list_transfers tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListTransfersParams {
    /// Only transfers of this token.
    #[serde(default)]
    pub token_id: Option<TokenId>,
    /// Only transfers sent or received by this account.
    #[serde(default)]
    pub account: Option<String>,
    /// Only pending transfers. Combined with `account`, only those the
    /// account still has to accept or reject.
    #[serde(default)]
    pub pending_only: bool,
    /// Output format: json or toon (default: configured format).
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
}

impl From<&ListTransfersParams> for TransferFilter {
    fn from(params: &ListTransfersParams) -> Self {
        Self {
            token_id: params.token_id,
            account: params.account.as_deref().map(Address::from),
            pending_only: params.pending_only,
        }
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Token summary for MCP response.
#[derive(Debug, Serialize)]
pub struct TokenSummary {
    pub id: TokenId,
    pub name: String,
    pub total_supply: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TokenId>,
    pub creator: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Units held, when listing an account's holdings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<u64>,
}

impl From<Token> for TokenSummary {
    fn from(t: Token) -> Self {
        Self {
            id: t.id,
            parent_id: t.parent(),
            created_at: t.created_at(),
            name: t.name,
            total_supply: t.total_supply,
            creator: t.creator,
            balance: None,
        }
    }
}

impl From<Holding> for TokenSummary {
    fn from(h: Holding) -> Self {
        Self {
            balance: Some(h.balance),
            ..h.token.into()
        }
    }
}

/// Response for list_tokens tool.
#[derive(Debug, Serialize)]
pub struct ListTokensResult {
    pub tokens: Vec<TokenSummary>,
    pub count: usize,
    /// Transfers that could not be read; holder balances may be off.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unread: Vec<OmittedRead>,
}

impl ListTokensResult {
    /// List tokens by creator and/or holder. Both filters combine.
    pub(crate) async fn load(
        catalog: &CatalogService,
        creator: Option<Address>,
        holder: Option<Address>,
    ) -> Result<Self, AppError> {
        let (mut tokens, unread): (Vec<TokenSummary>, _) = match (holder, &creator) {
            (Some(holder), _) => {
                let held = catalog.holdings(&holder).await?;
                (held.holdings.into_iter().map(Into::into).collect(), held.unread)
            }
            (None, Some(creator)) => (
                catalog.account_tokens(creator).await?.into_iter().map(Into::into).collect(),
                Vec::new(),
            ),
            (None, None) => (
                catalog.list_tokens().await?.into_iter().map(Into::into).collect(),
                Vec::new(),
            ),
        };

        if let Some(creator) = &creator {
            tokens.retain(|t| t.creator.same_account(creator));
        }

        let count = tokens.len();
        Ok(Self {
            tokens,
            count,
            unread,
        })
    }
}

/// Response for list_transfers tool.
#[derive(Debug, Serialize)]
pub struct ListTransfersResult {
    pub transfers: Vec<Transfer>,
    pub count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unread: Vec<OmittedRead>,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router(router = catalog_tools, vis = "pub(crate)")]
impl McpServer {
    /// List tokens, optionally by creator or by holder.
    #[tool(
        description = "List tokens on the ledger. Filter by creator address, or by holder address to get the tokens an account holds with their balances (supply credited to the creator, moved by accepted transfers)."
    )]
    pub async fn list_tokens(
        &self,
        Parameters(params): Parameters<ListTokensParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            creator = ?params.creator,
            holder = ?params.holder,
            "Running list_tokens tool"
        );

        let catalog = self.resolve::<CatalogService>();
        let result = ListTokensResult::load(
            &catalog,
            params.creator.as_deref().map(Address::from),
            params.holder.as_deref().map(Address::from),
        )
        .await?;

        Response(result, self.output_format(params.output_format)).into()
    }

    #[tool(description = "Get a single token by id, including its features payload.")]
    pub async fn get_token(
        &self,
        Parameters(params): Parameters<GetTokenParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(token_id = params.token_id, "Running get_token tool");

        let token = self
            .resolve::<CatalogService>()
            .get_token(params.token_id)
            .await?;
        Response(token, self.output_format(params.output_format)).into()
    }

    #[tool(description = "Get a single transfer by id.")]
    pub async fn get_transfer(
        &self,
        Parameters(params): Parameters<GetTransferParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(transfer_id = params.transfer_id, "Running get_transfer tool");

        let transfer = self
            .resolve::<CatalogService>()
            .get_transfer(params.transfer_id)
            .await?;
        Response(transfer, self.output_format(params.output_format)).into()
    }

    /// List transfers matching token, account and status criteria.
    #[tool(
        description = "List transfers. Filter by token, by account (sender or recipient) and by pending status. With both account and pending_only, returns the transfers awaiting that account's decision."
    )]
    pub async fn list_transfers(
        &self,
        Parameters(params): Parameters<ListTransfersParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            token_id = ?params.token_id,
            account = ?params.account,
            pending_only = params.pending_only,
            "Running list_transfers tool"
        );

        let filter = TransferFilter::from(&params);
        let scan = self
            .resolve::<CatalogService>()
            .find_transfers(&filter)
            .await?;

        let count = scan.transfers.len();
        Response(
            ListTransfersResult {
                transfers: scan.transfers,
                count,
                unread: scan.unread,
            },
            self.output_format(params.output_format),
        )
        .into()
    }
}
