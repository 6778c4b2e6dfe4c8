//! Lineage tools: derivation trees, origin chains and ledger checks.
//!
//! Thin MCP handlers over LineageService and ValidationService.

use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    tool, tool_router, ErrorData as McpError,
};
use serde::{Deserialize, Serialize};

use crate::mcp::protocol::Response;
use crate::mcp::server::McpServer;
use crate::models::{Stage, Token, TokenId};
use crate::output::OutputFormat;
use crate::services::{LineageService, ValidationService};

// ============================================================================
// Parameter Types
// ============================================================================

/// Parameters for build_lineage_tree tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct BuildLineageTreeParams {
    /// Token whose derivation tree to build.
    pub token_id: TokenId,
    /// Output format: json or toon (default: configured format).
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
}

/// Parameters for trace_origin tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TraceOriginParams {
    /// Token whose ancestry to trace.
    pub token_id: TokenId,
    /// Output format: json or toon (default: configured format).
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
}

/// Parameters for get_token_level tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetTokenLevelParams {
    pub token_id: TokenId,
    /// Output format: json or toon (default: configured format).
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
}

/// Parameters for validate_ledger tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ValidateLedgerParams {
    /// Output format: json or toon (default: configured format).
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
}

// ============================================================================
// Response Types
// ============================================================================

/// One link of an origin chain.
#[derive(Debug, Serialize)]
pub struct OriginStep {
    pub depth: u32,
    pub stage: Stage,
    pub token: Token,
}

/// Response for trace_origin tool.
#[derive(Debug, Serialize)]
pub struct TraceOriginResult {
    pub token_id: TokenId,
    /// Root raw material first, the requested token last.
    pub chain: Vec<OriginStep>,
}

impl TraceOriginResult {
    pub(crate) fn new(token_id: TokenId, chain: Vec<Token>) -> Self {
        let chain = chain
            .into_iter()
            .enumerate()
            .map(|(depth, token)| {
                let depth = depth as u32;
                OriginStep {
                    depth,
                    stage: Stage::from_depth(depth),
                    token,
                }
            })
            .collect();
        Self { token_id, chain }
    }
}

/// Response for get_token_level tool.
#[derive(Debug, Serialize)]
pub struct TokenLevelResult {
    pub token_id: TokenId,
    pub depth: u32,
    pub stage: Stage,
    pub label: String,
}

impl TokenLevelResult {
    pub(crate) fn new(token_id: TokenId, depth: u32) -> Self {
        let stage = Stage::from_depth(depth);
        Self {
            token_id,
            depth,
            stage,
            label: stage.label(),
        }
    }
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router(router = lineage_tools, vis = "pub(crate)")]
impl McpServer {
    /// Build the derivation tree rooted at a token.
    #[tool(
        description = "Build the lineage tree of a token: every token derived from it, recursively, with each token's depth, supply-chain stage and transfer history. Branches or transfers that could not be read are listed under 'omitted' and 'unread_transfers'."
    )]
    pub async fn build_lineage_tree(
        &self,
        Parameters(params): Parameters<BuildLineageTreeParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(token_id = params.token_id, "Running build_lineage_tree tool");

        let service = self.resolve::<LineageService>();
        let tree = service.trace(params.token_id).await?;

        Response(tree, self.output_format(params.output_format)).into()
    }

    /// Walk a token's parents up to its root raw material.
    #[tool(
        description = "Trace a token back to its raw material. Returns the ancestry chain from the root token (depth 0) down to the requested token."
    )]
    pub async fn trace_origin(
        &self,
        Parameters(params): Parameters<TraceOriginParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(token_id = params.token_id, "Running trace_origin tool");

        let service = self.resolve::<LineageService>();
        let chain = service.trace_origin(params.token_id).await?;

        Response(
            TraceOriginResult::new(params.token_id, chain),
            self.output_format(params.output_format),
        )
        .into()
    }

    #[tool(
        description = "Get a token's depth in its derivation chain and the supply-chain stage it implies (raw material, processed product, final product)."
    )]
    pub async fn get_token_level(
        &self,
        Parameters(params): Parameters<GetTokenLevelParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(token_id = params.token_id, "Running get_token_level tool");

        let service = self.resolve::<LineageService>();
        let depth = service.token_level(params.token_id).await?;

        Response(
            TokenLevelResult::new(params.token_id, depth),
            self.output_format(params.output_format),
        )
        .into()
    }

    /// Check the ledger for broken parent links and unreadable records.
    #[tool(
        description = "Validate ledger integrity. Reports tokens with missing parents, parent cycles, transfers of unknown tokens and transfers that could not be read."
    )]
    pub async fn validate_ledger(
        &self,
        Parameters(params): Parameters<ValidateLedgerParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Running validate_ledger tool");

        let service = self.resolve::<ValidationService>();
        let report = service.validate().await?;

        Response(report, self.output_format(params.output_format)).into()
    }
}
