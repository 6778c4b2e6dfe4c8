//! MCP server implementation for Provenance.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, ServerHandler},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool_handler,
};

use crate::context::Context;
use crate::di::FromRef;
use crate::output::OutputFormat;

/// Provenance MCP Server for supply-chain token lineage.
///
/// This server provides AI assistants with tools to:
/// - Build derivation trees and trace tokens back to their raw material
/// - Browse tokens and transfers on the ledger
/// - Check the ledger for broken parent links
#[derive(Clone)]
pub struct McpServer {
    pub(crate) ctx: Arc<Context>,
    tool_router: ToolRouter<McpServer>,
}

impl McpServer {
    /// Create a new Provenance MCP server with the given context.
    pub fn new(ctx: Context) -> Self {
        tracing::info!("Initializing Provenance MCP server");

        Self {
            ctx: Arc::new(ctx),
            tool_router: Self::tool_router(),
        }
    }

    /// Build the combined tool router from all tool modules.
    fn tool_router() -> ToolRouter<Self> {
        Self::lineage_tools() + Self::catalog_tools()
    }

    /// Resolve a dependency from the context.
    ///
    /// This enables compile-time dependency injection for repositories
    /// and services that implement `FromRef<Context>`.
    pub fn resolve<T: FromRef<Context>>(&self) -> T {
        T::from_ref(&self.ctx)
    }

    /// Format for a tool response: the caller's choice, else `[output] format`.
    pub(crate) fn output_format(&self, requested: Option<OutputFormat>) -> Option<OutputFormat> {
        Some(requested.unwrap_or(self.ctx.config.output.format))
    }

    /// Get direct access to the context.
    pub fn context(&self) -> &Context {
        &self.ctx
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                r#"Provenance - Supply-Chain Token Lineage MCP Server

Reads a supply-chain ledger where producers mint raw material tokens and
factories and retailers derive new tokens from existing ones.

## Concepts

- **Token**: A batch of goods. `parentId` 0 marks a raw material.
- **Depth**: Derivation steps from the root (0 raw material, 1 processed, 2 final product).
- **Transfer**: Units of a token moved between accounts (Pending, Accepted, Rejected).
- **Lineage tree**: A token plus every token derived from it, recursively.

## Lineage Tools

- **build_lineage_tree** - Derivation tree with depths and transfer histories
- **trace_origin** - Ancestry chain from the raw material down to a token
- **get_token_level** - Depth and supply-chain stage of a token
- **validate_ledger** - Report missing parents, cycles and unreadable transfers

## Catalog Tools

- **list_tokens** - List tokens by creator, or an account's holdings with balances
- **get_token** - Get a token by id
- **get_transfer** - Get a transfer by id
- **list_transfers** - List transfers by token, account or pending status

Every tool takes an optional `output_format` (`json` or `toon`); when it is
omitted the server's configured format is used.

Incomplete results are flagged: `omitted` on a node lists children that
could not be read, `unread_transfers` lists transfers whose read failed.
"#
                .to_string(),
            ),
        }
    }
}
