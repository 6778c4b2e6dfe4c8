//! Model Context Protocol (MCP) server implementation for Provenance.
//!
//! This module provides an MCP server that lets AI assistants inspect token
//! lineage and transfers recorded on the supply-chain ledger.
//!
//! ## Architecture
//!
//! The server uses compile-time dependency injection via the `Context` struct.
//! Services are resolved at tool execution time using `FromRef`.
//!
//! ## Modules
//!
//! - `server`: MCP server implementation with tool router
//! - `protocol`: Response helpers shared by the tools
//! - `tools`: Tool implementations organized by domain

pub(crate) mod server;
pub mod protocol;
pub mod tools;

pub use server::McpServer;
