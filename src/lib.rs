//! Provenance - Supply-Chain Token Lineage
//!
//! Reconstructs how tokens on a supply-chain ledger derive from one another:
//! raw materials minted by producers, processed by factories, and turned into
//! final products by retailers.

pub mod cli;
pub mod config;
pub mod context;
pub mod di;
pub mod error;
pub mod ledger;
pub mod mcp;
pub mod models;
pub mod output;
pub mod repositories;
pub mod services;

#[cfg(test)]
mod testing;

// Re-export FromRef at crate root for macro generated code
pub use di::FromRef;
