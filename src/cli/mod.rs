//! CLI module for Provenance.
//!
//! Subcommands:
//! - `tree`: Build the lineage tree of a token
//! - `origin`: Trace a token back to its raw material
//! - `level`: Show a token's depth and stage
//! - `tokens`: List tokens
//! - `transfers`: List transfers
//! - `validate`: Check the ledger for broken parent links
//! - `mcp`: Run the MCP server (stdio transport)

mod catalog;
mod lineage;
mod mcp;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::{Config, ConfigError};
use crate::context::Context;
use crate::models::TokenId;
use crate::output::{render, OutputFormat};

/// Provenance - Supply-Chain Token Lineage
#[derive(Parser)]
#[command(name = "provenance")]
#[command(about = "Supply-chain token lineage - trace tokens to their raw material")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Ledger snapshot to read (overrides config)
    #[arg(long, global = true, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Output format (overrides config)
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the lineage tree rooted at a token
    Tree {
        /// Token to start from
        token_id: TokenId,
    },

    /// Trace a token back to its raw material
    Origin {
        token_id: TokenId,
    },

    /// Show a token's depth and supply-chain stage
    Level {
        token_id: TokenId,
    },

    /// List tokens
    Tokens {
        /// Only tokens created by this account
        #[arg(long)]
        creator: Option<String>,

        /// Only tokens this account holds, with balances
        #[arg(long)]
        holder: Option<String>,
    },

    /// List transfers
    Transfers {
        /// Only transfers of this token
        #[arg(long = "token")]
        token_id: Option<TokenId>,

        /// Only transfers sent or received by this account
        #[arg(long)]
        account: Option<String>,

        /// Only pending transfers
        #[arg(long)]
        pending: bool,
    },

    /// Check the ledger for missing parents, cycles and unreadable transfers
    Validate,

    /// Run the MCP server (stdio transport for local use)
    Mcp,
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Tree { token_id } => self.run_tree(token_id).await,
            Command::Origin { token_id } => self.run_origin(token_id).await,
            Command::Level { token_id } => self.run_level(token_id).await,
            Command::Tokens {
                ref creator,
                ref holder,
            } => {
                self.run_tokens(creator.as_deref(), holder.as_deref())
                    .await
            }
            Command::Transfers {
                token_id,
                ref account,
                pending,
            } => {
                self.run_transfers(token_id, account.as_deref(), pending)
                    .await
            }
            Command::Validate => self.run_validate().await,
            Command::Mcp => self.run_mcp().await,
        }
    }

    /// Layered config with command-line overrides applied on top.
    pub fn config(&self) -> Result<Config, ConfigError> {
        let mut config = Config::load()?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(path) = &self.snapshot {
            config.ledger.snapshot = Some(path.clone());
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
    }

    async fn context(&self) -> color_eyre::Result<Context> {
        let config = self.config()?;
        Ok(Context::from_config(config).await?)
    }

    /// Print a value to stdout in the configured format.
    fn print<T: Serialize>(ctx: &Context, value: &T) -> color_eyre::Result<()> {
        println!("{}", render(value, ctx.config.output.format)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_tree_with_global_flags() {
        let app = App::parse_from([
            "provenance",
            "tree",
            "3",
            "--snapshot",
            "ledger.json",
            "--format",
            "toon",
        ]);
        assert!(matches!(app.command, Command::Tree { token_id: 3 }));
        assert_eq!(app.snapshot, Some(PathBuf::from("ledger.json")));
        assert_eq!(app.format, Some(OutputFormat::Toon));
    }

    #[test]
    fn test_parses_transfer_filters() {
        let app = App::parse_from([
            "provenance",
            "transfers",
            "--token",
            "2",
            "--account",
            "0xabc",
            "--pending",
        ]);
        match app.command {
            Command::Transfers {
                token_id,
                account,
                pending,
            } => {
                assert_eq!(token_id, Some(2));
                assert_eq!(account.as_deref(), Some("0xabc"));
                assert!(pending);
            }
            _ => panic!("expected transfers command"),
        }
    }

    #[test]
    fn test_parses_token_holder() {
        let app = App::parse_from(["provenance", "tokens", "--holder", "0xabc"]);
        match app.command {
            Command::Tokens { creator, holder } => {
                assert!(creator.is_none());
                assert_eq!(holder.as_deref(), Some("0xabc"));
            }
            _ => panic!("expected tokens command"),
        }
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let app = App::parse_from([
            "provenance",
            "--snapshot",
            "cli.json",
            "--format",
            "toon",
            "validate",
        ]);
        let mut config = Config::default();
        app.apply_overrides(&mut config);

        assert_eq!(config.ledger.snapshot, Some(PathBuf::from("cli.json")));
        assert_eq!(config.output.format, OutputFormat::Toon);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let app = App::parse_from(["provenance", "level", "1"]);
        let mut config = Config::default();
        config.output.format = OutputFormat::Toon;
        app.apply_overrides(&mut config);

        assert!(config.ledger.snapshot.is_none());
        assert_eq!(config.output.format, OutputFormat::Toon);
    }
}
