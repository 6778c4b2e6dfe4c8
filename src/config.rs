//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/provenance/config.toml` (XDG) or platform config dir
//! 2. Project config: `.provenance.toml`
//! 3. Environment variables: `PROVENANCE_*`
//! 4. Command-line flags (`--snapshot`, `--format`)
//!
//! # Example
//!
//! ```toml
//! [ledger]
//! snapshot = "/var/lib/supply-chain/ledger.json"
//! concurrency = 8
//!
//! [output]
//! format = "toon"
//! ```
//!
//! Environment variables split on `_`, so `PROVENANCE_LEDGER_SNAPSHOT` sets
//! `ledger.snapshot` and `PROVENANCE_OUTPUT_FORMAT` sets `output.format`.

use std::ops::Deref;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

use crate::output::OutputFormat;

/// Default number of ledger reads kept in flight while scanning.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Ledger source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Path to a JSON snapshot of the contract state.
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
    /// Maximum ledger reads in flight while scanning transfers and tokens.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            snapshot: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl LedgerConfig {
    /// Effective read concurrency (never zero).
    pub fn read_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }
}

/// Output rendering configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// The layered provider stack, without extracting.
    pub fn figment() -> Figment {
        Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(Self::user_config_path()))
            // Layer 2: Project config
            .merge(Toml::file(".provenance.toml"))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed("PROVENANCE_").split("_"))
    }

    /// User config path: ~/.config/provenance/config.toml (XDG) or platform config dir.
    fn user_config_path() -> PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("provenance").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        dirs::config_dir()
            .map(|p| p.join("provenance").join("config.toml"))
            .unwrap_or_default()
    }
}
