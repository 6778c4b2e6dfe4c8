//! Token model representing supply-chain provenance records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ledger-assigned token identifier. `0` is never assigned and marks "no parent".
pub type TokenId = u64;

/// Parent id carried by root-level raw materials.
pub const NO_PARENT: TokenId = 0;

/// An account address on the ledger (hex string, e.g. `0xf39F...2266`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compares two addresses ignoring hex checksum casing.
    pub fn same_account(&self, other: &Address) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Abbreviated form: first 6 and last 4 characters (`0xf39F...2266`).
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 10 {
            return self.0.clone();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A token in the supply chain.
///
/// Tokens are created by producers (raw materials, no parent) or derived
/// from an existing token by factories and retailers. The derivation link
/// is `parent_id`; the resulting parent graph is expected to be a forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Unique identifier assigned by the ledger.
    pub id: TokenId,
    /// Display name.
    pub name: String,
    /// Units minted at creation.
    pub total_supply: u64,
    /// Account that created the token.
    pub creator: Address,
    /// Token this one was derived from, or [`NO_PARENT`].
    #[serde(default)]
    pub parent_id: TokenId,
    /// JSON-encoded feature map, carried through untouched.
    #[serde(default)]
    pub features: String,
    /// Creation time as unix seconds.
    pub date_created: u64,
}

impl Token {
    /// Whether this token is a root-level raw material.
    pub fn is_root(&self) -> bool {
        self.parent_id == NO_PARENT
    }

    /// The parent id, if the token was derived from another.
    pub fn parent(&self) -> Option<TokenId> {
        (!self.is_root()).then_some(self.parent_id)
    }

    /// Creation time, if the stored timestamp is representable.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.date_created)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Supply-chain stage implied by a token's depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Depth 0: created by a producer.
    RawMaterial,
    /// Depth 1: processed by a factory.
    Processed,
    /// Depth 2: final product from a retailer.
    FinalProduct,
    /// Anything deeper.
    Derived(u32),
}

impl Stage {
    pub fn from_depth(depth: u32) -> Self {
        match depth {
            0 => Stage::RawMaterial,
            1 => Stage::Processed,
            2 => Stage::FinalProduct,
            n => Stage::Derived(n),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Stage::RawMaterial => "raw material".to_string(),
            Stage::Processed => "processed product".to_string(),
            Stage::FinalProduct => "final product".to_string(),
            Stage::Derived(n) => format!("level {}", n),
        }
    }
}
