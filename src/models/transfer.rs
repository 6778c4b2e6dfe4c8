//! Transfer model: proposed movements of token units between accounts.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Address, TokenId};

/// Ledger-assigned transfer identifier.
pub type TransferId = u64;

/// Lifecycle of a transfer. The recipient accepts or rejects a pending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawStatus")]
pub enum TransferStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Error)]
#[error("invalid transfer status: {0}")]
pub struct InvalidStatus(pub String);

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "Pending",
            TransferStatus::Accepted => "Accepted",
            TransferStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" | "pending" => Ok(TransferStatus::Pending),
            "Accepted" | "accepted" => Ok(TransferStatus::Accepted),
            "Rejected" | "rejected" => Ok(TransferStatus::Rejected),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

/// Contract enum ordinals: `0 = Pending, 1 = Accepted, 2 = Rejected`.
impl TryFrom<u8> for TransferStatus {
    type Error = InvalidStatus;

    fn try_from(ordinal: u8) -> Result<Self, Self::Error> {
        match ordinal {
            0 => Ok(TransferStatus::Pending),
            1 => Ok(TransferStatus::Accepted),
            2 => Ok(TransferStatus::Rejected),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

/// Wire form of a status: either its name or its contract ordinal.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawStatus {
    Name(String),
    Ordinal(u8),
}

impl TryFrom<RawStatus> for TransferStatus {
    type Error = InvalidStatus;

    fn try_from(raw: RawStatus) -> Result<Self, Self::Error> {
        match raw {
            RawStatus::Name(name) => name.parse(),
            RawStatus::Ordinal(n) => n.try_into(),
        }
    }
}

/// A transfer of token units from one account to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: TransferId,
    pub from: Address,
    pub to: Address,
    /// Token whose units are moved.
    pub token_id: TokenId,
    pub amount: u64,
    pub status: TransferStatus,
    /// Creation time as unix seconds.
    pub date_created: u64,
}

impl Transfer {
    /// Whether the account sent or receives this transfer.
    pub fn involves(&self, account: &Address) -> bool {
        self.from.same_account(account) || self.to.same_account(account)
    }

    /// Whether this transfer awaits a decision from `account`.
    pub fn is_pending_for(&self, account: &Address) -> bool {
        self.status == TransferStatus::Pending && self.to.same_account(account)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.date_created)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(status: &str) -> Result<Transfer, serde_json::Error> {
        serde_json::from_str(&format!(
            r#"{{"id":10,"from":"0xAAAA","to":"0xBBBB","tokenId":1,
                "amount":500,"status":{},"dateCreated":1700000200}}"#,
            status
        ))
    }

    #[test]
    fn test_status_accepts_names_and_ordinals() {
        assert_eq!(transfer("\"Accepted\"").unwrap().status, TransferStatus::Accepted);
        assert_eq!(transfer("0").unwrap().status, TransferStatus::Pending);
        assert_eq!(transfer("2").unwrap().status, TransferStatus::Rejected);
    }

    #[test]
    fn test_status_rejects_unknown_values() {
        assert!(transfer("\"Canceled\"").is_err());
        assert!(transfer("7").is_err());
    }

    #[test]
    fn test_status_serializes_as_name() {
        let json = serde_json::to_string(&transfer("1").unwrap()).unwrap();
        assert!(json.contains("\"status\":\"Accepted\""));
        assert!(json.contains("\"tokenId\":1"));
    }

    #[test]
    fn test_pending_for_recipient_only() {
        let t = transfer("\"Pending\"").unwrap();
        assert!(t.is_pending_for(&Address::new("0xbbbb")));
        assert!(!t.is_pending_for(&Address::new("0xAAAA")));
        assert!(t.involves(&Address::new("0xaaaa")));
        assert!(!t.involves(&Address::new("0xCCCC")));
    }
}
