//! Shared fixtures for unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::context::Context;
use crate::ledger::backends::snapshot::{LedgerSnapshot, SnapshotLedger};
use crate::ledger::{LedgerError, LedgerReader};
use crate::models::{Address, Token, TokenId, Transfer, TransferId, TransferStatus};

pub const PRODUCER: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
pub const FACTORY: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";
pub const RETAILER: &str = "0x90F79bf6EB2c4f870365E785982E1f101E93b906";
pub const WOOL_PRODUCER: &str = "0x15d34AAf54267DB7D7c367839AAf71A00a2C6A65";

pub fn token(id: TokenId, parent_id: TokenId, name: &str, creator: &str) -> Token {
    Token {
        id,
        name: name.to_string(),
        total_supply: 1000 / (id + 1),
        creator: Address::new(creator),
        parent_id,
        features: "{}".to_string(),
        date_created: 1_700_000_000 + id * 100,
    }
}

pub fn transfer(
    id: TransferId,
    token_id: TokenId,
    amount: u64,
    status: TransferStatus,
    from: &str,
    to: &str,
) -> Transfer {
    Transfer {
        id,
        from: Address::new(from),
        to: Address::new(to),
        token_id,
        amount,
        status,
        date_created: 1_700_000_000 + id * 10,
    }
}

/// Cotton chain (1 → 2 → 3) plus an unrelated wool root (4).
pub fn cotton_snapshot() -> LedgerSnapshot {
    LedgerSnapshot {
        tokens: vec![
            token(1, 0, "Raw Cotton", PRODUCER),
            token(2, 1, "Cotton Fabric", FACTORY),
            token(3, 2, "T-Shirt", RETAILER),
            token(4, 0, "Raw Wool", WOOL_PRODUCER),
        ],
        transfers: vec![
            transfer(10, 1, 500, TransferStatus::Accepted, PRODUCER, FACTORY),
            transfer(11, 2, 200, TransferStatus::Pending, FACTORY, RETAILER),
            transfer(12, 1, 100, TransferStatus::Rejected, PRODUCER, FACTORY),
        ],
    }
}

pub fn context_for(snapshot: LedgerSnapshot) -> Context {
    let ledger = SnapshotLedger::new(snapshot).expect("valid snapshot");
    Context::new(ledger, Config::default())
}

pub fn cotton_context() -> Context {
    context_for(cotton_snapshot())
}

/// Snapshot ledger that fails selected reads and counts every record fetch.
pub struct FlakyLedger {
    inner: SnapshotLedger,
    failing_tokens: HashSet<TokenId>,
    failing_transfers: HashSet<TransferId>,
    fail_transfer_listing: bool,
    token_reads: Arc<AtomicUsize>,
    transfer_reads: Arc<AtomicUsize>,
}

impl FlakyLedger {
    pub fn new(snapshot: LedgerSnapshot) -> Self {
        Self {
            inner: SnapshotLedger::new(snapshot).expect("valid snapshot"),
            failing_tokens: HashSet::new(),
            failing_transfers: HashSet::new(),
            fail_transfer_listing: false,
            token_reads: Arc::new(AtomicUsize::new(0)),
            transfer_reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn cotton() -> Self {
        Self::new(cotton_snapshot())
    }

    pub fn failing_tokens(mut self, ids: impl IntoIterator<Item = TokenId>) -> Self {
        self.failing_tokens.extend(ids);
        self
    }

    pub fn failing_transfers(mut self, ids: impl IntoIterator<Item = TransferId>) -> Self {
        self.failing_transfers.extend(ids);
        self
    }

    pub fn failing_transfer_listing(mut self) -> Self {
        self.fail_transfer_listing = true;
        self
    }

    /// Counters of `get_token` and `get_transfer` calls.
    pub fn counters(&self) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (self.token_reads.clone(), self.transfer_reads.clone())
    }

    pub fn into_context(self) -> Context {
        Context::new(self, Config::default())
    }
}

#[async_trait]
impl LedgerReader for FlakyLedger {
    async fn list_token_ids(&self) -> Result<Vec<TokenId>, LedgerError> {
        self.inner.list_token_ids().await
    }

    async fn get_token(&self, id: TokenId) -> Result<Option<Token>, LedgerError> {
        self.token_reads.fetch_add(1, Ordering::SeqCst);
        if self.failing_tokens.contains(&id) {
            return Err(LedgerError::Transport(format!("token {} read timed out", id)));
        }
        self.inner.get_token(id).await
    }

    async fn list_transfer_ids(&self) -> Result<Vec<TransferId>, LedgerError> {
        if self.fail_transfer_listing {
            return Err(LedgerError::Transport("connection refused".to_string()));
        }
        self.inner.list_transfer_ids().await
    }

    async fn get_transfer(&self, id: TransferId) -> Result<Option<Transfer>, LedgerError> {
        self.transfer_reads.fetch_add(1, Ordering::SeqCst);
        if self.failing_transfers.contains(&id) {
            return Err(LedgerError::Transport(format!(
                "transfer {} read timed out",
                id
            )));
        }
        self.inner.get_transfer(id).await
    }
}
