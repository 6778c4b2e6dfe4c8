//! Data access layer for ledger reads.
//!
//! Repositories provide a clean abstraction over the [`LedgerReader`](crate::ledger::LedgerReader),
//! resolved from the context via `FromRef`.

mod token;
mod transfer;

pub use token::TokenRepository;
pub use transfer::{TransferRepository, TransferScan};
