//! Domain models for the supply-chain ledger.

mod holding;
mod lineage;
mod token;
mod transfer;

pub use holding::{AccountHoldings, Holding};
pub use lineage::{LineageIter, LineageNode, LineageTree, Omission, OmittedBranch, OmittedRead};
pub use token::{Address, Stage, Token, TokenId, NO_PARENT};
pub use transfer::{InvalidStatus, Transfer, TransferId, TransferStatus};
