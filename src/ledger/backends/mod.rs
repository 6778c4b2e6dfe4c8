//! Backend implementations of [`LedgerReader`](crate::ledger::LedgerReader).
//!
//! | Backend | Module | Status |
//! |---------|--------|--------|
//! | JSON snapshot of contract state | [`snapshot`] | Available |
//! | Contract calls over JSON-RPC | `rpc` | Future |

pub mod snapshot;
