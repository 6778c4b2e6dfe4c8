//! Application context providing dependency injection root.

use std::sync::Arc;

use crate::config::Config;
use crate::di::Context as ContextDerive;
use crate::error::AppError;
use crate::ledger::backends::snapshot::SnapshotLedger;
use crate::ledger::LedgerReader;

/// Shared, read-only ledger handle.
pub type AppLedger = Arc<dyn LedgerReader>;

/// Shared application configuration.
pub type AppConfig = Arc<Config>;

/// Root application context for dependency injection.
///
/// The ledger session is passed explicitly through this value instead of
/// living in ambient global state. `#[derive(Context)]` makes each field
/// extractable, so repositories and services resolve from it via `FromRef`.
#[derive(ContextDerive, Clone)]
pub struct Context {
    /// Read-only ledger the services query.
    pub ledger: AppLedger,
    /// Application configuration.
    pub config: AppConfig,
}

impl Context {
    /// Creates a new context with the given dependencies.
    pub fn new(ledger: impl LedgerReader + 'static, config: Config) -> Self {
        Self {
            ledger: Arc::new(ledger),
            config: Arc::new(config),
        }
    }

    /// Creates a context from configuration, loading the configured snapshot.
    pub async fn from_config(config: Config) -> Result<Self, AppError> {
        let path = config
            .ledger
            .snapshot_path()
            .ok_or(AppError::NoLedger)?
            .to_path_buf();

        tracing::info!(path = %path.display(), "Loading ledger snapshot");
        let ledger = SnapshotLedger::load(&path).await?;
        tracing::info!(
            tokens = ledger.token_count(),
            transfers = ledger.transfer_count(),
            "Ledger snapshot ready"
        );

        Ok(Self::new(ledger, config))
    }
}
