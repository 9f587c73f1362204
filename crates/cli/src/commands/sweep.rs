//! One-shot cart expiry sweep.
//!
//! Runs the same sweep the server runs periodically. Safe to use while the
//! server is up: a cart picked up by both is migrated once and reported as
//! already processed by the loser.

use std::sync::Arc;
use std::time::Duration;

use baattak_server::db::{PgRecordStore, RecordStore, create_pool};
use baattak_server::services::{ExpirySweeper, SweepConfig};

use super::{CommandError, database_url};

/// Run a single sweep with the given staleness threshold.
pub async fn run(stale_after_secs: u64) -> Result<(), CommandError> {
    let database_url = database_url()?;
    let pool = create_pool(&database_url).await?;
    let store: Arc<dyn RecordStore> = Arc::new(PgRecordStore::new(pool));

    let sweeper = ExpirySweeper::new(
        store,
        SweepConfig {
            stale_after: Duration::from_secs(stale_after_secs),
            ..SweepConfig::default()
        },
    );

    let report = sweeper.sweep().await?;
    tracing::info!(
        stale = report.stale,
        migrated = report.migrated,
        already_processed = report.already_processed,
        failed = report.failed,
        "Sweep finished"
    );
    Ok(())
}
