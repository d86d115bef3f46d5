use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use quill_db::Database;

/// Background task that purges expired trash.
///
/// Runs once at startup and then on an interval. Each run deletes notes that
/// have sat in the trash past the retention window. A failed run is logged
/// and swallowed; the filter is idempotent, so the next tick retries.
pub async fn run_sweeper_loop(db: Arc<Database>, interval_secs: u64, retention_days: i64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        let cutoff = chrono::Utc::now() - chrono::Duration::days(retention_days);
        let sweep_db = db.clone();
        match tokio::task::spawn_blocking(move || sweep_db.purge_expired_trash(cutoff)).await {
            Ok(Ok(count)) => {
                if count > 0 {
                    info!("Trash sweep: purged {} expired notes", count);
                }
            }
            Ok(Err(e)) => {
                warn!("Trash sweep error: {}", e);
            }
            Err(e) => {
                warn!("Trash sweep join error: {}", e);
            }
        }
    }
}
