use std::{sync::Arc, time::Duration};

use anyhow::Result;
use chrono::Utc;
use crates::domain::repositories::dev_logs::DevLogRepository;
use tracing::{error, info};

use crate::usecases::cleanup_dev_logs::{CleanupDevLogsParams, CleanupDevLogsUseCase};

/// Runs the dev-log retention job every `interval`, starting immediately.
/// A failed run is logged and retried on the next tick.
pub async fn run_retention_loop<D>(
    usecase: Arc<CleanupDevLogsUseCase<D>>,
    retention_days: i64,
    interval: Duration,
) -> Result<()>
where
    D: DevLogRepository + Send + Sync + 'static,
{
    info!(
        retention_days,
        interval_secs = interval.as_secs(),
        "retention loop: started"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let params = CleanupDevLogsParams {
            older_than_days: retention_days,
            now: Utc::now(),
        };

        if let Err(err) = usecase.run(params).await {
            error!(error = ?err, "retention loop: cleanup run failed");
        }
    }
}
