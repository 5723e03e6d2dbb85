use std::sync::Arc;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use crates::domain::repositories::dev_logs::DevLogRepository;
use tracing::info;

/// Rows removed per run; the next run picks up whatever is left.
pub const DEV_LOG_CLEANUP_BATCH: i64 = 500;

#[derive(Debug, Clone)]
pub struct CleanupDevLogsParams {
    pub older_than_days: i64,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanupDevLogsResult {
    pub cutoff: DateTime<Utc>,
    pub deleted: usize,
}

/// `now` minus `older_than_days` (negative counts as zero), or `None` when
/// the result falls outside the representable date range.
pub fn retention_cutoff(now: DateTime<Utc>, older_than_days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(older_than_days.max(0)).and_then(|age| now.checked_sub_signed(age))
}

pub struct CleanupDevLogsUseCase<D>
where
    D: DevLogRepository + Send + Sync + 'static,
{
    dev_log_repo: Arc<D>,
}

impl<D> CleanupDevLogsUseCase<D>
where
    D: DevLogRepository + Send + Sync + 'static,
{
    pub fn new(dev_log_repo: Arc<D>) -> Self {
        Self { dev_log_repo }
    }

    /// Deletes non-error dev logs older than `older_than_days`. Error entries
    /// are kept regardless of age.
    pub async fn run(&self, params: CleanupDevLogsParams) -> Result<CleanupDevLogsResult> {
        let older_than_days = params.older_than_days.max(0);
        let cutoff = retention_cutoff(params.now, older_than_days)
            .ok_or_else(|| anyhow!("older_than_days {older_than_days} is out of range"))?;

        let deleted = self
            .dev_log_repo
            .delete_non_error_older_than(cutoff, DEV_LOG_CLEANUP_BATCH)
            .await?;

        info!(
            %cutoff,
            older_than_days,
            deleted,
            "cleanup_dev_logs: cleared old dev logs"
        );

        Ok(CleanupDevLogsResult { cutoff, deleted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crates::domain::repositories::dev_logs::MockDevLogRepository;

    #[tokio::test]
    async fn cutoff_is_days_before_now_and_batch_is_bounded() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let expected_cutoff = Utc.with_ymd_and_hms(2026, 3, 3, 12, 0, 0).unwrap();

        let mut repo = MockDevLogRepository::new();
        repo.expect_delete_non_error_older_than()
            .withf(move |cutoff, batch| *cutoff == expected_cutoff && *batch == 500)
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(42) }));

        let usecase = CleanupDevLogsUseCase::new(Arc::new(repo));
        let result = usecase
            .run(CleanupDevLogsParams {
                older_than_days: 7,
                now,
            })
            .await
            .unwrap();

        assert_eq!(
            result,
            CleanupDevLogsResult {
                cutoff: expected_cutoff,
                deleted: 42,
            }
        );
    }

    #[tokio::test]
    async fn negative_days_are_treated_as_zero() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();

        let mut repo = MockDevLogRepository::new();
        repo.expect_delete_non_error_older_than()
            .withf(move |cutoff, _| *cutoff == now)
            .returning(|_, _| Box::pin(async { Ok(0) }));

        let usecase = CleanupDevLogsUseCase::new(Arc::new(repo));
        let result = usecase
            .run(CleanupDevLogsParams {
                older_than_days: -5,
                now,
            })
            .await
            .unwrap();

        assert_eq!(result.deleted, 0);
    }

    #[tokio::test]
    async fn out_of_range_days_fail_without_touching_the_table() {
        let mut repo = MockDevLogRepository::new();
        repo.expect_delete_non_error_older_than().never();

        let usecase = CleanupDevLogsUseCase::new(Arc::new(repo));

        for older_than_days in [i64::MAX, 200_000_000_000, 100_000_000] {
            let err = usecase
                .run(CleanupDevLogsParams {
                    older_than_days,
                    now: Utc::now(),
                })
                .await
                .unwrap_err();

            assert!(err.to_string().contains("out of range"));
        }
    }

    #[test]
    fn cutoff_is_none_outside_the_date_range() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();

        assert_eq!(retention_cutoff(now, 0), Some(now));
        assert_eq!(retention_cutoff(now, -1), Some(now));
        assert_eq!(retention_cutoff(now, i64::MAX), None);
        assert_eq!(retention_cutoff(now, 100_000_000), None);
    }

    #[tokio::test]
    async fn repository_failure_is_propagated() {
        let mut repo = MockDevLogRepository::new();
        repo.expect_delete_non_error_older_than()
            .returning(|_, _| Box::pin(async { Err(anyhow::anyhow!("connection refused")) }));

        let usecase = CleanupDevLogsUseCase::new(Arc::new(repo));
        let err = usecase
            .run(CleanupDevLogsParams {
                older_than_days: 7,
                now: Utc::now(),
            })
            .await
            .unwrap_err();

        assert!(err.to_string().contains("connection refused"));
    }
}
