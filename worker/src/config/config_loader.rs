use super::config_model::{Cleanup, Database, DotEnvyConfig, WorkerServer};
use anyhow::{Context, Result};

pub const DEFAULT_DEV_LOG_RETENTION_DAYS: i64 = 7;
pub const MAX_DEV_LOG_RETENTION_DAYS: i64 = 36_500;
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 24 * 60 * 60;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: std::env::var("SERVER_PORT_WORKER")
            .context("SERVER_PORT_WORKER is invalid")?
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .context("SERVER_BODY_LIMIT is invalid")?
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .context("SERVER_TIMEOUT is invalid")?
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").context("DATABASE_URL is invalid")?,
    };

    let cleanup = Cleanup {
        internal_token: std::env::var("INTERNAL_CLEANUP_TOKEN").ok().and_then(|v| {
            let trimmed = v.trim().to_string();
            (!trimmed.is_empty()).then_some(trimmed)
        }),
        dev_log_retention_days: parse_retention_days(
            std::env::var("DEV_LOG_RETENTION_DAYS").ok().as_deref(),
        ),
        interval_secs: std::env::var("DEV_LOG_CLEANUP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_CLEANUP_INTERVAL_SECS),
    };

    Ok(DotEnvyConfig {
        worker_server,
        database,
        cleanup,
    })
}

/// Negative, oversized or unparsable values fall back to the default.
pub fn parse_retention_days(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| (0..=MAX_DEV_LOG_RETENTION_DAYS).contains(v))
        .unwrap_or(DEFAULT_DEV_LOG_RETENTION_DAYS)
}
