use anyhow::Result;
use crates::infra::db::{
    postgres::postgres_connection, repositories::dev_logs::DevLogPostgres,
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};
use worker::{
    axum_http, config, services::retention_loop,
    usecases::cleanup_dev_logs::CleanupDevLogsUseCase,
};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(error) = run().await {
        error!("Worker exited with error: {}", error);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    let dev_log_repository = Arc::new(DevLogPostgres::new(Arc::clone(&db_pool_arc)));
    let cleanup_usecase = Arc::new(CleanupDevLogsUseCase::new(dev_log_repository));

    let retention_loop = tokio::spawn(retention_loop::run_retention_loop(
        Arc::clone(&cleanup_usecase),
        dotenvy_env.cleanup.dev_log_retention_days,
        Duration::from_secs(dotenvy_env.cleanup.interval_secs),
    ));

    let server_config = Arc::clone(&dotenvy_env);
    let http_server =
        tokio::spawn(async move { axum_http::http_serve::start(server_config, cleanup_usecase).await });

    tokio::select! {
        result = retention_loop => result??,
        result = http_server => result??,
    };
    Ok(())
}
