use crate::{
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
};
use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use crates::infra;
use infra::db::postgres::postgres_connection::PgPoolSquad;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

pub fn app(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<Router> {
    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/stripe",
            routers::stripe_webhook::routes(Arc::clone(&db_pool), Arc::clone(&config)),
        )
        .nest(
            "/api/v1/billing",
            routers::billing::routes(Arc::clone(&db_pool), Arc::clone(&config)),
        )
        .nest(
            "/api/v1/ai",
            routers::ai::routes(Arc::clone(&db_pool), Arc::clone(&config)),
        )
        .nest("/api/v1/users", routers::users::routes(Arc::clone(&db_pool)))
        .nest(
            "/api/v1/admin",
            routers::admin::routes(Arc::clone(&db_pool)).merge(routers::ai_settings::routes(
                Arc::clone(&db_pool),
                Arc::clone(&config),
            )),
        )
        .merge(routers::dev_logs::routes(Arc::clone(&db_pool)))
        .merge(routers::audit_logs::routes(Arc::clone(&db_pool)))
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(allowed_origin(&config.site.url)),
        )
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

fn allowed_origin(site_url: &str) -> AllowOrigin {
    match site_url.trim_end_matches('/').parse() {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(_) => {
            warn!(%site_url, "http: SITE_URL is not a valid origin, allowing any origin");
            AllowOrigin::from(Any)
        }
    }
}

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let app = app(Arc::clone(&config), db_pool)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = ?err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = ?err, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
