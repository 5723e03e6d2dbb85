mod config;

use anyhow::Result;
use config::ServiceContext;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global tracing subscriber for a binary.
pub fn init_observability(component: &str) -> Result<()> {
    let context = ServiceContext::from_env(component);

    // RUST_LOG wins; otherwise stay at info so request traces don't flood production.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Local time so `TZ=...` is reflected in the offset.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()?;

    info!(
        service = %context.service_name,
        environment = %context.environment,
        component = %context.component,
        "observability initialized"
    );

    Ok(())
}
