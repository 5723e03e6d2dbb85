use anyhow::{Context, Result, bail};
use crates::{
    domain::value_objects::rate_limits::{RateLimitPolicy, RateLimitTable},
    inference::transport::DEFAULT_INFERENCE_BASE_URL,
};

use super::config_model::{
    AuthSecret, BackendServer, Database, DotEnvyConfig, Inference, Site, Stripe,
};

const RATE_LIMIT_PREFIX: &str = "RATE_LIMIT_";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: std::env::var("SERVER_PORT_BACKEND")
            .context("SERVER_PORT_BACKEND is invalid")?
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

    let auth = get_auth_secret()?;

    let stripe = Stripe {
        secret_key: optional_env("STRIPE_SECRET_KEY"),
        webhook_secret: optional_env("STRIPE_WEBHOOK_SECRET"),
        price_pro: optional_env("STRIPE_PRICE_PRO"),
        price_enterprise: optional_env("STRIPE_PRICE_ENTERPRISE"),
    };

    let site = Site {
        url: optional_env("SITE_URL").unwrap_or_else(|| "http://localhost:5173".to_string()),
        app_slug: optional_env("APP_SLUG").unwrap_or_else(|| "app".to_string()),
    };

    let inference = Inference {
        api_key: optional_env("INFERENCE_API_KEY"),
        base_url: optional_env("INFERENCE_BASE_URL")
            .unwrap_or_else(|| DEFAULT_INFERENCE_BASE_URL.to_string()),
    };

    let rate_limits = rate_limits_from(std::env::vars())?;

    Ok(DotEnvyConfig {
        backend_server,
        database,
        auth,
        stripe,
        site,
        inference,
        rate_limits,
    })
}

pub fn get_auth_secret() -> Result<AuthSecret> {
    dotenvy::dotenv().ok();

    Ok(AuthSecret {
        jwt_secret: std::env::var("AUTH_JWT_SECRET").context("AUTH_JWT_SECRET is invalid")?,
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Applies `RATE_LIMIT_<ACTION>=capacity:refill_per_second` overrides on top
/// of the default table. `RATE_LIMIT_AI_CALL` maps to the `aiCall` action.
pub fn rate_limits_from<I>(vars: I) -> Result<RateLimitTable>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut table = RateLimitTable::default();

    for (key, value) in vars {
        let Some(raw_action) = key.strip_prefix(RATE_LIMIT_PREFIX) else {
            continue;
        };
        let action = action_name(raw_action);

        let (capacity, refill) = value
            .split_once(':')
            .with_context(|| format!("{key} must look like <capacity>:<refill_per_second>"))?;
        let capacity: f64 = capacity
            .trim()
            .parse()
            .with_context(|| format!("{key} capacity is invalid"))?;
        let refill: f64 = refill
            .trim()
            .parse()
            .with_context(|| format!("{key} refill rate is invalid"))?;

        if !capacity.is_finite() || !refill.is_finite() || capacity < 1.0 || refill < 0.0 {
            bail!("{key} needs a finite capacity >= 1 and a non-negative refill rate");
        }

        table = table.with_override(&action, RateLimitPolicy::new(capacity, refill));
    }

    Ok(table)
}

/// `AI_CALL` -> `aiCall`, `GENERATE` -> `generate`.
fn action_name(raw: &str) -> String {
    let mut name = String::new();
    for (idx, word) in raw.split('_').filter(|w| !w.is_empty()).enumerate() {
        let lower = word.to_ascii_lowercase();
        if idx == 0 {
            name.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                name.push(first.to_ascii_uppercase());
                name.extend(chars);
            }
        }
    }
    name
}
