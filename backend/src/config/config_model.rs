use crates::domain::value_objects::rate_limits::RateLimitTable;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub auth: AuthSecret,
    pub stripe: Stripe,
    pub site: Site,
    pub inference: Inference,
    pub rate_limits: RateLimitTable,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct AuthSecret {
    pub jwt_secret: String,
}

/// Every Stripe secret is optional at boot; features that need one report
/// a configuration error when it is missing.
#[derive(Debug, Clone, Default)]
pub struct Stripe {
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub price_pro: Option<String>,
    pub price_enterprise: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Site {
    pub url: String,
    pub app_slug: String,
}

#[derive(Debug, Clone)]
pub struct Inference {
    pub api_key: Option<String>,
    pub base_url: String,
}
