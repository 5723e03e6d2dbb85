#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub cleanup: Cleanup,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub timeout: u64,
    pub body_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Cleanup {
    /// Bearer token for the internal HTTP trigger; the route answers 503 without it.
    pub internal_token: Option<String>,
    pub dev_log_retention_days: i64,
    pub interval_secs: u64,
}
