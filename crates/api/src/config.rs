use dealflow_core::batch::PROCESSING_STALE_AFTER_MINS;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Webhook URL for outbound notifications. Unset means notifications
    /// are logged and dropped.
    pub notify_webhook_url: Option<String>,
    /// Minutes after which a `processing` import batch is treated as
    /// abandoned and failed on read.
    pub stale_batch_mins: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `NOTIFY_WEBHOOK_URL`   | unset                      |
    /// | `STALE_BATCH_MINUTES`  | `15`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let notify_webhook_url = std::env::var("NOTIFY_WEBHOOK_URL").ok().filter(|s| !s.is_empty());

        let stale_batch_mins: i64 = std::env::var("STALE_BATCH_MINUTES")
            .unwrap_or_else(|_| PROCESSING_STALE_AFTER_MINS.to_string())
            .parse()
            .expect("STALE_BATCH_MINUTES must be a valid i64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            notify_webhook_url,
            stale_batch_mins,
        }
    }
}
