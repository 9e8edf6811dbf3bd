use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Data Access API configuration.
pub struct Config {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    /// Optional seed file replacing the built-in sample records.
    pub seed_path: Option<PathBuf>,
    /// JSON-lines interaction log. Interactions stay in memory when unset.
    pub interaction_log_path: Option<PathBuf>,
    /// Browser origins allowed by CORS, from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            seed_path: env::var("SEED_PATH").ok().map(PathBuf::from),
            interaction_log_path: env::var("INTERACTION_LOG_PATH").ok().map(PathBuf::from),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

/// Tool bridge configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    /// Base URL of the Data Access API.
    pub api_base: String,
    pub timeouts: BackendTimeouts,
}

impl BridgeConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("BRIDGE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BRIDGE_PORT")
                .unwrap_or_else(|_| "3333".to_string())
                .parse()?,
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            api_base: env::var("AI_CARE_API_BASE")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            timeouts: BackendTimeouts {
                connect: millis_from_env("CONNECT_TIMEOUT_MS", 5_000)?,
                lookup: millis_from_env("LOOKUP_TIMEOUT_MS", 20_000)?,
                query: millis_from_env("QUERY_TIMEOUT_MS", 30_000)?,
            },
        })
    }
}

/// Per-call bounds for backend requests. The AI query does heavier work
/// downstream than a lookup and gets the longer read timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendTimeouts {
    pub connect: Duration,
    pub lookup: Duration,
    pub query: Duration,
}

impl Default for BackendTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            lookup: Duration::from_secs(20),
            query: Duration::from_secs(30),
        }
    }
}

fn millis_from_env(key: &str, default_ms: u64) -> anyhow::Result<Duration> {
    let ms: u64 = match env::var(key) {
        Ok(raw) => raw.parse()?,
        Err(_) => default_ms,
    };
    Ok(Duration::from_millis(ms))
}
