use once_cell::sync::OnceCell;
use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite://bugs.db?mode=rwc";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CLIENT_URL: &str = "http://localhost:5173";

static RUN_MODE: OnceCell<RunMode> = OnceCell::new();

/// Production mode hides error diagnostics from response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Development,
    Production,
}

impl RunMode {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("production") => RunMode::Production,
            _ => RunMode::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        *self == RunMode::Production
    }
}

/// Sets the process-wide run mode. Only the first call has any effect.
/// Read by `ApiError::error_response`, which has no request context.
pub fn set_run_mode(mode: RunMode) -> bool {
    RUN_MODE.set(mode).is_ok()
}

pub fn run_mode() -> RunMode {
    RUN_MODE.get().copied().unwrap_or_default()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got `{0}`")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub client_url: String,
    pub run_mode: RunMode,
}

impl Settings {
    /// Reads settings from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        Ok(Settings {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            client_url: lookup("CLIENT_URL").unwrap_or_else(|| DEFAULT_CLIENT_URL.to_string()),
            run_mode: RunMode::from_env_value(
                lookup("APP_ENV").or_else(|| lookup("NODE_ENV")).as_deref(),
            ),
        })
    }
}
