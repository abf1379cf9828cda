use std::net::SocketAddr;

use crate::error::ConfigError;
use crate::types::{OpenRouterConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};

pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const BIND_VAR: &str = "SNAKE_ID_BIND";
pub const MODEL_VAR: &str = "SNAKE_ID_MODEL";
pub const ENDPOINT_VAR: &str = "SNAKE_ID_ENDPOINT";
pub const LOG_VAR: &str = "SNAKE_ID_LOG";
pub const LOG_JSON_VAR: &str = "SNAKE_ID_LOG_JSON";

/// Process configuration for the identification server.
///
/// Use [`ServiceConfig::from_env()`] in the binary. A missing API key is not
/// an error here; it surfaces per request as a configuration failure.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to (default: 127.0.0.1:3000).
    pub bind: SocketAddr,
    /// Log filter directive used when `RUST_LOG` is unset (default: "info").
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones.
    pub log_json: bool,
    /// Settings for the outbound inference client.
    pub openrouter: OpenRouterConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            log_level: "info".to_string(),
            log_json: false,
            openrouter: OpenRouterConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bind: SocketAddr = match get(BIND_VAR) {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                var: BIND_VAR,
                message: format!("{raw:?}: {e}"),
            })?,
            None => Self::default().bind,
        };

        let log_json = match get(LOG_JSON_VAR) {
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::InvalidValue {
                var: LOG_JSON_VAR,
                message: format!("{raw:?} is not a boolean"),
            })?,
            None => false,
        };

        let mut openrouter = OpenRouterConfig::default()
            .endpoint(get(ENDPOINT_VAR).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()))
            .model(get(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()));
        openrouter.api_key = get(API_KEY_VAR);

        Ok(Self {
            bind,
            log_level: get(LOG_VAR).unwrap_or_else(|| "info".to_string()),
            log_json,
            openrouter,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
