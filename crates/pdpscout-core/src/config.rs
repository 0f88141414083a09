use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "es-AR,es;q=0.9,en;q=0.8";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// config.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("PDPSCOUT_ENV", "development"))?;
    let bind_addr = parse_addr("PDPSCOUT_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("PDPSCOUT_LOG_LEVEL", "info");
    let stores_path = PathBuf::from(or_default("PDPSCOUT_STORES_PATH", "./config/stores.yaml"));

    let request_timeout_ms = parse_u64("PDPSCOUT_REQUEST_TIMEOUT_MS", "12000")?;
    let store_timeout_ms = parse_u64("PDPSCOUT_STORE_TIMEOUT_MS", "9000")?;
    let max_concurrent_lookups = parse_usize("PDPSCOUT_MAX_CONCURRENT_LOOKUPS", "6")?;
    if max_concurrent_lookups == 0 {
        return Err(invalid(
            "PDPSCOUT_MAX_CONCURRENT_LOOKUPS",
            "must be at least 1".to_string(),
        ));
    }

    let user_agent = or_default("PDPSCOUT_USER_AGENT", DEFAULT_USER_AGENT);
    let accept_language = or_default("PDPSCOUT_ACCEPT_LANGUAGE", DEFAULT_ACCEPT_LANGUAGE);

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        stores_path,
        request_timeout_ms,
        store_timeout_ms,
        max_concurrent_lookups,
        user_agent,
        accept_language,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PDPSCOUT_ENV".to_string(),
            reason: format!("expected development, test or production, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
