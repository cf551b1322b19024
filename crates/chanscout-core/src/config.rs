use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it from a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("CHANSCOUT_ENV", "development"))?;
    let log_level = or_default("CHANSCOUT_LOG_LEVEL", "info");
    let discovery_path = PathBuf::from(or_default(
        "CHANSCOUT_DISCOVERY_PATH",
        "./config/discovery.yaml",
    ));
    let youtube_api_key = lookup("YOUTUBE_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());

    let db_max_connections: u32 = parse_as(
        "CHANSCOUT_DB_MAX_CONNECTIONS",
        &or_default("CHANSCOUT_DB_MAX_CONNECTIONS", "5"),
    )?;
    let db_min_connections: u32 = parse_as(
        "CHANSCOUT_DB_MIN_CONNECTIONS",
        &or_default("CHANSCOUT_DB_MIN_CONNECTIONS", "1"),
    )?;
    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "CHANSCOUT_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        });
    }
    let db_acquire_timeout_secs: u64 = parse_as(
        "CHANSCOUT_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("CHANSCOUT_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    let http_timeout_secs: u64 = parse_as(
        "CHANSCOUT_HTTP_TIMEOUT_SECS",
        &or_default("CHANSCOUT_HTTP_TIMEOUT_SECS", "30"),
    )?;
    let http_max_retries: u32 = parse_as(
        "CHANSCOUT_HTTP_MAX_RETRIES",
        &or_default("CHANSCOUT_HTTP_MAX_RETRIES", "3"),
    )?;
    let http_backoff_base_ms: u64 = parse_as(
        "CHANSCOUT_HTTP_BACKOFF_BASE_MS",
        &or_default("CHANSCOUT_HTTP_BACKOFF_BASE_MS", "1000"),
    )?;
    let schedule = or_default("CHANSCOUT_SCHEDULE", "0 0 */6 * * *");

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        discovery_path,
        youtube_api_key,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        http_timeout_secs,
        http_max_retries,
        http_backoff_base_ms,
        schedule,
    })
}

fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CHANSCOUT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
