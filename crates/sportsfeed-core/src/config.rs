use crate::app_config::{AppConfig, Environment};
use crate::freshness::MAX_HOURS_BACK;
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
/// Decoupled from the real environment so it can be tested with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Present-but-blank keys count as absent so an empty `.env` line disables a provider.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
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

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_hours = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let hours = parse_u32(var, default)?;
        if hours == 0 || hours > MAX_HOURS_BACK {
            return Err(invalid(
                var,
                format!("must be between 1 and {MAX_HOURS_BACK}, got {hours}"),
            ));
        }
        Ok(hours)
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("SPORTSFEED_ENV", "development"))?;

    let bind_addr = parse_addr("SPORTSFEED_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SPORTSFEED_LOG_LEVEL", "info");
    let sources_path = PathBuf::from(or_default(
        "SPORTSFEED_SOURCES_PATH",
        "./config/sources.yaml",
    ));

    let newsapi_api_key = optional("NEWSAPI_API_KEY");
    let gnews_api_key = optional("GNEWS_API_KEY");

    let db_max_connections = parse_u32("SPORTSFEED_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("SPORTSFEED_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SPORTSFEED_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let http_timeout_secs = parse_u64("SPORTSFEED_HTTP_TIMEOUT_SECS", "15")?;
    let http_user_agent = or_default(
        "SPORTSFEED_HTTP_USER_AGENT",
        "sportsfeed/0.1 (news-aggregator)",
    );

    let hours_back = parse_hours("SPORTSFEED_HOURS_BACK", "24")?;
    let keyword_window_hours = parse_hours("SPORTSFEED_KEYWORD_WINDOW_HOURS", "24")?;
    let feed_window_hours = parse_hours("SPORTSFEED_FEED_WINDOW_HOURS", "168")?;

    let ingest_cron = match lookup("SPORTSFEED_INGEST_CRON") {
        Ok(raw) if raw.trim().is_empty() => None,
        Ok(raw) => Some(raw.trim().to_string()),
        Err(_) => Some("0 */30 * * * *".to_string()),
    };

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        sources_path,
        newsapi_api_key,
        gnews_api_key,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        http_timeout_secs,
        http_user_agent,
        hours_back,
        keyword_window_hours,
        feed_window_hours,
        ingest_cron,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SPORTSFEED_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
