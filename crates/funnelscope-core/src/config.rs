use crate::app_config::{AppConfig, Environment, ProviderKind};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> { lookup(var).ok().filter(|v| !v.is_empty()) };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("FUNNELSCOPE_ENV", "development"));
    let bind_addr = parse_addr("FUNNELSCOPE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("FUNNELSCOPE_LOG_LEVEL", "info");
    let database_url = optional("DATABASE_URL");
    let rules_path = PathBuf::from(or_default(
        "FUNNELSCOPE_RULES_PATH",
        "./config/scoring.yaml",
    ));

    let db_max_connections = parse_u32("FUNNELSCOPE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("FUNNELSCOPE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("FUNNELSCOPE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let fetch_timeout_secs = parse_u64("FUNNELSCOPE_FETCH_TIMEOUT_SECS", "30")?;
    let fetch_settle_ms = parse_u64("FUNNELSCOPE_FETCH_SETTLE_MS", "2500")?;
    let fetch_max_retries = parse_u32("FUNNELSCOPE_FETCH_MAX_RETRIES", "2")?;
    let fetch_retry_backoff_base_secs =
        parse_u64("FUNNELSCOPE_FETCH_RETRY_BACKOFF_BASE_SECS", "2")?;
    let fetch_user_agent = or_default(
        "FUNNELSCOPE_FETCH_USER_AGENT",
        "funnelscope/0.1 (offer-intelligence)",
    );

    let render_api_url = optional("FUNNELSCOPE_RENDER_API_URL");
    let render_api_token = optional("FUNNELSCOPE_RENDER_API_TOKEN");
    let proxy_url = optional("FUNNELSCOPE_PROXY_URL");
    let screenshot_dir = optional("FUNNELSCOPE_SCREENSHOT_DIR").map(PathBuf::from);

    let adlib_base_url = or_default(
        "FUNNELSCOPE_ADLIB_BASE_URL",
        "https://graph.facebook.com/v19.0",
    );
    let adlib_access_token = optional("FUNNELSCOPE_ADLIB_ACCESS_TOKEN");

    let openai_api_key = optional("OPENAI_API_KEY");
    let openai_model = or_default("FUNNELSCOPE_OPENAI_MODEL", "gpt-4o-mini");
    let anthropic_api_key = optional("ANTHROPIC_API_KEY");
    let anthropic_model = or_default("FUNNELSCOPE_ANTHROPIC_MODEL", "claude-3-5-haiku-latest");

    let primary_raw = or_default("FUNNELSCOPE_PRIMARY_PROVIDER", "openai");
    let primary_provider =
        ProviderKind::parse(&primary_raw).ok_or_else(|| ConfigError::InvalidEnvVar {
            var: "FUNNELSCOPE_PRIMARY_PROVIDER".to_string(),
            reason: format!("unknown provider '{primary_raw}'; expected openai or anthropic"),
        })?;
    let provider_timeout_secs = parse_u64("FUNNELSCOPE_PROVIDER_TIMEOUT_SECS", "20")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        database_url,
        rules_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        fetch_timeout_secs,
        fetch_settle_ms,
        fetch_max_retries,
        fetch_retry_backoff_base_secs,
        fetch_user_agent,
        render_api_url,
        render_api_token,
        proxy_url,
        screenshot_dir,
        adlib_base_url,
        adlib_access_token,
        openai_api_key,
        openai_model,
        anthropic_api_key,
        anthropic_model,
        primary_provider,
        provider_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
