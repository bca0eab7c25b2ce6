use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Upper bound the asset host accepts for a single list page.
const MAX_LIST_LIMIT: u32 = 1000;

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
/// Unlike [`load_app_config`], this does NOT load `.env` files, which makes it usable from tests
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup; no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty values are treated the same as unset so that `FOO=` in a `.env`
    // file never turns into a prefix that matches every URL.
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("VITRINE_ENV", "development"))?;

    let bind_addr = parse_addr("VITRINE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("VITRINE_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("VITRINE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("VITRINE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("VITRINE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    if db_min_connections > db_max_connections {
        return Err(invalid(
            "VITRINE_DB_MIN_CONNECTIONS",
            format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        ));
    }

    let assets_private_key = optional("VITRINE_ASSETS_PRIVATE_KEY");
    let assets_url_endpoint = optional("VITRINE_ASSETS_URL_ENDPOINT");
    let assets_api_base_url = or_default(
        "VITRINE_ASSETS_API_BASE_URL",
        "https://api.imagekit.io/v1/",
    );
    let assets_upload_base_url = or_default(
        "VITRINE_ASSETS_UPLOAD_BASE_URL",
        "https://upload.imagekit.io/api/v1/",
    );
    let assets_timeout_secs = parse_u64("VITRINE_ASSETS_TIMEOUT_SECS", "30")?;
    let assets_list_limit = parse_u32("VITRINE_ASSETS_LIST_LIMIT", "1000")?;
    if assets_list_limit == 0 || assets_list_limit > MAX_LIST_LIMIT {
        return Err(invalid(
            "VITRINE_ASSETS_LIST_LIMIT",
            format!("must be between 1 and {MAX_LIST_LIMIT}, got {assets_list_limit}"),
        ));
    }

    let products_folder = normalize_folder(&or_default("VITRINE_PRODUCTS_FOLDER", "/products"));
    let logo_folder = normalize_folder(&or_default("VITRINE_LOGO_FOLDER", "/app-assets"));
    let max_upload_bytes = parse_usize("VITRINE_MAX_UPLOAD_BYTES", "10485760")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        assets_private_key,
        assets_url_endpoint,
        assets_api_base_url,
        assets_upload_base_url,
        assets_timeout_secs,
        assets_list_limit,
        products_folder,
        logo_folder,
        max_upload_bytes,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "VITRINE_ENV".to_string(),
            reason: format!("expected development, test, or production, got '{other}'"),
        }),
    }
}

/// Folders are stored with a single leading slash and no trailing slash
/// (`/` for the root), which is the shape the asset host reports back in
/// `filePath`.
fn normalize_folder(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    format!("/{trimmed}")
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
