//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file from the working directory, if present (existing
//!    variables win)
//! 2. Attempts to load from environment variables
//! 3. If incomplete, falls back to loading from file
//! 4. Probes multiple paths for config files (JSON or TOML)
//!
//! ## Environment Variables
//! - `BC_CLIENT_ID`, `BC_CLIENT_SECRET`, `BC_TENANT_ID`: client registration
//!   (required)
//! - `BC_ENVIRONMENT`, `BC_COMPANY_ID`: company addressing (required)
//! - `BC_BASE_URL`, `BC_API_VERSION`: API root and version
//! - `OAUTH_SCOPE`, `OAUTH_AUTHORITY`: token request scope and authority
//! - `REQUEST_TIMEOUT_MS`: per-attempt timeout
//! - `CACHE_TTL_SECONDS`: GET response cache lifetime (`0` disables)
//! - `RATE_LIMIT_WINDOW_MS`, `RATE_LIMIT_MAX_REQUESTS`: rate limit settings
//! - `METRICS_ENABLED`: whether request metrics are recorded (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./erpbridge.json` or `./erpbridge.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use erpbridge_domain::{
    AuthConfig, ClientConfig, Config, ErpConfig, ErpError, RateLimitConfig, Result,
    DEFAULT_API_VERSION, DEFAULT_AUTHORITY, DEFAULT_BASE_URL, DEFAULT_CACHE_TTL_SECONDS,
    DEFAULT_RATE_LIMIT_MAX_REQUESTS, DEFAULT_RATE_LIMIT_WINDOW_MS, DEFAULT_REQUEST_TIMEOUT_MS,
    DEFAULT_SCOPE,
};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["erpbridge.json", "erpbridge.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables (after reading `.env`).
/// If any required variables are missing, falls back to a config file.
///
/// # Errors
/// Returns `ErpError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> Result<Config> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }

    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `ErpError::Config` if required variables are missing or have
/// invalid values.
pub fn load_from_env() -> Result<Config> {
    let auth = AuthConfig {
        tenant_id: env_var("BC_TENANT_ID")?,
        client_id: env_var("BC_CLIENT_ID")?,
        client_secret: env_var("BC_CLIENT_SECRET")?,
        scope: env_or("OAUTH_SCOPE", DEFAULT_SCOPE),
        authority: env_or("OAUTH_AUTHORITY", DEFAULT_AUTHORITY),
    };

    let erp = ErpConfig {
        base_url: env_or("BC_BASE_URL", DEFAULT_BASE_URL),
        environment: env_var("BC_ENVIRONMENT")?,
        company_id: env_var("BC_COMPANY_ID")?,
        api_version: env_or("BC_API_VERSION", DEFAULT_API_VERSION),
    };

    let client = ClientConfig {
        request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS)?,
        cache_ttl_seconds: env_parse("CACHE_TTL_SECONDS", DEFAULT_CACHE_TTL_SECONDS)?,
        metrics_enabled: env_bool("METRICS_ENABLED", true),
    };

    let rate_limit = RateLimitConfig {
        window_ms: env_parse("RATE_LIMIT_WINDOW_MS", DEFAULT_RATE_LIMIT_WINDOW_MS)?,
        max_requests: env_parse("RATE_LIMIT_MAX_REQUESTS", DEFAULT_RATE_LIMIT_MAX_REQUESTS)?,
    };

    Ok(Config { erp, auth, client, rate_limit })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Supports JSON and TOML
/// (detected by file extension).
///
/// # Errors
/// Returns `ErpError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ErpError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ErpError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ErpError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ErpError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ErpError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ErpError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// Searches the current working directory first, then the directory holding
/// the executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `ErpError::Config` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ErpError::Config(format!("Missing required environment variable: {key}"))),
    }
}

/// Optional environment variable with a default
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
}

/// Parse an optional numeric environment variable
///
/// # Errors
/// Returns `ErpError::Config` if the variable is set but does not parse.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ErpError::Config(format!("Invalid value for {key}: {e}"))),
        _ => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
