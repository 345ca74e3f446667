//! Configuration management

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{ErpError, Result};

pub const DEFAULT_SCOPE: &str = "https://api.businesscentral.dynamics.com/.default";
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
pub const DEFAULT_BASE_URL: &str = "https://api.businesscentral.dynamics.com";
pub const DEFAULT_API_VERSION: &str = "v2.0";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;
pub const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 60_000;
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 100;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub erp: ErpConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// Business Central tenant addressing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErpConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub environment: String,
    pub company_id: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

/// Client-credentials grant parameters
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub tenant_id: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "default_authority")]
    pub authority: String,
}

/// Request pipeline tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub request_timeout_ms: u64,
    pub cache_ttl_seconds: u64,
    pub metrics_enabled: bool,
}

/// Rate limit settings. Loaded and validated only; requests are not throttled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub window_ms: u64,
    pub max_requests: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            metrics_enabled: true,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { window_ms: DEFAULT_RATE_LIMIT_WINDOW_MS, max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

fn default_authority() -> String {
    DEFAULT_AUTHORITY.to_string()
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("authority", &self.authority)
            .finish()
    }
}

impl AuthConfig {
    /// `{authority}/{tenant}/oauth2/v2.0/token`
    pub fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.authority.trim_end_matches('/'), self.tenant_id)
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Config {
    /// Root of every resource path:
    /// `<base>/<version>/<tenant>/<environment>/api/<version>/companies(<company>)`
    pub fn resource_base_url(&self) -> String {
        format!(
            "{}/{version}/{}/{}/api/{version}/companies({})",
            self.erp.base_url.trim_end_matches('/'),
            self.auth.tenant_id,
            self.erp.environment,
            self.erp.company_id,
            version = self.erp.api_version,
        )
    }

    /// Reject configurations that cannot produce a working client.
    pub fn validate(&self) -> Result<()> {
        require("auth.tenant_id", &self.auth.tenant_id)?;
        require("auth.client_id", &self.auth.client_id)?;
        require("auth.client_secret", &self.auth.client_secret)?;
        require("auth.scope", &self.auth.scope)?;
        require("erp.environment", &self.erp.environment)?;
        require("erp.company_id", &self.erp.company_id)?;
        require("erp.api_version", &self.erp.api_version)?;
        require_url("auth.authority", &self.auth.authority)?;
        require_url("erp.base_url", &self.erp.base_url)?;

        if self.client.request_timeout_ms == 0 {
            return Err(ErpError::Config("client.request_timeout_ms must be greater than 0".into()));
        }
        if self.rate_limit.window_ms == 0 || self.rate_limit.max_requests == 0 {
            return Err(ErpError::Config("rate_limit window and max_requests must be positive".into()));
        }
        Ok(())
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ErpError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| ErpError::Config(format!("{field} is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ErpError::Config(format!("{field} must use http or https")));
    }
    Ok(())
}
