//! Request pipeline for the Business Central API

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use erpbridge_common::cache::{CacheStats, TtlCache};
use erpbridge_domain::{Config, ErpError, Result};
use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn, Span};

use super::context::{RequestContext, RequestTracker};
use crate::auth::{CredentialManager, CredentialProvider};
use crate::http::HttpClient;
use crate::observability::metrics::{MetricsSnapshot, RequestMetrics};

/// Header carrying the per-call correlation id.
pub const CORRELATION_HEADER: &str = "X-Correlation-Id";
/// Header marking the single replay after a 401.
pub const RETRY_HEADER: &str = "X-Retry-Attempt";

/// Authenticated client bound to one company's resource base URL.
pub struct ErpApiClient {
    http: HttpClient,
    credentials: Arc<dyn CredentialProvider>,
    base_url: String,
    cache: TtlCache<Value>,
    cache_ttl: Duration,
    /// Bumped by every cache invalidation
    cache_generation: AtomicU64,
    metrics: Arc<RequestMetrics>,
    metrics_enabled: bool,
    tracker: RequestTracker,
}

impl ErpApiClient {
    /// Build a client with its own [`CredentialManager`].
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::builder().config(config.clone()).build()
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ErpApiClientBuilder {
        ErpApiClientBuilder::default()
    }

    /// Company resource base URL every path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` (relative to the company base URL) and parse the body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::GET, path, None).await
    }

    /// POST `body` as JSON to `path` and parse the response.
    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body)
            .map_err(|e| ErpError::Internal(format!("Failed to serialize body: {e}")))?;
        self.send(Method::POST, path, Some(&body)).await
    }

    /// Run one logical call through the pipeline and parse the body as `T`.
    ///
    /// A body that does not match `T` is an [`ErpError::Validation`].
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let value = self.send_value(method, path, body).await?;
        serde_json::from_value(value)
            .map_err(|e| ErpError::Validation(format!("unexpected response shape for {path}: {e}")))
    }

    /// Run one logical call and return the raw JSON body (`Null` when empty).
    #[instrument(
        skip(self, body),
        fields(method = %method, path = %path, correlation_id = tracing::field::Empty)
    )]
    pub async fn send_value(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let cache_key = (method == Method::GET && self.caching_enabled())
            .then(|| format!("{method} {path}"));

        if let Some(key) = &cache_key {
            if let Some(hit) = self.cache.get(key) {
                debug!(key = %key, "serving response from cache");
                return Ok(hit);
            }
        }

        let generation = self.cache_generation.load(Ordering::SeqCst);
        let guard = self.tracker.begin(method.clone(), path);
        let correlation_id = guard.correlation_id();
        Span::current().record("correlation_id", tracing::field::display(correlation_id));

        let url = format!("{}{}", self.base_url, path);
        let mut attempt: u32 = 1;

        loop {
            let credential = match self.credentials.ensure_valid().await {
                Ok(credential) => credential,
                Err(err) => {
                    self.record(guard.started_at(), true);
                    warn!(attempt, error = %err, "no valid credential for request");
                    return Err(err);
                }
            };

            let mut request = self
                .http
                .request(method.clone(), &url)
                .bearer_auth(credential.token())
                .header(CORRELATION_HEADER, correlation_id.to_string())
                .header(ACCEPT, "application/json");
            if attempt > 1 {
                request = request.header(RETRY_HEADER, (attempt - 1).to_string());
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let started_at = guard.started_at();
            let response = match self.http.send(request).await {
                Ok(response) => response,
                Err(err) => {
                    self.record(started_at, true);
                    warn!(attempt, error = %err, category = ?err.category(), "request failed without response");
                    return Err(err);
                }
            };

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED && attempt == 1 {
                self.record(started_at, true);
                warn!(attempt, "credential rejected, refreshing and replaying once");
                self.credentials.invalidate_rejected(credential.token()).await;
                attempt = guard.next_attempt();
                continue;
            }

            let text = match self.http.text(response).await {
                Ok(text) => text,
                Err(err) => {
                    self.record(started_at, true);
                    warn!(attempt, error = %err, category = ?err.category(), "failed to read response body");
                    return Err(err);
                }
            };
            let latency = started_at.elapsed();

            if !status.is_success() {
                self.record(started_at, true);
                warn!(
                    attempt,
                    status = status.as_u16(),
                    latency_ms = latency.as_millis() as u64,
                    "request rejected"
                );
                return Err(ErpError::Api { status: status.as_u16(), body: text });
            }

            self.record(started_at, false);
            info!(
                attempt,
                status = status.as_u16(),
                latency_ms = latency.as_millis() as u64,
                "request completed"
            );

            let value = if text.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text).map_err(|e| {
                    ErpError::Validation(format!("response from {path} is not valid JSON: {e}"))
                })?
            };

            match cache_key {
                Some(key) => self.store(key, &value, generation),
                None if method != Method::GET => self.invalidate_cache(),
                None => {}
            }

            return Ok(value);
        }
    }

    /// Probe the company endpoint. Transport failures and non-success
    /// statuses report `false`; only credential failures are errors.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<bool> {
        let credential = self.credentials.ensure_valid().await?;
        let request = self
            .http
            .request(Method::GET, &self.base_url)
            .bearer_auth(credential.token())
            .header(ACCEPT, "application/json");

        match self.http.send(request).await {
            Ok(response) => {
                let healthy = response.status().is_success();
                info!(status = response.status().as_u16(), healthy, "health check");
                Ok(healthy)
            }
            Err(err) => {
                warn!(error = %err, "health check failed");
                Ok(false)
            }
        }
    }

    /// Counters, recent latencies and the current in-flight count.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.tracker.in_flight())
    }

    /// Shared handle to the underlying collector.
    pub fn metrics(&self) -> Arc<RequestMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Size, keys and hit/miss counters of the response cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop every cached GET response. Reads already in flight will not
    /// store their (older) bodies afterwards.
    pub fn invalidate_cache(&self) {
        self.cache_generation.fetch_add(1, Ordering::SeqCst);
        if !self.cache.is_empty() {
            debug!(entries = self.cache.len(), "clearing response cache");
            self.cache.clear();
        }
    }

    /// Number of calls currently dispatched.
    pub fn in_flight(&self) -> usize {
        self.tracker.in_flight()
    }

    /// Contexts of the calls currently dispatched.
    pub fn active_requests(&self) -> Vec<RequestContext> {
        self.tracker.contexts()
    }

    /// Cache `value` unless an invalidation happened since the read began.
    /// The generation is checked again after the put so an invalidation
    /// racing with it cannot leave the entry behind.
    fn store(&self, key: String, value: &Value, generation: u64) {
        if self.cache_generation.load(Ordering::SeqCst) != generation {
            debug!(key = %key, "cache invalidated during read, not storing");
            return;
        }
        self.cache.put(key.clone(), value.clone(), self.cache_ttl);
        if self.cache_generation.load(Ordering::SeqCst) != generation {
            self.cache.remove(&key);
        }
    }

    fn caching_enabled(&self) -> bool {
        !self.cache_ttl.is_zero()
    }

    fn record(&self, started_at: Instant, is_error: bool) {
        if !self.metrics_enabled {
            return;
        }
        if let Err(e) = self.metrics.record(started_at.elapsed(), is_error) {
            warn!(error = %e, "failed to record request metric");
        }
    }
}

impl std::fmt::Debug for ErpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpApiClient")
            .field("base_url", &self.base_url)
            .field("cache_ttl", &self.cache_ttl)
            .field("metrics_enabled", &self.metrics_enabled)
            .field("in_flight", &self.tracker.in_flight())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ErpApiClient`]
#[derive(Default)]
pub struct ErpApiClientBuilder {
    config: Option<Config>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    http_client: Option<HttpClient>,
    metrics: Option<Arc<RequestMetrics>>,
}

impl ErpApiClientBuilder {
    /// Configuration to build from. Required.
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an existing credential source instead of creating a
    /// [`CredentialManager`] from the auth config.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Use a preconfigured HTTP client instead of one built from the config.
    pub fn http_client(mut self, http_client: HttpClient) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Share a metrics collector between clients.
    pub fn metrics(mut self, metrics: Arc<RequestMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Validate the config and assemble the client.
    pub fn build(self) -> Result<ErpApiClient> {
        let config =
            self.config.ok_or_else(|| ErpError::Config("ErpApiClient requires a config".into()))?;
        config.validate()?;

        let http = match self.http_client {
            Some(http) => http,
            None => HttpClient::builder().timeout(config.client.request_timeout()).build()?,
        };

        let credentials = match self.credentials {
            Some(credentials) => credentials,
            None => Arc::new(CredentialManager::new(config.auth.clone(), http.clone())),
        };

        let base_url = config.resource_base_url();
        debug!(base_url = %base_url, "configured Business Central client");

        Ok(ErpApiClient {
            http,
            credentials,
            base_url,
            cache: TtlCache::new(),
            cache_ttl: config.client.cache_ttl(),
            cache_generation: AtomicU64::new(0),
            metrics: self.metrics.unwrap_or_default(),
            metrics_enabled: config.client.metrics_enabled,
            tracker: RequestTracker::new(),
        })
    }
}
