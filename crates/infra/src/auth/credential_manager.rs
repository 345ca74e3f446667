use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use erpbridge_common::time::{Clock, SystemClock};
use erpbridge_domain::{AuthConfig, ErpError, Result};
use reqwest::Method;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::types::{expiry_for, Credential, TokenResponse};
use super::CredentialProvider;
use crate::http::HttpClient;

/// Owns the access token for one client registration.
///
/// Refreshes are single-flight: concurrent callers that find no valid
/// credential queue on `refresh_lock`, and all but the first find the fresh
/// token already stored when they get the lock.
pub struct CredentialManager<C: Clock = SystemClock> {
    http: HttpClient,
    auth: AuthConfig,
    clock: C,
    credential: RwLock<Option<Credential>>,
    refresh_lock: Mutex<()>,
    exchanges: AtomicU64,
}

impl CredentialManager<SystemClock> {
    /// Create a manager on the system clock.
    pub fn new(auth: AuthConfig, http: HttpClient) -> Self {
        Self::with_clock(auth, http, SystemClock)
    }
}

impl<C: Clock> CredentialManager<C> {
    /// Create a manager driven by a custom clock (useful for testing)
    pub fn with_clock(auth: AuthConfig, http: HttpClient, clock: C) -> Self {
        Self {
            http,
            auth,
            clock,
            credential: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            exchanges: AtomicU64::new(0),
        }
    }

    /// Number of token exchanges performed so far.
    pub fn exchange_count(&self) -> u64 {
        self.exchanges.load(Ordering::SeqCst)
    }

    /// The stored credential if it is still valid.
    pub async fn current(&self) -> Option<Credential> {
        let now = self.clock.now();
        self.credential.read().await.as_ref().filter(|c| c.is_valid_at(now)).cloned()
    }

    #[instrument(skip(self), fields(tenant = %self.auth.tenant_id))]
    async fn refresh(&self) -> Result<Credential> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(credential) = self.current().await {
            debug!("credential refreshed by a concurrent caller");
            return Ok(credential);
        }

        let credential = self.exchange().await?;
        *self.credential.write().await = Some(credential.clone());
        Ok(credential)
    }

    async fn exchange(&self) -> Result<Credential> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.auth.client_id.as_str()),
            ("client_secret", self.auth.client_secret.as_str()),
            ("scope", self.auth.scope.as_str()),
        ];

        debug!(client_id = %self.auth.client_id, "requesting access token");

        let request = self.http.request(Method::POST, self.auth.token_url()).form(&params);
        let response = self.http.send(request).await.map_err(|err| {
            warn!(error = %err, "token endpoint unreachable");
            ErpError::Authentication { status: None, body: err.to_string() }
        })?;

        let status = response.status();
        let body = self.http.text(response).await.map_err(|err| {
            warn!(error = %err, "token response body unreadable");
            ErpError::Authentication { status: Some(status.as_u16()), body: err.to_string() }
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "token exchange rejected");
            return Err(ErpError::Authentication { status: Some(status.as_u16()), body });
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|err| ErpError::Authentication {
            status: Some(status.as_u16()),
            body: format!("invalid token response: {err}"),
        })?;

        let now = self.clock.now();
        let expires_at = expiry_for(now, token.expires_in);
        let valid_for = expires_at.saturating_duration_since(now);
        self.exchanges.fetch_add(1, Ordering::SeqCst);

        info!(
            expires_in = token.expires_in,
            expires_at = %wall_clock(self.clock.system_time(), valid_for),
            "access token obtained"
        );

        Ok(Credential::new(token.access_token, expires_at))
    }
}

fn wall_clock(now: std::time::SystemTime, offset: Duration) -> DateTime<Utc> {
    DateTime::<Utc>::from(now + offset)
}

#[async_trait]
impl<C: Clock> CredentialProvider for CredentialManager<C> {
    async fn ensure_valid(&self) -> Result<Credential> {
        if let Some(credential) = self.current().await {
            return Ok(credential);
        }
        self.refresh().await
    }

    async fn invalidate(&self) {
        if self.credential.write().await.take().is_some() {
            info!("credential invalidated");
        }
    }

    async fn invalidate_rejected(&self, token: &str) -> bool {
        let mut stored = self.credential.write().await;
        if stored.as_ref().is_some_and(|c| c.token() == token) {
            *stored = None;
            info!("rejected credential invalidated");
            true
        } else {
            debug!("rejected credential already replaced");
            false
        }
    }
}

impl<C: Clock> std::fmt::Debug for CredentialManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("auth", &self.auth)
            .field("exchanges", &self.exchange_count())
            .finish_non_exhaustive()
    }
}
