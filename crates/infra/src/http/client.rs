use std::time::Duration;

use erpbridge_domain::{ErpError, DEFAULT_REQUEST_TIMEOUT_MS};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client that issues exactly one attempt per call, bounded by a timeout.
///
/// Retrying is the caller's decision; the request pipeline only ever replays
/// a call after a rejected credential.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
    timeout: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, ErpError> {
        Self::builder().build()
    }

    /// Timeout applied to each attempt, body read included.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the request once. Exceeding the timeout yields
    /// [`ErpError::Timeout`]; any other transport failure is `Network`.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ErpError> {
        let request = builder.build().map_err(InfraError::from)?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match tokio::time::timeout(self.timeout, self.client.execute(request)).await {
            Ok(Ok(response)) => {
                debug!(%method, %url, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Ok(Err(err)) if err.is_timeout() => Err(ErpError::Timeout(self.timeout)),
            Ok(Err(err)) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(InfraError::from(err).into())
            }
            Err(_) => Err(ErpError::Timeout(self.timeout)),
        }
    }

    /// Read the full body as text under the same timeout as the request.
    pub async fn text(&self, response: Response) -> Result<String, ErpError> {
        match tokio::time::timeout(self.timeout, response.text()).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(err)) if err.is_timeout() => Err(ErpError::Timeout(self.timeout)),
            Ok(Err(err)) => Err(InfraError::from(err).into()),
            Err(_) => Err(ErpError::Timeout(self.timeout)),
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            user_agent: Some(concat!("erpbridge/", env!("CARGO_PKG_VERSION")).to_string()),
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    /// Per-attempt timeout covering connect, headers and body.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the `User-Agent` header.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Headers sent with every request.
    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Build the client. A zero timeout is a configuration error.
    pub fn build(self) -> Result<HttpClient, ErpError> {
        if self.timeout.is_zero() {
            return Err(ErpError::Config("HTTP timeout must be greater than zero".into()));
        }

        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(InfraError::from)?;

        Ok(HttpClient { client, timeout: self.timeout })
    }
}
