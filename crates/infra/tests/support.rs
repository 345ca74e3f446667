use std::sync::Arc;
use std::time::Duration;

use erpbridge_common::time::{Clock, MockClock, SystemClock};
use erpbridge_domain::{AuthConfig, ClientConfig, Config, ErpConfig, RateLimitConfig};
use erpbridge_infra::{CredentialManager, ErpApiClient, HttpClient};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT: &str = "contoso";
pub const TOKEN_PATH: &str = "/contoso/oauth2/v2.0/token";
pub const COMPANY_PATH: &str = "/v2.0/contoso/sandbox/api/v2.0/companies(c0ffee)";
pub const ORDER_ID: &str = "5d115c9c-44e3-ea11-bb43-000d3a2feca1";

/// Config pointing both the authority and the API root at `server`.
pub fn test_config(server: &MockServer) -> Config {
    Config {
        erp: ErpConfig {
            base_url: server.uri(),
            environment: "sandbox".into(),
            company_id: "c0ffee".into(),
            api_version: "v2.0".into(),
        },
        auth: AuthConfig {
            tenant_id: TENANT.into(),
            client_id: "client-id".into(),
            client_secret: "client-secret".into(),
            scope: "https://api.businesscentral.dynamics.com/.default".into(),
            authority: server.uri(),
        },
        client: ClientConfig { request_timeout_ms: 2_000, cache_ttl_seconds: 0, metrics_enabled: true },
        rate_limit: RateLimitConfig::default(),
    }
}

pub fn token_body(token: &str, expires_in: u64) -> serde_json::Value {
    json!({ "access_token": token, "token_type": "Bearer", "expires_in": expires_in })
}

/// Token endpoint that always hands out `token`.
pub async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token, 3600)))
        .mount(server)
        .await;
}

/// Token endpoint that hands out each of `tokens` once, in order.
pub async fn mount_token_sequence(server: &MockServer, tokens: &[&str]) {
    for token in tokens {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token, 3600)))
            .up_to_n_times(1)
            .mount(server)
            .await;
    }
}

pub fn credential_manager(config: &Config) -> Arc<CredentialManager<SystemClock>> {
    Arc::new(CredentialManager::new(config.auth.clone(), HttpClient::new().expect("http client")))
}

pub fn credential_manager_with_clock(
    config: &Config,
    clock: MockClock,
) -> Arc<CredentialManager<MockClock>> {
    Arc::new(CredentialManager::with_clock(
        config.auth.clone(),
        HttpClient::new().expect("http client"),
        clock,
    ))
}

/// API client sharing `manager` so tests can count exchanges.
pub fn api_client<C: Clock + 'static>(
    config: Config,
    manager: &Arc<CredentialManager<C>>,
) -> ErpApiClient {
    ErpApiClient::builder()
        .config(config)
        .credentials(manager.clone())
        .build()
        .expect("client should build")
}

pub fn customer_json(number: &str) -> serde_json::Value {
    json!({
        "id": "a1c8f5c2-44e3-ea11-bb43-000d3a2feca1",
        "number": number,
        "displayName": "Adatum Corporation",
        "type": "Company",
        "city": "Atlanta"
    })
}

/// Raw server that sends a 200 with `Content-Length: 100`, writes only the
/// first few bytes of the body and then stalls. Returns its base URL.
pub async fn stalled_body_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stalled server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"val",
                    )
                    .await;
                tokio::time::sleep(Duration::from_secs(10)).await;
            });
        }
    });
    format!("http://{addr}")
}
