//! Conversions from external infrastructure errors into domain errors.

use erpbridge_domain::ErpError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ErpError);

impl From<InfraError> for ErpError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ErpError> for InfraError {
    fn from(value: ErpError) -> Self {
        InfraError(value)
    }
}

trait IntoErpError {
    fn into_erp(self) -> ErpError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ErpError */
/* -------------------------------------------------------------------------- */

impl IntoErpError for HttpError {
    fn into_erp(self) -> ErpError {
        // Timeouts are detected by `HttpClient`, which knows the configured
        // limit; one slipping through here is still a transport failure.
        if self.is_timeout() {
            return ErpError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ErpError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_decode() {
            return ErpError::Validation(format!("failed to decode response body: {self}"));
        }

        if self.is_builder() {
            return ErpError::Internal(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            return ErpError::Api {
                status: status.as_u16(),
                body: status.canonical_reason().unwrap_or("unknown status").to_string(),
            };
        }

        ErpError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_erp())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn http_status_error_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::NOT_FOUND))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: ErpError = InfraError::from(error).into();
        assert_eq!(mapped, ErpError::Api { status: 404, body: "Not Found".into() });
    }

    #[tokio::test]
    async fn connection_refused_maps_to_network_error() {
        // Bind then drop a listener so the port is known to be closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let mapped: ErpError = InfraError::from(error).into();
        assert!(matches!(mapped, ErpError::Network(_)), "got {mapped:?}");
    }

    #[tokio::test]
    async fn undecodable_json_maps_to_validation_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client
            .get(server.uri())
            .send()
            .await
            .unwrap()
            .json::<serde_json::Value>()
            .await
            .unwrap_err();

        let mapped: ErpError = InfraError::from(error).into();
        assert!(matches!(mapped, ErpError::Validation(_)), "got {mapped:?}");
    }
}
