/*
[INPUT]:  HTTP configuration (base URL, timeouts) and the shared credential store
[OUTPUT]: Parsed JSON responses from the hosted API
[POS]:    HTTP layer - authenticated request pipeline
[UPDATE]: When adding connection options or changing the auth step
*/

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::CredentialStore;
use crate::config::ClientConfig;
use crate::http::headers::security_headers;
use crate::http::{Result, StablepayError};

/// Seconds before expiry at which the access token is refreshed
pub const REFRESH_BUFFER_SECS: i64 = 10;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Client for the hosted order API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: Url,
    credentials: CredentialStore,
}

impl ApiClient {
    /// Create a new client with default configuration
    pub fn new(base_url: &str, credentials: CredentialStore) -> Result<Self> {
        Self::with_config(ClientConfig::default(), base_url, credentials)
    }

    /// Create a new client with custom configuration
    pub fn with_config(
        config: ClientConfig,
        base_url: &str,
        credentials: CredentialStore,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
            credentials,
        })
    }

    /// Credential store this client reads and refreshes
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issue a hosted API call and return the parsed JSON body.
    ///
    /// The body is returned whatever the HTTP status; interpreting it is up
    /// to the caller. With `needs_auth`, a token expiring within
    /// [`REFRESH_BUFFER_SECS`] is refreshed first, and the bearer header
    /// carries whatever access token is stored once that attempt settles.
    pub async fn call(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
        needs_auth: bool,
        content_type: Option<&str>,
    ) -> Result<Value> {
        let mut headers = security_headers();

        if needs_auth {
            self.refresh_if_near_expiry().await;

            match self.credentials.get_jwt() {
                Some(jwt) => {
                    headers.insert(AUTHORIZATION, header_value(&format!("Bearer {jwt}"))?);
                }
                None => debug!(endpoint, "no credentials held, sending without bearer"),
            }
        }

        self.send(endpoint, method, body, headers, content_type).await
    }

    /// Authenticated JSON call
    pub async fn call_json(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value> {
        self.call(endpoint, method, body, true, Some(JSON_CONTENT_TYPE))
            .await
    }

    /// Authenticated JSON call deserialized into `T`
    pub async fn call_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<T> {
        let value = self.call_json(endpoint, method, body).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Best-effort pre-emptive refresh; never fails the guarded call
    async fn refresh_if_near_expiry(&self) {
        let Some(auth) = self.credentials.get_auth() else {
            return;
        };
        let now = Utc::now().timestamp();
        if !auth.is_near_expiry(now, REFRESH_BUFFER_SECS) {
            return;
        }

        debug!(user_id = %auth.user_id, expiry = auth.expiry, now, "access token near expiry, refreshing");
        match self
            .refresh_token(&auth.user_id, &auth.refresh_token, &auth.api_key)
            .await
        {
            Ok(response) => match response.into_token() {
                Some(token) => {
                    self.credentials.set_auth(token);
                    self.credentials.set_is_logged_in(true);
                    info!(user_id = %auth.user_id, "access token refreshed");
                }
                None => {
                    self.credentials.set_is_logged_in(false);
                    warn!(user_id = %auth.user_id, "token refresh rejected");
                }
            },
            Err(err) => {
                self.credentials.set_is_logged_in(false);
                warn!(user_id = %auth.user_id, error = %err, "token refresh failed");
            }
        }
    }

    /// Build and dispatch the request, no auth step
    pub(crate) async fn send(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
        mut headers: HeaderMap,
        content_type: Option<&str>,
    ) -> Result<Value> {
        if let Some(content_type) = content_type {
            headers.insert(CONTENT_TYPE, header_value(content_type)?);
        }

        let url = self.endpoint_url(endpoint)?;
        let mut builder = self.http_client.request(method.clone(), url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(serde_json::to_string(body)?);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(%method, endpoint, status = status.as_u16(), "hosted api response");

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Base URL with the endpoint appended verbatim
    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{endpoint}"))?)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| StablepayError::Config(format!("Invalid header value: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthToken;
    use crate::http::headers::{FRAME_OPTIONS, STRICT_TRANSPORT_SECURITY};
    use serde_json::json;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token(access: &str, refresh: &str, expiry: i64) -> AuthToken {
        AuthToken {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            expiry,
            api_key: "api-key".to_string(),
            user_id: "user-1".to_string(),
        }
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    async fn client_for(server: &MockServer, store: CredentialStore) -> ApiClient {
        ApiClient::new(&server.uri(), store).expect("client init")
    }

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        let client = ApiClient::new("https://api.example.com/stage/", CredentialStore::new())
            .unwrap();
        let url = client.endpoint_url("/v1/cart/tx-status?address=abc").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/stage/v1/cart/tx-status?address=abc"
        );
    }

    #[tokio::test]
    async fn test_fresh_token_skips_refresh() {
        let server = MockServer::start().await;
        let store = CredentialStore::new();
        store.set_auth(token("T1", "R1", now() + 3600));
        store.set_is_logged_in(true);

        Mock::given(method("POST"))
            .and(path("/v1/user/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(0)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/cart/sales-tax"))
            .and(header("authorization", "Bearer T1"))
            .and(header("x-frame-options", FRAME_OPTIONS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rate": 0.07})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, store).await;
        let value = client
            .call_json("/v1/cart/sales-tax?zipcode=94103", Method::GET, None)
            .await
            .unwrap();
        assert_eq!(value["rate"], json!(0.07));
    }

    #[tokio::test]
    async fn test_unauthenticated_call_has_security_headers_only() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/public"))
            .and(header("strict-transport-security", STRICT_TRANSPORT_SECURITY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let store = CredentialStore::new();
        store.set_auth(token("T1", "R1", now() + 3600));
        let client = client_for(&server, store).await;
        client
            .call("/v1/public", Method::GET, None, false, None)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
        assert!(!requests[0].headers.contains_key("content-type"));
    }

    #[tokio::test]
    async fn test_body_is_serialized_json() {
        let server = MockServer::start().await;
        let body = json!({"blockchain": "solana"});

        Mock::given(method("POST"))
            .and(path("/v1/cart/create-tx"))
            .and(header("content-type", "application/json"))
            .and(body_string(serde_json::to_string(&body).unwrap()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let store = CredentialStore::new();
        store.set_auth(token("T1", "R1", now() + 3600));
        let client = client_for(&server, store).await;
        client
            .call_json("/v1/cart/create-tx", Method::POST, Some(&body))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_error_status_still_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/cart/tx-status"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"success": false, "message": "not found"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, CredentialStore::new()).await;
        let value = client
            .call_json("/v1/cart/tx-status?address=x", Method::GET, None)
            .await
            .unwrap();
        assert_eq!(value["success"], json!(false));
    }

    #[tokio::test]
    async fn test_malformed_body_is_serialization_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/broken"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, CredentialStore::new()).await;
        let err = client
            .call_json("/v1/broken", Method::GET, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StablepayError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_network_failure_propagates() {
        let client = ApiClient::new("http://127.0.0.1:9", CredentialStore::new()).unwrap();
        let err = client
            .call_json("/v1/order", Method::GET, None)
            .await
            .unwrap_err();
        assert!(err.is_transport_error());
    }
}
