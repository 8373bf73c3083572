//! mailhook email provider adapter.
//!
//! Implements the [`relay::RouteProvider`] trait over Mailjet's REST API
//! (`/v3/REST/parseroute`). A parse route tells Mailjet to POST every email
//! received at an address to a webhook URL.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Authentication, URL construction, the response envelope
//! and HTTP status interpretation all live here. The [`relay`] crate sees only
//! [`relay::RouteProvider`] and [`relay::RouteRegistration`].
//!
//! ## Status mapping
//!
//! | Call | Status | Result |
//! |------|--------|--------|
//! | lookup | 200 | first record in `Data`, or `None` if empty |
//! | lookup | 404 | `None` |
//! | create | 2xx | first record in `Data` |
//! | any | other | [`ProviderError::Api`] |

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use relay::{EmailAddress, ProviderError, RouteProvider, RouteRegistration, Secret};

/// Base URL of the Mailjet REST API.
pub const MAILJET_API_BASE_URL: &str = "https://api.mailjet.com/v3/REST/";

const PARSE_ROUTE_RESOURCE: &str = "parseroute";

/// Every Mailjet REST response wraps its records in this envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "Data", default = "Vec::new")]
    data: Vec<T>,
}

/// Mailjet REST client scoped to one API key pair.
///
/// Cheap to clone; the underlying [`reqwest::Client`] is shared.
#[derive(Debug, Clone)]
pub struct MailjetClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: Secret,
}

impl MailjetClient {
    /// Creates a client authenticating with `api_key` / `api_secret`.
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, api_secret: Secret) -> Self {
        Self {
            client,
            base_url: MAILJET_API_BASE_URL.to_string(),
            api_key: api_key.into(),
            api_secret,
        }
    }

    /// Replaces the API base URL (used to target a local test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn resource_url(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ProviderError::Transport {
            message: format!("invalid provider base URL: {e}"),
        })?;
        url.path_segments_mut()
            .map_err(|()| ProviderError::Transport {
                message: "provider base URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(&self.api_key, Some(self.api_secret.expose()))
    }
}

#[async_trait]
impl RouteProvider for MailjetClient {
    async fn lookup_route(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<RouteRegistration>, ProviderError> {
        let url = self.resource_url(&[PARSE_ROUTE_RESOURCE, email.as_str()])?;
        debug!(email = %email, "Looking up parse route");

        let response = self
            .authed(self.client.get(url))
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::OK => {
                let envelope: Envelope<RouteRegistration> = decode(response).await?;
                Ok(envelope.data.into_iter().next())
            }
            _ => Err(api_error(response).await),
        }
    }

    async fn create_route(
        &self,
        email: &EmailAddress,
        url: &str,
    ) -> Result<RouteRegistration, ProviderError> {
        let endpoint = self.resource_url(&[PARSE_ROUTE_RESOURCE])?;
        let payload = RouteRegistration {
            id: None,
            email: email.to_string(),
            url: url.to_string(),
        };
        debug!(email = %email, url = %url, "Creating parse route");

        let response = self
            .authed(self.client.post(endpoint))
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let envelope: Envelope<RouteRegistration> = decode(response).await?;
        envelope
            .data
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn transport_error(e: reqwest::Error) -> ProviderError {
    ProviderError::Transport {
        message: e.to_string(),
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(|e| ProviderError::Decode {
        message: e.to_string(),
    })
}

async fn api_error(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProviderError::Api { status, body }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::{HeaderMap, StatusCode as AxumStatus},
        response::{IntoResponse, Response},
        routing::{get, post},
        Json, Router,
    };

    use super::*;

    // "public:private" in base64.
    const EXPECTED_AUTH: &str = "Basic cHVibGljOnByaXZhdGU=";

    #[derive(Clone, Copy)]
    enum LookupReply {
        Found,
        NotFound,
        EmptyData,
        ServerError,
    }

    #[derive(Clone)]
    struct FakeMailjet {
        lookup: LookupReply,
        create_status: AxumStatus,
        lookups: Arc<Mutex<Vec<(String, Option<String>)>>>,
        creates: Arc<Mutex<Vec<serde_json::Value>>>,
    }

    fn auth_header(headers: &HeaderMap) -> Option<String> {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    async fn lookup(
        State(state): State<FakeMailjet>,
        Path(email): Path<String>,
        headers: HeaderMap,
    ) -> Response {
        state
            .lookups
            .lock()
            .unwrap()
            .push((email.clone(), auth_header(&headers)));
        match state.lookup {
            LookupReply::Found => Json(serde_json::json!({
                "Count": 1,
                "Data": [{
                    "APIKeyID": 1,
                    "Email": email,
                    "ID": 42,
                    "Url": "http://old:3000/webhook"
                }],
                "Total": 1
            }))
            .into_response(),
            LookupReply::EmptyData => {
                Json(serde_json::json!({"Count": 0, "Data": [], "Total": 0})).into_response()
            }
            LookupReply::NotFound => (
                AxumStatus::NOT_FOUND,
                Json(serde_json::json!({"ErrorMessage": "Object not found", "StatusCode": 404})),
            )
                .into_response(),
            LookupReply::ServerError => (AxumStatus::INTERNAL_SERVER_ERROR, "boom").into_response(),
        }
    }

    async fn create(
        State(state): State<FakeMailjet>,
        Json(body): Json<serde_json::Value>,
    ) -> Response {
        state.creates.lock().unwrap().push(body.clone());
        if !state.create_status.is_success() {
            return (state.create_status, "rejected").into_response();
        }
        (
            state.create_status,
            Json(serde_json::json!({
                "Count": 1,
                "Data": [{"ID": 43, "Email": body["Email"], "Url": body["Url"]}],
                "Total": 1
            })),
        )
            .into_response()
    }

    async fn start_fake(
        lookup_reply: LookupReply,
        create_status: AxumStatus,
    ) -> (MailjetClient, FakeMailjet) {
        let state = FakeMailjet {
            lookup: lookup_reply,
            create_status,
            lookups: Arc::new(Mutex::new(Vec::new())),
            creates: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/v3/REST/parseroute/:email", get(lookup))
            .route("/v3/REST/parseroute", post(create))
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = MailjetClient::new(reqwest::Client::new(), "public", Secret::new("private"))
            .with_base_url(format!("http://{addr}/v3/REST/"));
        (client, state)
    }

    fn email() -> EmailAddress {
        EmailAddress::new("inbox@example.com").unwrap()
    }

    #[tokio::test]
    async fn test_lookup_found_returns_first_record() {
        let (client, fake) = start_fake(LookupReply::Found, AxumStatus::CREATED).await;

        let route = client.lookup_route(&email()).await.unwrap().unwrap();

        assert_eq!(route.id, Some(42));
        assert_eq!(route.email, "inbox@example.com");
        assert_eq!(route.url, "http://old:3000/webhook");

        let lookups = fake.lookups.lock().unwrap();
        assert_eq!(lookups.len(), 1);
        assert_eq!(lookups[0].0, "inbox@example.com");
        assert_eq!(lookups[0].1.as_deref(), Some(EXPECTED_AUTH));
    }

    #[tokio::test]
    async fn test_lookup_not_found_is_none() {
        let (client, _fake) = start_fake(LookupReply::NotFound, AxumStatus::CREATED).await;
        assert!(client.lookup_route(&email()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_empty_data_is_none() {
        let (client, _fake) = start_fake(LookupReply::EmptyData, AxumStatus::CREATED).await;
        assert!(client.lookup_route(&email()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_server_error_is_api_error() {
        let (client, _fake) = start_fake(LookupReply::ServerError, AxumStatus::CREATED).await;

        let err = client.lookup_route(&email()).await.unwrap_err();

        assert!(matches!(err, ProviderError::Api { status: 500, ref body } if body == "boom"));
    }

    #[tokio::test]
    async fn test_lookup_unreachable_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = MailjetClient::new(reqwest::Client::new(), "public", Secret::new("private"))
            .with_base_url(format!("http://{addr}/v3/REST/"));

        let err = client.lookup_route(&email()).await.unwrap_err();

        assert!(matches!(err, ProviderError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_create_posts_email_and_url() {
        let (client, fake) = start_fake(LookupReply::NotFound, AxumStatus::CREATED).await;

        let route = client
            .create_route(&email(), "http://relay.example.com:3000/webhook")
            .await
            .unwrap();

        assert_eq!(route.id, Some(43));
        assert_eq!(route.url, "http://relay.example.com:3000/webhook");
        assert_eq!(
            fake.creates.lock().unwrap().as_slice(),
            &[serde_json::json!({
                "Email": "inbox@example.com",
                "Url": "http://relay.example.com:3000/webhook"
            })]
        );
    }

    #[tokio::test]
    async fn test_create_rejected_is_api_error() {
        let (client, _fake) = start_fake(LookupReply::NotFound, AxumStatus::BAD_REQUEST).await;

        let err = client
            .create_route(&email(), "http://relay.example.com:3000/webhook")
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Api { status: 400, .. }));
    }

    #[test]
    fn test_resource_url_joins_segments() {
        let client = MailjetClient::new(reqwest::Client::new(), "k", Secret::new("s"));
        let url = client
            .resource_url(&[PARSE_ROUTE_RESOURCE, "inbox@example.com"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.mailjet.com/v3/REST/parseroute/inbox@example.com"
        );
    }
}
