//! Typed access to the Planboard REST API.
//!
//! [`ApiClient`] is the only place that sends HTTP requests; every
//! per-resource module below is a set of thin functions over it, so all of
//! them inherit the gateway's credential, tenant and 401 handling.

pub mod boards;
pub mod issues;
pub mod pages;
pub mod search;
pub mod sprints;
pub mod tenants;
pub mod users;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiSettings;
use crate::errors::{GatewayError, GatewayResult};
use crate::gateway::{AuthAttempt, Gateway};

/// HTTP client whose requests all pass through the [`Gateway`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    gateway: Gateway,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings, gateway: Gateway) -> GatewayResult<Self> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            gateway,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Absolute URL for an API path such as `/issues/42`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Send a request through the gateway.
    ///
    /// Transport errors come back as [`GatewayError::Transport`]; a 401 as
    /// [`GatewayError::Unauthorized`]. Any other status, success or not, is
    /// returned as a response for the caller to interpret.
    pub async fn send(&self, request: RequestBuilder) -> GatewayResult<Response> {
        let mut attempt = AuthAttempt::new();
        let request = self.gateway.build_request(request).await?;
        let response = request.send().await?;
        debug!(status = %response.status(), url = %response.url(), "Response received");
        self.gateway.on_response(response, &mut attempt).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let response = self.send(self.request(Method::GET, path)).await?;
        decode(response).await
    }

    pub async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> GatewayResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(Method::GET, path).query(query))
            .await?;
        decode(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> GatewayResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::POST, path).json(body)).await?;
        decode(response).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> GatewayResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::PUT, path).json(body)).await?;
        decode(response).await
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> GatewayResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::PATCH, path).json(body))
            .await?;
        decode(response).await
    }

    pub async fn delete(&self, path: &str) -> GatewayResult<()> {
        let response = self.send(self.request(Method::DELETE, path)).await?;
        check_status(response).await.map(|_| ())
    }
}

/// Turn a non-success response into the matching error.
pub async fn check_status(response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::FORBIDDEN => GatewayError::Forbidden { url, body },
        StatusCode::NOT_FOUND => GatewayError::NotFound { url },
        _ => GatewayError::Http { status, body },
    })
}

/// Percent-encode a user-supplied id so it stays one path segment.
///
/// `.` and `..` are refused since URL normalisation would resolve them
/// against the surrounding path.
pub fn segment(value: &str) -> GatewayResult<String> {
    if value.is_empty() || value == "." || value == ".." {
        return Err(GatewayError::InvalidPathSegment(value.to_string()));
    }
    Ok(urlencoding::encode(value).into_owned())
}

async fn decode<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
    let response = check_status(response).await?;
    Ok(response.json::<T>().await?)
}
