//! HTTP transport.
//!
//! [`ApiClient`] owns the `reqwest::Client`, joins request paths onto the
//! configured origin and hands every response to [`crate::envelope::decode`].

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::envelope::{Decoded, RawResponse, decode};
use crate::error::{ApiError, ApiResult};
use crate::navigator::Navigator;

/// Envelope-aware HTTP client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session_cookie: Option<HeaderValue>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("has_session_cookie", &self.session_cookie.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a client from configuration.
    pub fn new(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> ApiResult<Self> {
        let base_url = config
            .base_url()
            .map_err(|e| ApiError::InvalidConfig(e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;
        Self::with_client(http, base_url, config.session_cookie.as_deref(), navigator)
    }

    /// Build a client around an existing `reqwest::Client`.
    ///
    /// Useful for testing or custom configurations.
    pub fn with_client(
        http: reqwest::Client,
        mut base_url: Url,
        session_cookie: Option<&str>,
        navigator: Arc<dyn Navigator>,
    ) -> ApiResult<Self> {
        // Url::join replaces the last segment unless the base ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let session_cookie = session_cookie
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|_| ApiError::InvalidConfig("session cookie is not a valid header".into()))?;

        Ok(Self {
            http,
            base_url,
            session_cookie,
            navigator,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    fn url(&self, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Send a request and decode the envelope.
    ///
    /// Only requests that get no HTTP response at all return `Err`.
    pub async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<Decoded<Value>>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(%method, path, "sending request");

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(cookie) = &self.session_cookie {
            request = request.header(COOKIE, cookie.clone());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(%method, path, error = %e, "request failed");
            ApiError::Network(e)
        })?;

        let status = response.status();
        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                tracing::warn!(%method, path, error = %e, "failed to read response body");
                Vec::new()
            }
        };
        let raw = RawResponse::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            body,
        );
        tracing::debug!(%method, path, status = raw.status, "response received");

        Ok(decode(&raw, self.navigator.as_ref()))
    }

    /// Send a request and deserialize the decoded payload into `T`.
    pub async fn call<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<Decoded<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        Ok(self.send(method, path, body).await?.parse_payload())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Decoded<T>> {
        self.call::<T, ()>(Method::GET, path, None).await
    }
}
