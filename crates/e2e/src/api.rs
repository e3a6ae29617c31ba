//! REST client for the users API
//!
//! Thin layer over reqwest: prefixes the configured API root, adds the
//! configured headers, measures latency and decodes JSON bodies.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use storefront_common::{ApiConfig, Error as CommonError};

use crate::error::{E2eError, E2eResult};

/// A received response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,

    /// From sending the request to having read the whole body
    pub duration: Duration,

    /// JSON body; `Null` when empty, a string when not JSON
    pub body: Value,
}

impl ApiResponse {
    /// Decode the body into a typed value
    pub fn json<T: DeserializeOwned>(&self) -> E2eResult<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

/// Client bound to one API root
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, timeout: Duration) -> E2eResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                CommonError::InvalidConfig(format!("header name {:?}: {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                CommonError::InvalidConfig(format!("header value for {}: {}", name, e))
            })?;
            headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET, failing on non-2xx status
    pub async fn get(&self, path: &str) -> E2eResult<ApiResponse> {
        self.request::<()>(Method::GET, path, None, true).await
    }

    /// POST a JSON body, failing on non-2xx status
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> E2eResult<ApiResponse> {
        self.request(Method::POST, path, Some(body), true).await
    }

    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        fail_on_status: bool,
    ) -> E2eResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let start = Instant::now();
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let duration = start.elapsed();

        debug!("{} {} -> {} in {} ms", method, url, status, duration.as_millis());

        if fail_on_status && !status.is_success() {
            return Err(E2eError::UnexpectedStatus {
                method: method.to_string(),
                url,
                status: status.as_u16(),
            });
        }

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            duration,
            body,
        })
    }
}
