// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Generic JSON/form request helper.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;
use uuid::Uuid;

use crate::config::Endpoints;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Longest response body excerpt kept in an error.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("invalid request path {path}: {reason}")]
    Url { path: String, reason: String },

    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(String),
}

impl HttpError {
    /// HTTP status code, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client for the service API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: Client,
}

impl ApiClient {
    pub fn new(endpoints: &Endpoints) -> Result<Self, HttpError> {
        let mut builder = Client::builder()
            .timeout(endpoints.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

        if let Some(proxy) = &endpoints.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| HttpError::Client(format!("invalid proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;

        Ok(Self {
            base_url: endpoints.base_url.clone(),
            http,
        })
    }

    /// Start a request to `path`, relative to the base URL.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, HttpError> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::Url {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        Ok(self
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string()))
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
    ) -> Result<T, HttpError> {
        let request = with_bearer(self.request(Method::GET, path)?, bearer);
        self.send_json(request).await
    }

    /// POST a JSON body and decode a JSON response.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = with_bearer(self.request(Method::POST, path)?, bearer).json(body);
        self.send_json(request).await
    }

    /// POST a url-encoded form and decode a JSON response.
    pub async fn post_form<B, T>(&self, path: &str, form: &B) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path)?.form(form);
        self.send_json(request).await
    }

    /// Send a request and decode its JSON response body.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, HttpError> {
        let response = self.execute(request).await?;
        let text = response
            .text()
            .await
            .map_err(|e| HttpError::Decode(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| HttpError::Decode(format!("{e} in {}", excerpt(&text))))
    }

    /// Send a request whose response body is ignored.
    pub async fn send_empty(&self, request: RequestBuilder) -> Result<(), HttpError> {
        self.execute(request).await.map(|_| ())
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, HttpError> {
        let request = request
            .build()
            .map_err(|e| HttpError::Request(e.to_string()))?;
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = self.http.execute(request).await.map_err(|e| {
            tracing::warn!(%request_id, %method, %path, error = %e, "Service request failed");
            HttpError::Request(e.to_string())
        })?;

        let status = response.status();
        tracing::debug!(%request_id, %method, %path, status = status.as_u16(), "Service response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }
        Ok(response)
    }
}

fn with_bearer(request: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
    match bearer {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

fn excerpt(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
