//! Reqwest client shared by every backend adapter.
//!
//! Owns transport details only: endpoint construction under the configured
//! base path, bearer authorization, status mapping, and JSON decoding.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::domain::AuthToken;
use crate::domain::ports::GatewayError;

/// Errors raised while constructing an [`ApiClient`].
#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    /// The base URL cannot carry path segments (for example `mailto:`).
    #[error("base URL `{url}` cannot be used for HTTP endpoints")]
    UnusableBaseUrl {
        /// Rejected URL.
        url: String,
    },
    /// reqwest refused to build a client.
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// HTTP adapter for the household backend.
///
/// Implements the authentication, house, and ledger ports. Cloning is cheap
/// and shares the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client rooted at `base_url`, e.g. `http://localhost:5042/api`.
    ///
    /// Without a timeout, requests wait until the transport gives up.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::UnusableBaseUrl`] for URLs without a path,
    /// or [`ApiClientError::Build`] when reqwest cannot be initialised.
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, ApiClientError> {
        if base_url.cannot_be_a_base() {
            return Err(ApiClientError::UnusableBaseUrl {
                url: base_url.to_string(),
            });
        }
        let builder = timeout.into_iter().fold(Client::builder(), |builder, limit| {
            builder.timeout(limit)
        });
        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    /// Base URL every endpoint is resolved under.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(super) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(super) fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.client
            .request(method, self.endpoint(segments))
            .header(ACCEPT, "application/json")
    }

    pub(super) fn authorized(
        &self,
        method: Method,
        token: &AuthToken,
        segments: &[&str],
    ) -> RequestBuilder {
        self.request(method, segments).bearer_auth(token.expose())
    }

    /// Send `request` and return the body of a success response.
    pub(super) async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>, GatewayError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }

    /// Send `request` and decode a JSON success body.
    pub(super) async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, GatewayError> {
        let body = self.execute(request).await?;
        decode(&body, what)
    }
}

pub(super) fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, GatewayError> {
    serde_json::from_slice(body)
        .map_err(|error| GatewayError::decode(format!("invalid {what} payload: {error}")))
}

pub(super) fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::timeout(error.to_string())
    } else {
        GatewayError::transport(error.to_string())
    }
}

pub(super) fn map_status_error(status: StatusCode, body: &[u8]) -> GatewayError {
    let preview = body_preview(body);
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GatewayError::timeout(format!("status {}", status.as_u16()))
        }
        _ if preview.is_empty() => GatewayError::status(
            status.as_u16(),
            status.canonical_reason().unwrap_or("no reason"),
        ),
        _ => GatewayError::status(status.as_u16(), preview),
    }
}

pub(super) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
