use crate::models::{ChangelogEntry, NewEntryRequest, NewTagRequest, Tag};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend answered {status}")]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
}

impl BackendError {
    /// The backend's own `detail` message, when it sent a plain string.
    pub fn detail(&self) -> Option<&str> {
        match self {
            BackendError::Status { detail, .. } => detail.as_deref(),
            BackendError::Http(_) => None,
        }
    }

    /// The backend refused the token itself rather than the request.
    pub fn is_rejected_token(&self) -> bool {
        matches!(
            self,
            BackendError::Status { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }
}

// Unreserved characters (RFC 3986) stay as they are.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Encodes an id for use as one URL path segment.
pub fn path_segment(id: &str) -> String {
    utf8_percent_encode(id, PATH_SEGMENT).to_string()
}

/// REST client for the changelog backend. Every call carries the session's
/// bearer token.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// `GET /api/changelog/`, optionally bounded by `limit`.
    pub async fn list_entries(
        &self,
        token: &str,
        limit: Option<u32>,
    ) -> Result<Vec<ChangelogEntry>, BackendError> {
        let mut request = self.get(token, "/api/changelog/");
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        decode(send(request).await?).await
    }

    pub async fn week_entries(
        &self,
        token: &str,
        week: u32,
    ) -> Result<Vec<ChangelogEntry>, BackendError> {
        let request = self.get(token, &format!("/api/changelog/week/{week}"));
        decode(send(request).await?).await
    }

    pub async fn create_entry(
        &self,
        token: &str,
        entry: &NewEntryRequest,
    ) -> Result<ChangelogEntry, BackendError> {
        let request = self
            .client
            .post(self.url("/api/changelog/"))
            .bearer_auth(token)
            .json(entry);
        decode(send(request).await?).await
    }

    pub async fn list_tags(&self, token: &str) -> Result<Vec<Tag>, BackendError> {
        decode(send(self.get(token, "/api/tags/")).await?).await
    }

    pub async fn create_tag(&self, token: &str, name: &str) -> Result<Tag, BackendError> {
        let request = self
            .client
            .post(self.url("/api/tags/"))
            .bearer_auth(token)
            .json(&NewTagRequest { name });
        decode(send(request).await?).await
    }

    pub async fn delete_tag(&self, token: &str, id: &str) -> Result<(), BackendError> {
        let request = self
            .client
            .delete(self.url(&format!("/api/tags/{}", path_segment(id))))
            .bearer_auth(token);
        send(request).await?;
        Ok(())
    }

    fn get(&self, token: &str, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn send(request: RequestBuilder) -> Result<Response, BackendError> {
    let response = request.send().await?;
    let status = response.status();
    debug!(url = %response.url(), %status, "backend response");
    if status.is_success() {
        return Ok(response);
    }

    let detail = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("detail").and_then(Value::as_str).map(str::to_string));
    warn!(%status, detail = detail.as_deref().unwrap_or(""), "backend request failed");
    Err(BackendError::Status { status, detail })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    Ok(response.json::<T>().await?)
}
