//! HTTP client for the asset host's REST API.
//!
//! Wraps `reqwest` with the host's authentication scheme (HTTP basic auth,
//! private key as user name, empty password) and maps every failure onto the
//! operation that produced it. Calls are not retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};

use crate::error::AssetError;
use crate::host::AssetHost;
use crate::types::{AssetRecord, UploadOptions, UploadedAsset};

const DEFAULT_API_BASE_URL: &str = "https://api.imagekit.io/v1/";
const DEFAULT_UPLOAD_BASE_URL: &str = "https://upload.imagekit.io/api/v1/";

/// Longest slice of a non-JSON error body carried into an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Client for the asset host.
///
/// Use [`AssetHostClient::new`] for production or
/// [`AssetHostClient::with_base_urls`] to point at a mock server in tests.
pub struct AssetHostClient {
    client: Client,
    private_key: String,
    api_base_url: Url,
    upload_base_url: Url,
}

/// A failed exchange before it is attributed to an operation.
struct Failure {
    status: Option<u16>,
    message: String,
}

impl AssetHostClient {
    /// Creates a client pointed at the production API hosts.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Client`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(private_key: &str, timeout_secs: u64) -> Result<Self, AssetError> {
        Self::with_base_urls(
            private_key,
            timeout_secs,
            DEFAULT_API_BASE_URL,
            DEFAULT_UPLOAD_BASE_URL,
        )
    }

    /// Creates a client with custom base URLs (configuration overrides and
    /// wiremock tests).
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Client`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`AssetError::InvalidBaseUrl`] if either
    /// base URL does not parse.
    pub fn with_base_urls(
        private_key: &str,
        timeout_secs: u64,
        api_base_url: &str,
        upload_base_url: &str,
    ) -> Result<Self, AssetError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("vitrine/0.1 (asset-reconciler)")
            .build()?;

        Ok(Self {
            client,
            private_key: private_key.to_owned(),
            api_base_url: parse_base_url(api_base_url)?,
            upload_base_url: parse_base_url(upload_base_url)?,
        })
    }

    /// `{api_base}/files`, optionally followed by one more encoded segment.
    fn files_url(&self, id: Option<&str>) -> Url {
        let mut url = self.api_base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("files");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    fn upload_url(&self) -> Url {
        let mut url = self.upload_base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("files").push("upload");
        }
        url
    }

    fn list_url(&self, folder: Option<&str>, limit: u32) -> Url {
        let mut url = self.files_url(None);
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(folder) = folder {
                pairs.append_pair("path", folder);
            }
            pairs.append_pair("type", "file");
            pairs.append_pair("limit", &limit.to_string());
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.private_key, Some(""))
    }

    /// Sends the request and returns the body of a 2xx response.
    async fn execute(&self, request: RequestBuilder) -> Result<String, Failure> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| Failure {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Failure {
            status: Some(status.as_u16()),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(Failure {
                status: Some(status.as_u16()),
                message: error_message(&body),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl AssetHost for AssetHostClient {
    /// Uploads a file via multipart form.
    ///
    /// `useUniqueFileName` is always on, so the stored name may differ from
    /// `file_name`; the response carries the final name and path.
    async fn upload(
        &self,
        data: Vec<u8>,
        file_name: &str,
        folder: &str,
        options: &UploadOptions,
    ) -> Result<UploadedAsset, AssetError> {
        let size = data.len();
        let mut form = Form::new()
            .part("file", Part::bytes(data).file_name(file_name.to_owned()))
            .text("fileName", file_name.to_owned())
            .text("folder", folder.to_owned())
            .text("useUniqueFileName", "true");
        if !options.tags.is_empty() {
            form = form.text("tags", options.tags.join(","));
        }

        tracing::debug!(file_name, folder, size, "uploading asset");
        let body = self
            .execute(self.client.post(self.upload_url()).multipart(form))
            .await
            .map_err(|f| AssetError::Upload {
                file_name: file_name.to_owned(),
                status: f.status,
                message: f.message,
            })?;

        serde_json::from_str(&body).map_err(|e| AssetError::Deserialize {
            context: format!("upload({file_name})"),
            source: e,
        })
    }

    async fn list(
        &self,
        folder: Option<&str>,
        limit: u32,
    ) -> Result<Vec<AssetRecord>, AssetError> {
        let scope = folder.map_or_else(|| "all files".to_string(), |f| format!("folder '{f}'"));
        let url = self.list_url(folder, limit);

        tracing::debug!(%url, "listing assets");
        let body = self
            .execute(self.client.get(url))
            .await
            .map_err(|f| AssetError::List {
                scope: scope.clone(),
                status: f.status,
                message: f.message,
            })?;

        serde_json::from_str(&body).map_err(|e| AssetError::Deserialize {
            context: format!("list({scope})"),
            source: e,
        })
    }

    async fn delete(&self, remote_id: &str) -> Result<(), AssetError> {
        tracing::debug!(remote_id, "deleting asset");
        self.execute(self.client.delete(self.files_url(Some(remote_id))))
            .await
            .map(|_| ())
            .map_err(|f| AssetError::Delete {
                remote_id: remote_id.to_owned(),
                status: f.status,
                message: f.message,
            })
    }
}

/// Normalise: ensure the base URL ends with exactly one slash so that
/// segment pushes extend the configured path instead of replacing its last
/// segment.
fn parse_base_url(raw: &str) -> Result<Url, AssetError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| AssetError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })
}

/// Pulls `message` out of the host's JSON error envelope, falling back to a
/// truncated copy of the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(serde_json::Value::as_str)
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "empty response body".to_string()
            } else {
                trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
            }
        })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
