use thiserror::Error;

/// Errors returned by the asset host client.
///
/// Every remote operation has its own variant so callers can tell which
/// step failed; `status` is the HTTP status when the host answered at all.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The underlying `reqwest::Client` could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// A configured base URL does not parse.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("upload of '{file_name}' failed{}: {message}", fmt_status(.status))]
    Upload {
        file_name: String,
        status: Option<u16>,
        message: String,
    },

    #[error("listing {scope} failed{}: {message}", fmt_status(.status))]
    List {
        scope: String,
        status: Option<u16>,
        message: String,
    },

    #[error("delete of '{remote_id}' failed{}: {message}", fmt_status(.status))]
    Delete {
        remote_id: String,
        status: Option<u16>,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl AssetError {
    /// `true` when the host reported the target as unknown (HTTP 404).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AssetError::Upload { status: Some(404), .. }
                | AssetError::List { status: Some(404), .. }
                | AssetError::Delete { status: Some(404), .. }
        )
    }
}

#[allow(clippy::ref_option)]
fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}
