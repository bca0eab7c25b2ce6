//! Asset host API types.
//!
//! Field names follow the host's camelCase JSON. Optional dimensions and mime
//! type are absent for non-image files.

use serde::{Deserialize, Serialize};
use vitrine_core::AssetReference;

/// One file as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub file_id: String,
    pub name: String,
    /// Path relative to the account root, e.g. `/products/42/p1.jpg`.
    pub file_path: String,
    pub url: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default, rename = "mime")]
    pub mime_type: Option<String>,
    /// The host sends `null` rather than `[]` for untagged files.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// The upload endpoint's response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAsset {
    pub file_id: String,
    pub name: String,
    pub url: String,
    pub file_path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default, alias = "mime")]
    pub mime_type: Option<String>,
}

impl UploadedAsset {
    /// The reference to persist on the owning entity. The identifier is kept
    /// next to the URL so later deletions never need to resolve it.
    #[must_use]
    pub fn to_reference(&self) -> AssetReference {
        AssetReference::new(
            self.url.clone(),
            Some(self.file_id.clone()),
            self.file_path.clone(),
        )
    }
}

/// Per-upload options.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Free-form tags attached to the file on the host.
    pub tags: Vec<String>,
}

impl UploadOptions {
    #[must_use]
    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}
