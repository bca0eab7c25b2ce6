use serde::{Deserialize, Serialize};

/// One uploaded image as recorded on its owning entity.
///
/// `remote_id` is the asset host's opaque file identifier. References written
/// before identifiers were persisted alongside the URL carry `None` and have
/// to be resolved from the URL before they can be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReference {
    pub url: String,
    #[serde(
        rename = "remoteId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub remote_id: Option<String>,
    #[serde(default)]
    pub path: String,
}

impl AssetReference {
    #[must_use]
    pub fn new(url: impl Into<String>, remote_id: Option<String>, path: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            remote_id,
            path: path.into(),
        }
    }

    /// A reference persisted with only its public URL (legacy rows).
    #[must_use]
    pub fn legacy(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            remote_id: None,
            path: String::new(),
        }
    }
}

/// Ordered list of images an entity currently claims to display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoSet(pub Vec<AssetReference>);

impl PhotoSet {
    #[must_use]
    pub fn new(items: Vec<AssetReference>) -> Self {
        Self(items)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssetReference> {
        self.0.iter()
    }
}

impl From<Vec<AssetReference>> for PhotoSet {
    fn from(items: Vec<AssetReference>) -> Self {
        Self(items)
    }
}

impl<'a> IntoIterator for &'a PhotoSet {
    type Item = &'a AssetReference;
    type IntoIter = std::slice::Iter<'a, AssetReference>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The kind of entity a photo set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    Product,
    Logo,
}

impl std::fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerKind::Product => write!(f, "product"),
            OwnerKind::Logo => write!(f, "logo"),
        }
    }
}
