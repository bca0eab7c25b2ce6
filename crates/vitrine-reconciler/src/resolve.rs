//! URL to remote-identifier resolution.
//!
//! The host's public URLs do not carry the identifier its delete call needs,
//! so references stored without one are resolved by listing the folder the
//! URL points into and matching the listing against the URL. Resolution is
//! read-only against the host.

use std::sync::Arc;

use percent_encoding::percent_decode_str;
use reqwest::Url;
use thiserror::Error;
use vitrine_assets::{AssetHost, AssetRecord, HostMatcher};

/// Page bound used when listing, matching the host's maximum page size.
pub const DEFAULT_LIST_LIMIT: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The input is neither a URL nor a bare file path.
    #[error("invalid asset URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Neither the folder listing nor the account listing matched.
    #[error("no remote asset matches '{url}'")]
    NotFound { url: String },
}

/// The host-side location a URL refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AssetLocation {
    /// Full decoded path, always starting with `/`.
    pub path: String,
    /// Containing folder; `/` for the root.
    pub folder: String,
    /// Final path segment.
    pub leaf: String,
}

pub struct IdentifierResolver {
    host: Arc<dyn AssetHost>,
    matcher: HostMatcher,
    list_limit: u32,
}

impl IdentifierResolver {
    #[must_use]
    pub fn new(host: Arc<dyn AssetHost>, matcher: HostMatcher, list_limit: u32) -> Self {
        Self {
            host,
            matcher,
            list_limit,
        }
    }

    /// Resolves `url` to the host's identifier for the file it serves.
    ///
    /// Listing failures are logged and treated as "no match" for that
    /// listing, so a host outage ends in [`ResolveError::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidUrl`] when no file path can be
    /// extracted from `url`, and [`ResolveError::NotFound`] when no listed
    /// file matches.
    pub async fn resolve(&self, url: &str) -> Result<String, ResolveError> {
        let location = locate(&self.matcher, url)?;

        let scoped = self.list_or_empty(Some(&location.folder)).await;
        if let Some(record) = best_match(&scoped, &location, url) {
            tracing::debug!(url, remote_id = %record.file_id, "resolved in folder listing");
            return Ok(record.file_id.clone());
        }

        let global = self.list_or_empty(None).await;
        if let Some(record) = best_match(&global, &location, url) {
            tracing::debug!(url, remote_id = %record.file_id, "resolved in account listing");
            return Ok(record.file_id.clone());
        }

        Err(ResolveError::NotFound {
            url: url.to_owned(),
        })
    }

    async fn list_or_empty(&self, folder: Option<&str>) -> Vec<AssetRecord> {
        match self.host.list(folder, self.list_limit).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    folder = folder.unwrap_or("<all>"),
                    error = %e,
                    "asset listing failed; treating as no match"
                );
                Vec::new()
            }
        }
    }
}

/// Extracts the host file path from `url` and splits it into folder and leaf.
pub(crate) fn locate(matcher: &HostMatcher, url: &str) -> Result<AssetLocation, ResolveError> {
    let invalid = |reason: &str| ResolveError::InvalidUrl {
        url: url.to_owned(),
        reason: reason.to_owned(),
    };

    let input = url.trim();
    if input.is_empty() {
        return Err(invalid("empty"));
    }

    let raw_path = if let Some(rest) = matcher.strip_endpoint(input) {
        strip_query(rest).to_owned()
    } else if input.contains("://") {
        let parsed = Url::parse(input).map_err(|e| invalid(&e.to_string()))?;
        parsed.path().to_owned()
    } else if is_bare_path(input) {
        strip_query(input).to_owned()
    } else {
        return Err(invalid("not a URL or file path"));
    };

    let decoded = percent_decode_str(&raw_path)
        .decode_utf8()
        .map_err(|_| invalid("path is not valid UTF-8 after decoding"))?;

    let path = if decoded.starts_with('/') {
        decoded.into_owned()
    } else {
        format!("/{decoded}")
    };

    let (folder, leaf) = match path.rfind('/') {
        Some(0) => ("/".to_owned(), path[1..].to_owned()),
        Some(idx) => (path[..idx].to_owned(), path[idx + 1..].to_owned()),
        None => ("/".to_owned(), path.clone()),
    };
    if leaf.is_empty() {
        return Err(invalid("no file name"));
    }

    Ok(AssetLocation { path, folder, leaf })
}

/// Picks a record by the strongest rule any record satisfies:
/// exact file path, then exact URL, then file name, then path suffix.
/// Within a rule the listing order decides.
pub(crate) fn best_match<'r>(
    records: &'r [AssetRecord],
    location: &AssetLocation,
    url: &str,
) -> Option<&'r AssetRecord> {
    let suffix = format!("/{}", location.leaf);
    let rules: [&dyn Fn(&AssetRecord) -> bool; 4] = [
        &|r: &AssetRecord| r.file_path == location.path,
        &|r: &AssetRecord| r.url == url,
        &|r: &AssetRecord| r.name == location.leaf,
        &|r: &AssetRecord| r.file_path.ends_with(&suffix),
    ];

    rules
        .iter()
        .find_map(|rule| records.iter().find(|&record| rule(record)))
}

fn is_bare_path(input: &str) -> bool {
    input.starts_with('/') || !(input.contains(':') || input.contains(char::is_whitespace))
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

#[cfg(test)]
#[path = "resolve_test.rs"]
mod tests;
