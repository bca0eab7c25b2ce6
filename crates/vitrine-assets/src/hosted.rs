//! Classification of stored URLs as "served by our asset host".
//!
//! Deletion is only ever attempted for hosted URLs. Without a configured URL
//! endpoint every URL is classified as foreign, so a misconfigured deployment
//! can never issue deletes against another provider.

/// Domain the asset provider serves files from, independent of account.
pub const PROVIDER_DOMAIN: &str = "ik.imagekit.io";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostMatcher {
    endpoint: Option<String>,
}

impl HostMatcher {
    /// Builds a matcher for the given public URL endpoint. Blank values are
    /// treated as unset; a trailing slash is ignored.
    #[must_use]
    pub fn new(endpoint: Option<&str>) -> Self {
        let endpoint = endpoint
            .map(|e| e.trim().trim_end_matches('/'))
            .filter(|e| !e.is_empty())
            .map(ToOwned::to_owned);
        Self { endpoint }
    }

    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Case-sensitive test: the URL starts with the configured endpoint (at a
    /// path boundary) or mentions the provider domain. Always `false` when no
    /// endpoint is configured.
    #[must_use]
    pub fn is_hosted(&self, url: &str) -> bool {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return false;
        };
        starts_at_boundary(url, endpoint) || url.contains(PROVIDER_DOMAIN)
    }

    /// The remainder of `url` after the configured endpoint, beginning with
    /// `/`. This is the host's file path for URLs the endpoint produced.
    #[must_use]
    pub fn strip_endpoint<'a>(&self, url: &'a str) -> Option<&'a str> {
        let endpoint = self.endpoint.as_deref()?;
        if !starts_at_boundary(url, endpoint) {
            return None;
        }
        url.get(endpoint.len()..)
    }
}

fn starts_at_boundary(url: &str, prefix: &str) -> bool {
    url.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
}
