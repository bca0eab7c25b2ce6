use std::collections::HashSet;
use std::sync::Arc;

use vitrine_assets::{AssetHost, HostMatcher};
use vitrine_core::{AssetReference, PhotoSet};

use crate::report::{DeletionReport, ItemOutcome};
use crate::resolve::IdentifierResolver;

/// Deletes hosted assets that a photo set stopped referencing.
///
/// Deletes are issued one at a time, at most once per identifier in a pass,
/// and a failure never stops the pass. The caller persists the desired set on
/// its own; nothing here depends on the database write and nothing here gates
/// it.
pub struct Reconciler {
    host: Arc<dyn AssetHost>,
    matcher: HostMatcher,
    resolver: IdentifierResolver,
}

/// Identifiers the desired set still displays.
///
/// Stored identifiers are known up front. Hosted references without one are
/// resolved the first time a removal candidate needs the comparison.
struct KeptIds<'a> {
    ids: HashSet<String>,
    pending: Vec<&'a AssetReference>,
}

impl<'a> KeptIds<'a> {
    fn new(desired: &'a PhotoSet, matcher: &HostMatcher) -> Self {
        let mut ids = HashSet::new();
        let mut pending = Vec::new();
        for asset in desired {
            match &asset.remote_id {
                Some(id) => {
                    ids.insert(id.clone());
                }
                None if matcher.is_hosted(&asset.url) => pending.push(asset),
                None => {}
            }
        }
        Self { ids, pending }
    }

    async fn contains(&mut self, resolver: &IdentifierResolver, remote_id: &str) -> bool {
        if self.ids.contains(remote_id) {
            return true;
        }
        for asset in std::mem::take(&mut self.pending) {
            match resolver.resolve(&asset.url).await {
                Ok(id) => {
                    self.ids.insert(id);
                }
                Err(e) => {
                    tracing::debug!(url = %asset.url, error = %e, "kept reference did not resolve");
                }
            }
        }
        self.ids.contains(remote_id)
    }
}

impl Reconciler {
    #[must_use]
    pub fn new(host: Arc<dyn AssetHost>, matcher: HostMatcher, list_limit: u32) -> Self {
        let resolver = IdentifierResolver::new(Arc::clone(&host), matcher.clone(), list_limit);
        Self {
            host,
            matcher,
            resolver,
        }
    }

    pub async fn reconcile(&self, current: &PhotoSet, desired: &PhotoSet) -> DeletionReport {
        let candidates = removals(current, desired);
        let mut kept = KeptIds::new(desired, &self.matcher);
        let mut issued: HashSet<String> = HashSet::new();

        let mut report = DeletionReport::default();
        for asset in candidates {
            let outcome = self.remove_one(asset, &mut kept, &mut issued).await;
            report.record(&asset.url, outcome);
        }

        if report.considered() > 0 {
            tracing::info!(
                considered = report.considered(),
                deleted = report.deleted,
                failed = report.failed,
                skipped_not_hosted = report.skipped_not_hosted,
                skipped_unresolved = report.skipped_unresolved,
                skipped_still_referenced = report.skipped_still_referenced,
                skipped_duplicate = report.skipped_duplicate,
                "reconciliation finished"
            );
        }
        report
    }

    async fn remove_one(
        &self,
        asset: &AssetReference,
        kept: &mut KeptIds<'_>,
        issued: &mut HashSet<String>,
    ) -> ItemOutcome {
        let url = asset.url.as_str();
        if !self.matcher.is_hosted(url) {
            tracing::debug!(url, "not hosted by the asset host; leaving it alone");
            return ItemOutcome::SkippedNotHosted;
        }

        let remote_id = match &asset.remote_id {
            Some(id) => id.clone(),
            None => match self.resolver.resolve(url).await {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!(url, error = %e, "could not resolve remote identifier; skipping");
                    return ItemOutcome::SkippedUnresolved {
                        reason: e.to_string(),
                    };
                }
            },
        };

        if kept.contains(&self.resolver, &remote_id).await {
            tracing::warn!(url, %remote_id, "identifier still referenced by the desired set; skipping");
            return ItemOutcome::SkippedStillReferenced { remote_id };
        }

        if !issued.insert(remote_id.clone()) {
            tracing::debug!(url, %remote_id, "identifier already handled in this pass");
            return ItemOutcome::SkippedDuplicate { remote_id };
        }

        match self.host.delete(&remote_id).await {
            Ok(()) => {
                tracing::debug!(url, %remote_id, "deleted remote asset");
                ItemOutcome::Deleted { remote_id }
            }
            Err(e) => {
                tracing::warn!(url, %remote_id, error = %e, "remote delete failed");
                ItemOutcome::Failed {
                    remote_id,
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// References in `current` whose URL does not appear in `desired`, first
/// occurrence per URL, in `current` order.
#[must_use]
pub fn removals<'a>(current: &'a PhotoSet, desired: &PhotoSet) -> Vec<&'a AssetReference> {
    let wanted: HashSet<&str> = desired.iter().map(|a| a.url.as_str()).collect();
    let mut seen = HashSet::new();
    current
        .iter()
        .filter(|asset| !wanted.contains(asset.url.as_str()))
        .filter(|asset| seen.insert(asset.url.as_str()))
        .collect()
}
