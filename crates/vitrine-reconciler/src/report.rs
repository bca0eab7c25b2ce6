/// What happened to one reference the desired set dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The URL is not served by the configured asset host.
    SkippedNotHosted,
    /// No identifier could be recovered for the URL.
    SkippedUnresolved { reason: String },
    /// The identifier is still carried by a reference in the desired set.
    SkippedStillReferenced { remote_id: String },
    /// Another reference in the same pass already sent this identifier to
    /// the host.
    SkippedDuplicate { remote_id: String },
    Deleted { remote_id: String },
    Failed { remote_id: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub url: String,
    pub outcome: ItemOutcome,
}

/// Summary of one reconciliation pass.
///
/// The counters always agree with `items`; every removal candidate lands in
/// exactly one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub skipped_not_hosted: usize,
    pub skipped_unresolved: usize,
    pub skipped_still_referenced: usize,
    pub skipped_duplicate: usize,
    pub deleted: usize,
    pub failed: usize,
    pub items: Vec<ItemReport>,
}

impl DeletionReport {
    pub(crate) fn record(&mut self, url: &str, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::SkippedNotHosted => self.skipped_not_hosted += 1,
            ItemOutcome::SkippedUnresolved { .. } => self.skipped_unresolved += 1,
            ItemOutcome::SkippedStillReferenced { .. } => self.skipped_still_referenced += 1,
            ItemOutcome::SkippedDuplicate { .. } => self.skipped_duplicate += 1,
            ItemOutcome::Deleted { .. } => self.deleted += 1,
            ItemOutcome::Failed { .. } => self.failed += 1,
        }
        self.items.push(ItemReport {
            url: url.to_owned(),
            outcome,
        });
    }

    /// Number of delete calls issued against the host.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.deleted + self.failed
    }

    /// Number of references considered for removal.
    #[must_use]
    pub fn considered(&self) -> usize {
        self.items.len()
    }
}
