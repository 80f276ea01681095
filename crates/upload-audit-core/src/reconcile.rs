use std::collections::BTreeSet;

/// Outcome of comparing referenced keys with filesystem keys.
///
/// `missing` and `orphans` are sorted, so unchanged inputs always produce the
/// same result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub referenced_count: usize,
    pub filesystem_count: usize,
    pub matched_count: usize,
    /// Referenced but not on disk.
    pub missing: Vec<String>,
    /// On disk but never referenced.
    pub orphans: Vec<String>,
}

impl ReconciliationResult {
    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }

    pub fn orphan_count(&self) -> usize {
        self.orphans.len()
    }

    /// The first `limit` orphans and whether the list was cut short.
    pub fn orphan_preview(&self, limit: usize) -> (&[String], bool) {
        let end = limit.min(self.orphans.len());
        (&self.orphans[..end], self.orphans.len() > limit)
    }
}

pub fn reconcile(
    referenced: &BTreeSet<String>,
    filesystem: &BTreeSet<String>,
) -> ReconciliationResult {
    let missing: Vec<String> = referenced.difference(filesystem).cloned().collect();
    let orphans: Vec<String> = filesystem.difference(referenced).cloned().collect();
    let matched_count = referenced.intersection(filesystem).count();

    ReconciliationResult {
        referenced_count: referenced.len(),
        filesystem_count: filesystem.len(),
        matched_count,
        missing,
        orphans,
    }
}
