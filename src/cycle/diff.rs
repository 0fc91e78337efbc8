//! New-release detection

use std::collections::HashSet;

use crate::release::Release;

/// Selects the releases in `fetched` whose version has not been seen before.
///
/// The version string is the whole key; timestamps and URLs never influence
/// membership, hosts edit those in place. Duplicate versions within one
/// fetched batch keep their first occurrence. The result is ordered for
/// notification: ascending publication time when every new release carries
/// one, the host's fetch order otherwise.
pub fn new_releases(fetched: &[Release], seen: &HashSet<String>) -> Vec<Release> {
    let mut batch: HashSet<&str> = HashSet::new();
    let mut new: Vec<Release> = Vec::new();

    for release in fetched {
        if seen.contains(&release.version) {
            continue;
        }
        if batch.insert(release.version.as_str()) {
            new.push(release.clone());
        }
    }

    if !new.is_empty() && new.iter().all(|r| r.published_at.is_some()) {
        // Stable sort: equal timestamps keep fetch order
        new.sort_by_key(|r| r.published_at);
    }

    new
}
