use std::collections::HashMap;

use color_eyre::eyre::Result;
use tracing::{debug, error, info, warn};

use crate::client::Registry;
use crate::core::select_tags::StaleTags;

#[derive(Debug, Default, PartialEq)]
pub struct DeletionSummary {
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
    pub skipped: Vec<String>,
    /// Tags a dry-run would have deleted.
    pub would_delete: Vec<String>,
}

/// Output the full selection before anything is deleted.
pub fn report_stale_tags(stale_tags: &StaleTags) {
    if stale_tags.is_empty() {
        info!("No tags are old enough to be deleted");
        return;
    }
    info!(
        "Selected {} tag(s) for deletion: {:?}",
        stale_tags.len(),
        stale_tags.names()
    );
}

/// Delete the manifest behind each stale tag, one at a time.
///
/// Registries delete manifests by digest, not by tag, so tags whose
/// manifest came back without a `docker-content-digest` are skipped.
/// Deleting a manifest removes every tag pointing at it, so each digest
/// is only deleted once per repository.
pub async fn delete_stale_tags<R: Registry + ?Sized>(
    registry: &R,
    stale_tags: &StaleTags,
    dry_run: bool,
) -> Result<DeletionSummary> {
    let mut summary = DeletionSummary::default();
    // (repository, digest) -> the tag whose deletion removed the manifest
    let mut deleted_manifests: HashMap<(&str, &str), String> = HashMap::new();

    for stale_tag in stale_tags {
        let name = stale_tag.to_string();

        let Some(digest) = &stale_tag.digest else {
            warn!(
                repository = %stale_tag.repository,
                tag = %stale_tag.tag,
                "The registry didn't return a docker-content-digest for {name}, so it can't be deleted"
            );
            summary.skipped.push(name);
            continue;
        };

        if let Some(first) = deleted_manifests.get(&(stale_tag.repository.as_str(), digest.as_str())) {
            debug!(digest = digest, "{name} was removed along with {first}, since they share a manifest");
            summary.deleted.push(name);
            continue;
        }

        if dry_run {
            info!(digest = digest, "dry-run: Would have deleted {name}");
            summary.would_delete.push(name);
            continue;
        }

        info!(digest = digest, "Deleting {name}");
        let response = registry.delete_manifest(&stale_tag.repository, digest).await?;
        info!(
            status = %response.status,
            headers = ?response.headers,
            body = %response.body,
            "Registry responded to the deletion of {name}"
        );

        if response.status.is_success() {
            info!(digest = digest, "Deleted {name}");
            deleted_manifests.insert((stale_tag.repository.as_str(), digest.as_str()), name.clone());
            summary.deleted.push(name);
        } else {
            error!(
                "Failed to delete {name} with status {}: {}",
                response.status, response.body
            );
            summary.failed.push(name);
        }
    }

    Ok(summary)
}

/// Log the outcome of a sweep.
pub fn log_summary(summary: &DeletionSummary, dry_run: bool) {
    if dry_run {
        info!(
            "dry-run: Would have deleted {} tag(s) and skipped {}",
            summary.would_delete.len(),
            summary.skipped.len()
        );
        return;
    }

    info!(
        "Deleted {} tag(s), failed to delete {} and skipped {}",
        summary.deleted.len(),
        summary.failed.len(),
        summary.skipped.len()
    );
    if !summary.failed.is_empty() {
        warn!("Failed to delete: {}", summary.failed.join(", "));
    }
    if !summary.deleted.is_empty() {
        info!("Blobs referenced only by deleted manifests stay on disk until the registry's garbage collection runs");
    }
}
