use std::fmt;
use std::time::Duration;

use chrono::{NaiveDateTime, TimeDelta};
use color_eyre::eyre::{eyre, Result};
use indicatif::ProgressStyle;
use tracing::{debug, info, info_span, trace, warn, Instrument, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::client::models::ManifestResponse;
use crate::client::Registry;
use crate::matchers::Matchers;

/// Format of the first 19 characters of an image config's `created` field.
pub const CREATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub cut_off: Duration,
    pub repository_matchers: Matchers,
    pub tag_matchers: Matchers,
}

impl SweepConfig {
    pub fn new(cut_off: Duration) -> Self {
        Self {
            cut_off,
            repository_matchers: Matchers::from(&[]),
            tag_matchers: Matchers::from(&[]),
        }
    }
}

/// A tag old enough to be deleted, with the digest of the manifest it points to.
#[derive(Debug, Clone, PartialEq)]
pub struct StaleTag {
    pub repository: String,
    pub tag: String,
    pub digest: Option<String>,
}

impl fmt::Display for StaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

/// Stale tags in the order they were found, with no `repository:tag` twice.
#[derive(Debug, Default, PartialEq)]
pub struct StaleTags {
    tags: Vec<StaleTag>,
}

impl StaleTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false, and keeps the existing entry, if the tag is already present.
    pub fn insert(&mut self, stale_tag: StaleTag) -> bool {
        if self.contains(&stale_tag.repository, &stale_tag.tag) {
            return false;
        }
        self.tags.push(stale_tag);
        true
    }

    pub fn contains(&self, repository: &str, tag: &str) -> bool {
        self.tags.iter().any(|t| t.repository == repository && t.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StaleTag> {
        self.tags.iter()
    }

    /// `repository:tag` names, in order.
    pub fn names(&self) -> Vec<String> {
        self.tags.iter().map(StaleTag::to_string).collect()
    }
}

impl<'a> IntoIterator for &'a StaleTags {
    type Item = &'a StaleTag;
    type IntoIter = std::slice::Iter<'a, StaleTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

/// Parse an image config `created` value as a naive timestamp.
///
/// Only the first 19 characters are used, so fractional seconds and
/// timezone offsets are dropped.
pub fn parse_created(created: &str) -> Result<NaiveDateTime> {
    let truncated = created.get(..19).unwrap_or(created);
    NaiveDateTime::parse_from_str(truncated, CREATED_FORMAT)
        .map_err(|e| eyre!("Failed to parse creation timestamp \"{created}\": {e}"))
}

pub fn cut_off_time(now: NaiveDateTime, cut_off: Duration) -> Result<NaiveDateTime> {
    let cut_off = TimeDelta::from_std(cut_off)?;
    now.checked_sub_signed(cut_off)
        .ok_or_else(|| eyre!("The cut-off {cut_off} reaches further back than timestamps can represent"))
}

/// Tags created exactly at the cut-off are kept.
fn older_than_cutoff(created: NaiveDateTime, cut_off_time: NaiveDateTime) -> bool {
    if created < cut_off_time {
        true
    } else {
        trace!(
            cut_off = cut_off_time.to_string(),
            "Skipping tag, since it's newer than the cut-off"
        );
        false
    }
}

/// Work out when a tag's image was created.
///
/// Legacy schema version 1 manifests don't reference a config blob, so
/// there is nothing to read a timestamp from. Those return `None`.
async fn resolve_created<R: Registry + ?Sized>(
    registry: &R,
    repository: &str,
    tag: &str,
    response: &ManifestResponse,
) -> Result<Option<NaiveDateTime>> {
    let manifest = &response.manifest;
    if manifest.is_legacy() {
        warn!(
            repository = repository,
            tag = tag,
            layers = manifest.layer_digests().len(),
            "v1? {repository} {tag}: skipping schema version {} manifest, since it has no creation timestamp",
            manifest.schema_version
        );
        return Ok(None);
    }

    let config = manifest
        .config
        .as_ref()
        .ok_or_else(|| eyre!("The schema version 2 manifest for {repository}:{tag} has no config"))?;
    let image_config = registry.fetch_image_config(repository, &config.digest).await?;
    Ok(Some(parse_created(&image_config.created)?))
}

async fn scan_repository<R: Registry + ?Sized>(
    registry: &R,
    config: &SweepConfig,
    repository: &str,
    cut_off_time: NaiveDateTime,
    stale_tags: &mut StaleTags,
) -> Result<()> {
    let tags = registry.list_tags(repository).await?;
    debug!("Found {} tags", tags.len());

    for (i, tag) in tags.iter().enumerate() {
        Span::current().pb_set_message(&format!(
            "checked \x1b[33m{}\x1b[0m/\x1b[33m{}\x1b[0m tags",
            i,
            tags.len()
        ));

        if !config.tag_matchers.includes(tag) {
            debug!(tag = tag, "Skipping tag, since it didn't match the `tags` filters");
            continue;
        }

        let response = registry.fetch_manifest(repository, tag).await?;
        let Some(created) = resolve_created(registry, repository, tag, &response).await? else {
            continue;
        };

        if !older_than_cutoff(created, cut_off_time) {
            continue;
        }

        let stale_tag = StaleTag {
            repository: repository.to_string(),
            tag: tag.to_string(),
            digest: response.digest,
        };
        debug!(created = %created, "Selected {stale_tag} for deletion");
        if !stale_tags.insert(stale_tag) {
            trace!(tag = tag, "Tag was already selected");
        }
    }
    Ok(())
}

/// Walk every repository and tag in the registry, and collect the tags
/// whose image was created before `now - cut_off`.
pub async fn select_stale_tags<R: Registry + ?Sized>(
    registry: &R,
    config: &SweepConfig,
    now: NaiveDateTime,
) -> Result<StaleTags> {
    let cut_off_time = cut_off_time(now, config.cut_off)?;
    info!(cut_off = %cut_off_time, "Selecting tags created before the cut-off");

    let repositories = registry.list_repositories().await?;
    let mut stale_tags = StaleTags::new();

    for repository in &repositories {
        if !config.repository_matchers.includes(repository) {
            debug!(
                repository = repository,
                "Skipping repository, since it didn't match the `repositories` filters"
            );
            continue;
        }

        let span = info_span!("scan repository", repository = %repository);
        span.pb_set_style(
            &ProgressStyle::default_spinner().template(&format!("{{spinner}} \x1b[34m{repository}\x1b[0m: {{msg}}"))?,
        );
        scan_repository(registry, config, repository, cut_off_time, &mut stale_tags)
            .instrument(span)
            .await?;
    }

    info!(
        "{} tag(s) across {} repositories are older than the cut-off",
        stale_tags.len(),
        repositories.len()
    );
    Ok(stale_tags)
}
