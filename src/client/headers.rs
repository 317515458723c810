use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tracing::{debug, warn};

static DIGEST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:[.+_-][a-z0-9]+)*:[a-zA-Z0-9=_-]+$").unwrap());

pub const DOCKER_MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";
pub const OCI_MANIFEST_V1: &str = "application/vnd.oci.image.manifest.v1+json";
pub const DOCKER_MANIFEST_V1_SIGNED: &str = "application/vnd.docker.distribution.manifest.v1+prettyjws";

/// `Accept` value for manifest requests.
///
/// Registries only report the digest a manifest can be deleted by when the
/// v2 media type is requested, so it goes first.
pub fn manifest_accept_header() -> String {
    format!("{DOCKER_MANIFEST_V2}, {OCI_MANIFEST_V1};q=0.9, {DOCKER_MANIFEST_V1_SIGNED};q=0.5")
}

#[derive(Debug, PartialEq)]
pub struct RegistryHeaders {
    pub docker_content_digest: Option<String>,
}

impl RegistryHeaders {
    /// Malformed or non-ASCII digests are dropped with a warning rather than
    /// failing the request.
    pub fn from_headers(value: &HeaderMap) -> Self {
        let docker_content_digest = match value.get("docker-content-digest").map(HeaderValue::to_str) {
            None => None,
            Some(Ok(digest)) if Self::is_valid_digest(digest.trim()) => Some(digest.trim().to_string()),
            Some(Ok(digest)) => {
                warn!(digest = digest, "Ignoring malformed docker-content-digest header");
                None
            }
            Some(Err(e)) => {
                warn!("Ignoring unreadable docker-content-digest header: {e}");
                None
            }
        };

        debug!(
            digest = ?docker_content_digest,
            content_type = ?value.get(CONTENT_TYPE),
            "Parsed registry response headers"
        );

        Self { docker_content_digest }
    }

    /// Digests look like `algorithm:hex`, e.g. `sha256:2db2...`.
    pub fn is_valid_digest(value: &str) -> bool {
        DIGEST_RE.is_match(value)
    }
}
