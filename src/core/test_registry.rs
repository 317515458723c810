use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use color_eyre::eyre::{eyre, Result};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use crate::client::models::{DeleteResponse, Descriptor, FsLayer, ImageConfig, Manifest, ManifestResponse};
use crate::client::Registry;

/// An in-memory registry for exercising sweeps without a network.
#[derive(Debug, Default)]
pub struct TestRegistry {
    pub repositories: Vec<String>,
    pub tags: Mutex<HashMap<String, Vec<String>>>,
    pub manifests: HashMap<(String, String), ManifestResponse>,
    pub configs: HashMap<String, ImageConfig>,
    pub delete_status: Option<StatusCode>,
    pub deleted: Mutex<Vec<(String, String)>>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_tag(&mut self, repository: &str, tag: &str, response: ManifestResponse) {
        if !self.repositories.iter().any(|r| r == repository) {
            self.repositories.push(repository.to_string());
        }
        self.tags
            .get_mut()
            .unwrap()
            .entry(repository.to_string())
            .or_default()
            .push(tag.to_string());
        self.manifests
            .insert((repository.to_string(), tag.to_string()), response);
    }

    /// Add a schema version 2 tag whose config blob has the given `created` value.
    pub fn with_tag(mut self, repository: &str, tag: &str, created: &str, digest: Option<&str>) -> Self {
        let config_digest = format!("sha256:config-{repository}-{tag}");
        self.configs.insert(
            config_digest.clone(),
            ImageConfig {
                created: created.to_string(),
            },
        );
        let manifest = Manifest {
            schema_version: 2,
            media_type: Some("application/vnd.docker.distribution.manifest.v2+json".to_string()),
            config: Some(Descriptor {
                media_type: None,
                size: None,
                digest: config_digest,
            }),
            layers: Vec::new(),
            fs_layers: Vec::new(),
        };
        self.add_tag(
            repository,
            tag,
            ManifestResponse {
                manifest,
                digest: digest.map(str::to_string),
            },
        );
        self
    }

    /// Add a schema version 1 tag.
    pub fn with_legacy_tag(mut self, repository: &str, tag: &str) -> Self {
        let manifest = Manifest {
            schema_version: 1,
            media_type: None,
            config: None,
            layers: Vec::new(),
            fs_layers: vec![FsLayer {
                blob_sum: "sha256:a3ed95caeb02ffe68cdd9fd84406680ae93d633cb16422d00e8a7c22955b46d4".to_string(),
            }],
        };
        self.add_tag(
            repository,
            tag,
            ManifestResponse {
                manifest,
                digest: Some(format!("sha256:legacy-{repository}-{tag}")),
            },
        );
        self
    }

    /// Add a schema version 2 manifest that doesn't reference a config blob.
    pub fn with_configless_tag(mut self, repository: &str, tag: &str) -> Self {
        let manifest = Manifest {
            schema_version: 2,
            media_type: None,
            config: None,
            layers: Vec::new(),
            fs_layers: Vec::new(),
        };
        self.add_tag(repository, tag, ManifestResponse { manifest, digest: None });
        self
    }

    pub fn with_delete_status(mut self, status: StatusCode) -> Self {
        self.delete_status = Some(status);
        self
    }

    pub fn deleted(&self) -> Vec<(String, String)> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Registry for TestRegistry {
    async fn list_repositories(&self) -> Result<Vec<String>> {
        Ok(self.repositories.clone())
    }

    async fn list_tags(&self, repository: &str) -> Result<Vec<String>> {
        Ok(self.tags.lock().unwrap().get(repository).cloned().unwrap_or_default())
    }

    async fn fetch_manifest(&self, repository: &str, tag: &str) -> Result<ManifestResponse> {
        self.manifests
            .get(&(repository.to_string(), tag.to_string()))
            .cloned()
            .ok_or_else(|| eyre!("manifest unknown: {repository}:{tag}"))
    }

    async fn fetch_image_config(&self, _repository: &str, digest: &str) -> Result<ImageConfig> {
        self.configs
            .get(digest)
            .cloned()
            .ok_or_else(|| eyre!("blob unknown: {digest}"))
    }

    async fn delete_manifest(&self, repository: &str, digest: &str) -> Result<DeleteResponse> {
        let status = self.delete_status.unwrap_or(StatusCode::ACCEPTED);
        if status.is_success() {
            // Every tag pointing at the manifest goes away with it
            let removed: Vec<String> = self
                .manifests
                .iter()
                .filter(|((r, _), m)| r == repository && m.digest.as_deref() == Some(digest))
                .map(|((_, t), _)| t.clone())
                .collect();
            if let Some(tags) = self.tags.lock().unwrap().get_mut(repository) {
                tags.retain(|t| !removed.contains(t));
            }
        }
        self.deleted
            .lock()
            .unwrap()
            .push((repository.to_string(), digest.to_string()));
        Ok(DeleteResponse {
            status,
            headers: HeaderMap::new(),
            body: String::new(),
        })
    }
}
