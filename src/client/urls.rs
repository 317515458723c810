use color_eyre::Result;
use url::Url;

/// Endpoint construction for the Docker Distribution v2 API.
///
/// The base is expected to be the API root, including `/v2/`.
#[derive(Debug, Clone)]
pub struct Urls {
    pub registry_base: Url,
}

impl Urls {
    pub fn from_base(registry_base: &Url) -> Self {
        let mut registry_base = registry_base.clone();
        if !registry_base.path().ends_with('/') {
            let path = format!("{}/", registry_base.path());
            registry_base.set_path(&path);
        }
        Self { registry_base }
    }

    pub fn catalog_url(&self) -> Result<Url> {
        Ok(self.registry_base.join("_catalog")?)
    }

    pub fn list_tags_url(&self, repository: &str) -> Result<Url> {
        Ok(self.registry_base.join(&format!("{repository}/tags/list"))?)
    }

    /// Manifests are addressed by tag when reading and by digest when deleting.
    pub fn manifest_url(&self, repository: &str, reference: &str) -> Result<Url> {
        Ok(self.registry_base.join(&format!("{repository}/manifests/{reference}"))?)
    }

    pub fn blob_url(&self, repository: &str, digest: &str) -> Result<Url> {
        Ok(self.registry_base.join(&format!("{repository}/blobs/{digest}"))?)
    }
}
