use async_trait::async_trait;
use color_eyre::Result;

use crate::client::models::{DeleteResponse, ImageConfig, ManifestResponse};

pub mod builder;
pub mod client;
pub mod headers;
pub mod models;
pub mod urls;

/// The registry operations a retention sweep needs.
///
/// [`client::RegistryClient`] implements this over HTTP; tests substitute
/// an in-memory registry.
#[async_trait]
pub trait Registry {
    /// List every repository in the registry catalog.
    async fn list_repositories(&self) -> Result<Vec<String>>;

    /// List every tag in a repository.
    async fn list_tags(&self, repository: &str) -> Result<Vec<String>>;

    /// Fetch a manifest by tag, along with the digest it can be deleted by.
    async fn fetch_manifest(&self, repository: &str, tag: &str) -> Result<ManifestResponse>;

    /// Fetch an image configuration blob.
    async fn fetch_image_config(&self, repository: &str, digest: &str) -> Result<ImageConfig>;

    /// Delete a manifest. Registries only accept digests here, not tags.
    async fn delete_manifest(&self, repository: &str, digest: &str) -> Result<DeleteResponse>;
}
