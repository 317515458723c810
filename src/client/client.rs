use async_trait::async_trait;
use color_eyre::eyre::{eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::client::headers::{manifest_accept_header, RegistryHeaders};
use crate::client::models::{Catalog, DeleteResponse, ImageConfig, Manifest, ManifestResponse, TagList};
use crate::client::urls::Urls;
use crate::client::Registry;

#[derive(Debug)]
pub struct RegistryClient {
    pub headers: HeaderMap,
    pub urls: Urls,
    pub http_client: Client,
}

impl RegistryClient {
    async fn send(&self, method: Method, url: Url, extra_headers: Option<HeaderMap>) -> Result<Response> {
        debug!("{} {}", method, url);
        let mut headers = self.headers.clone();
        if let Some(extra_headers) = extra_headers {
            headers.extend(extra_headers);
        }
        match self.http_client.request(method, url.clone()).headers(headers).send().await {
            Ok(response) => Ok(response),
            Err(e) => Err(eyre!("Request to {url} failed: {e}")),
        }
    }

    /// Fetch a URL and deserialize its JSON body.
    ///
    /// Non-2xx responses are errors. The raw body is included in any
    /// deserialization error, which makes misconfigured response structs
    /// a lot easier to spot.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, extra_headers: Option<HeaderMap>) -> Result<(T, HeaderMap)> {
        let response = self.send(Method::GET, url.clone(), extra_headers).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let raw_json = response.text().await?;

        if !status.is_success() {
            return Err(eyre!("Received {status} from {url}: {raw_json}"));
        }

        match serde_json::from_str(&raw_json) {
            Ok(t) => Ok((t, headers)),
            Err(e) => Err(eyre!(
                "Failed to deserialize response from {url}: {raw_json}. The error was {e}."
            )),
        }
    }
}

#[async_trait]
impl Registry for RegistryClient {
    async fn list_repositories(&self) -> Result<Vec<String>> {
        let (catalog, _): (Catalog, _) = self.get_json(self.urls.catalog_url()?, None).await?;
        info!("Found {} repositories in the registry catalog", catalog.repositories.len());
        Ok(catalog.repositories)
    }

    async fn list_tags(&self, repository: &str) -> Result<Vec<String>> {
        let (tag_list, _): (TagList, _) = self.get_json(self.urls.list_tags_url(repository)?, None).await?;
        Ok(tag_list.tags.unwrap_or_default())
    }

    async fn fetch_manifest(&self, repository: &str, tag: &str) -> Result<ManifestResponse> {
        let mut accept = HeaderMap::new();
        accept.insert(ACCEPT, HeaderValue::from_str(&manifest_accept_header())?);

        let (manifest, headers): (Manifest, _) =
            self.get_json(self.urls.manifest_url(repository, tag)?, Some(accept)).await?;
        let registry_headers = RegistryHeaders::from_headers(&headers);

        Ok(ManifestResponse {
            manifest,
            digest: registry_headers.docker_content_digest,
        })
    }

    async fn fetch_image_config(&self, repository: &str, digest: &str) -> Result<ImageConfig> {
        let (config, _): (ImageConfig, _) = self.get_json(self.urls.blob_url(repository, digest)?, None).await?;
        Ok(config)
    }

    async fn delete_manifest(&self, repository: &str, digest: &str) -> Result<DeleteResponse> {
        let response = self
            .send(Method::DELETE, self.urls.manifest_url(repository, digest)?, None)
            .await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(DeleteResponse { status, headers, body })
    }
}
