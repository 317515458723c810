use color_eyre::eyre::{eyre, Result};
use reqwest::header::{HeaderMap, USER_AGENT};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::client::client::RegistryClient;
use crate::client::urls::Urls;

#[derive(Debug)]
pub struct RegistryClientBuilder {
    pub headers: Option<HeaderMap>,
    pub urls: Option<Urls>,
    pub http_client: Option<Client>,
}

impl Default for RegistryClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            headers: None,
            urls: None,
            http_client: None,
        }
    }

    /// Add default HTTP headers for the client to use in all requests.
    pub fn set_http_headers(mut self) -> Result<Self> {
        debug!("Constructing HTTP headers");
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, "registry-retention".parse()?);
        self.headers = Some(headers);
        Ok(self)
    }

    /// Attach a urls utility struct.
    pub fn generate_urls(mut self, registry_url: &Url) -> Self {
        debug!("Constructing base urls");
        self.urls = Some(Urls::from_base(registry_url));
        self
    }

    /// Create the underlying HTTP client.
    ///
    /// No request timeout is set: a registry that stops responding
    /// stalls the sweep until the process is stopped.
    pub fn create_http_client(mut self) -> Result<Self> {
        debug!("Creating HTTP client");
        self.http_client = Some(Client::builder().build()?);
        Ok(self)
    }

    pub fn build(self) -> Result<RegistryClient> {
        match (self.headers, self.urls, self.http_client) {
            (Some(headers), Some(urls), Some(http_client)) => Ok(RegistryClient {
                headers,
                urls,
                http_client,
            }),
            _ => Err(eyre!("All required fields are not set")),
        }
    }
}
