use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Catalog {
    pub repositories: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TagList {
    pub name: Option<String>,
    /// Registries return `null` for repositories without tags.
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub media_type: Option<String>,
    pub size: Option<u64>,
    pub digest: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FsLayer {
    pub blob_sum: String,
}

/// An image manifest, in either the current (schema version 2) or the
/// legacy signed (schema version 1) format.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub schema_version: u32,
    pub media_type: Option<String>,
    pub config: Option<Descriptor>,
    #[serde(default)]
    pub layers: Vec<Descriptor>,
    #[serde(default)]
    pub fs_layers: Vec<FsLayer>,
}

impl Manifest {
    pub fn is_legacy(&self) -> bool {
        self.schema_version != 2
    }

    /// Digests of every layer the manifest references, in manifest order.
    pub fn layer_digests(&self) -> Vec<&str> {
        if self.is_legacy() {
            self.fs_layers.iter().map(|l| l.blob_sum.as_str()).collect()
        } else {
            self.layers.iter().map(|l| l.digest.as_str()).collect()
        }
    }
}

/// A manifest together with the content digest the registry reported for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestResponse {
    pub manifest: Manifest,
    pub digest: Option<String>,
}

/// The parts of an image configuration blob we read.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ImageConfig {
    pub created: String,
}

#[derive(Debug, Clone)]
pub struct DeleteResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}
