//! HTTP access to the wallpaper storage host.

use crate::error::{CatalogError, Result};
use crate::manifest::{self, ManifestEntry};
use image::DynamicImage;
use tracing::debug;

/// Thin client over `reqwest` for manifest, image and download requests
#[derive(Clone)]
pub struct RemoteClient {
    client: reqwest::Client,
}

impl RemoteClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("wallshelf/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// GET `url`, failing on non-success statuses.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    /// Download and decode the manifest at `url`.
    pub async fn fetch_manifest(&self, url: &str) -> Result<Vec<ManifestEntry>> {
        let body = self.get(url).await?.text().await?;
        debug!(%url, bytes = body.len(), "manifest received");
        Ok(manifest::parse(&body)?)
    }

    /// Fetch the image at `url` and decode it in memory.
    pub async fn fetch_bitmap(&self, url: &str) -> Result<DynamicImage> {
        let bytes = self.get(url).await?.bytes().await?;
        debug!(%url, bytes = bytes.len(), "image received");
        Ok(image::load_from_memory(&bytes)?)
    }
}
