//! On-disk cache of the deployment manifest.
//!
//! The listing endpoint is only hit when no cached manifest exists; a fresh
//! listing is persisted before the walk starts so later runs reuse it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;
use tokio::fs;

use crate::api::VercelClient;
use crate::manifest::ManifestNode;

pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Reads the cached manifest, or `None` when no cache file exists.
    pub async fn load(&self) -> Result<Option<Vec<ManifestNode>>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", self.path.display()));
            }
        };

        let nodes = serde_json::from_str(&content)
            .with_context(|| format!("invalid manifest cache {}", self.path.display()))?;
        Ok(Some(nodes))
    }

    pub async fn save(&self, nodes: &[ManifestNode]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(nodes)?;
        fs::write(&self.path, content)
            .await
            .with_context(|| format!("writing {}", self.path.display()))
    }

    /// Returns the cached manifest if present, otherwise fetches the listing
    /// and persists it. A listing failure here aborts the whole run.
    pub async fn load_or_fetch(&self, client: &VercelClient) -> Result<Vec<ManifestNode>> {
        if let Some(nodes) = self.load().await? {
            info!("using cached manifest {}", self.path.display());
            return Ok(nodes);
        }

        info!("no cached manifest, fetching file listing");
        let nodes = client.fetch_manifest().await?;
        self.save(&nodes).await?;
        Ok(nodes)
    }
}
