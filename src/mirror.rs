//! Manifest walk and download.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use log::debug;
use tokio::fs;
use tokio::time::Instant;

use crate::api::FileSource;
use crate::manifest::{DownloadStats, ManifestNode};

/// Minimum-interval gate between successive fetches, so a run cannot hammer
/// the API. A zero interval disables the gate.
pub struct Throttle {
    interval: Duration,
    next_allowed: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_allowed: None,
        }
    }

    pub async fn wait(&mut self) {
        if self.interval.is_zero() {
            return;
        }

        if let Some(at) = self.next_allowed
            && at > Instant::now()
        {
            tokio::time::sleep_until(at).await;
        }
        self.next_allowed = Some(Instant::now() + self.interval);
    }
}

/// Walks a deployment manifest and downloads every file into `output_dir`,
/// recreating the directory structure of the listing.
pub struct Mirror<S> {
    source: S,
    output_dir: PathBuf,
    throttle: Throttle,
}

impl<S: FileSource> Mirror<S> {
    pub fn new(source: S, output_dir: PathBuf, throttle: Duration) -> Self {
        Self {
            source,
            output_dir,
            throttle: Throttle::new(throttle),
        }
    }

    /// Downloads every file reachable from `nodes`, in document order.
    ///
    /// One file's failure never stops the walk; it is reported, counted and
    /// the walk moves on. The returned stats satisfy
    /// `succeeded + failed == file_count(nodes)`.
    pub async fn run(&mut self, nodes: &[ManifestNode]) -> DownloadStats {
        let mut stats = DownloadStats::default();

        // Explicit work stack: deployment trees can nest arbitrarily deep.
        // Children are pushed in reverse so they pop in document order.
        let mut work: Vec<(PathBuf, &ManifestNode)> = Vec::new();
        for node in nodes.iter().rev() {
            work.push((PathBuf::new(), node));
        }

        while let Some((base, node)) = work.pop() {
            match node {
                ManifestNode::File { name, uid } => {
                    let rel = base.join(name);
                    self.throttle.wait().await;

                    match self.fetch_and_save(uid, &rel).await {
                        Ok(()) => {
                            println!("OK {}", rel.display());
                            stats.succeeded += 1;
                        }
                        Err(err) => {
                            println!("  ERROR {err}");
                            println!("SKIP {}", rel.display());
                            stats.failed += 1;
                        }
                    }
                }
                ManifestNode::Directory { name, children } => {
                    let dir = base.join(name);
                    println!("\n{}/", dir.display());
                    for child in children.iter().rev() {
                        work.push((dir.clone(), child));
                    }
                }
            }
        }

        stats
    }

    /// Fetches one file and writes it under the output root, overwriting any
    /// existing file. Directory creation and write failures count against
    /// this file only, same as a failed fetch.
    async fn fetch_and_save(&self, uid: &str, rel: &Path) -> Result<()> {
        let bytes = self.source.fetch(uid).await?;

        let target = self.output_dir.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, &bytes).await?;

        debug!("wrote {} bytes to {}", bytes.len(), target.display());
        Ok(())
    }
}
