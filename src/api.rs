//! Vercel REST API client.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::debug;
use reqwest::Client;

use crate::config::{Config, Endpoint};
use crate::manifest::ManifestNode;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Why a single file fetch failed. The walk reports these per file and
/// keeps going; nothing here aborts a run.
#[derive(Debug)]
pub enum FetchError {
    /// The content endpoint answered with a non-200 status.
    Status(u16),
    /// The request itself failed (connect, TLS, timeout, truncated body).
    Transport(reqwest::Error),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "status {code}"),
            Self::Transport(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

/// Source of file bytes for the mirror walk.
///
/// The one production implementation is [`VercelClient`]; tests swap in an
/// in-memory source so no network is involved.
pub trait FileSource {
    fn fetch(&self, uid: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>>;
}

pub struct VercelClient {
    client: Client,
    token: String,
    deployment_id: String,
    base_url: String,
    endpoint: Endpoint,
}

impl VercelClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .use_rustls_tls()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            token: config.token.clone(),
            deployment_id: config.deployment_id.clone(),
            base_url: config.base_url.clone(),
            endpoint: config.endpoint,
        })
    }

    fn file_url(&self, uid: &str) -> String {
        match self.endpoint {
            Endpoint::Deployment => format!(
                "{}/v13/deployments/{}/files/{uid}",
                self.base_url, self.deployment_id
            ),
            Endpoint::Legacy => format!("{}/v2/now/files/{uid}", self.base_url),
        }
    }

    fn listing_url(&self) -> String {
        format!("{}/v13/deployments/{}/files", self.base_url, self.deployment_id)
    }

    /// Fetches the raw bytes of one file.
    pub async fn fetch_file(&self, uid: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.file_url(uid);
        debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Fetches the deployment's file listing. A failure here is fatal to the
    /// run: without a manifest there is nothing to mirror.
    pub async fn fetch_manifest(&self) -> Result<Vec<ManifestNode>> {
        let url = self.listing_url();
        debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("requesting file listing from {url}"))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(anyhow!("file listing request failed: HTTP {status}"));
        }

        response
            .json::<Vec<ManifestNode>>()
            .await
            .context("parsing file listing")
    }
}

impl FileSource for VercelClient {
    async fn fetch(&self, uid: &str) -> Result<Vec<u8>, FetchError> {
        self.fetch_file(uid).await
    }
}
