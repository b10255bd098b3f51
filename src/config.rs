//! Run configuration.
//!
//! Non-secret settings come from an optional JSON config file, overridden by
//! environment variables. The API token is only ever read from the
//! environment and is redacted from debug output.

use std::env;
use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://api.vercel.com";
const DEFAULT_CONFIG_FILE: &str = "vercel-mirror.json";
const DEFAULT_OUTPUT_DIR: &str = "deployment";
const DEFAULT_THROTTLE_MS: u64 = 100;

/// Which content endpoint serves file bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// `/v13/deployments/<id>/files/<uid>`
    Deployment,
    /// `/v2/now/files/<uid>`
    Legacy,
}

impl Endpoint {
    fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "deployment" => Ok(Self::Deployment),
            "legacy" => Ok(Self::Legacy),
            other => bail!("unknown endpoint '{other}', expected 'deployment' or 'legacy'"),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub deployment_id: String,
    pub base_url: String,
    pub output_dir: PathBuf,
    /// Where the cached file listing lives.
    pub manifest_path: PathBuf,
    pub endpoint: Endpoint,
    /// Minimum interval between fetches, in milliseconds. Zero disables.
    pub throttle_ms: u64,
    /// Exit non-zero when any file failed to download.
    pub strict: bool,
}

/// Settings accepted from the config file. The token is deliberately absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub deployment_id: Option<String>,
    pub base_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub manifest_path: Option<PathBuf>,
    pub endpoint: Option<Endpoint>,
    pub throttle_ms: Option<u64>,
    pub strict: Option<bool>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path =
            env::var("MIRROR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let file = match std::fs::read_to_string(&config_path) {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("invalid config file {config_path}"))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(err) => return Err(err).with_context(|| format!("reading {config_path}")),
        };

        Self::resolve(file, |name| env::var(name).ok())
    }

    /// Merges file settings with environment overrides.
    fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let Some(token) = env("VERCEL_TOKEN").filter(|t| !t.trim().is_empty()) else {
            bail!("VERCEL_TOKEN is not set");
        };

        let Some(deployment_id) = env("VERCEL_DEPLOYMENT_ID").or(file.deployment_id) else {
            bail!("no deployment id: set VERCEL_DEPLOYMENT_ID or 'deployment_id' in the config file");
        };

        let base_url = env("VERCEL_API_URL")
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let output_dir = env("MIRROR_OUTPUT_DIR")
            .map(PathBuf::from)
            .or(file.output_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let manifest_path = env("MIRROR_MANIFEST")
            .map(PathBuf::from)
            .or(file.manifest_path)
            .unwrap_or_else(|| output_dir.join("files.json"));

        let endpoint = match env("MIRROR_ENDPOINT") {
            Some(value) => Endpoint::parse(&value)?,
            None => file.endpoint.unwrap_or(Endpoint::Deployment),
        };

        let throttle_ms = match env("MIRROR_THROTTLE_MS") {
            Some(value) => value
                .parse()
                .with_context(|| format!("invalid MIRROR_THROTTLE_MS '{value}'"))?,
            None => file.throttle_ms.unwrap_or(DEFAULT_THROTTLE_MS),
        };

        let strict = match env("MIRROR_STRICT") {
            Some(value) => matches!(value.as_str(), "1" | "true" | "yes"),
            None => file.strict.unwrap_or(false),
        };

        Ok(Self {
            token,
            deployment_id,
            base_url,
            output_dir,
            manifest_path,
            endpoint,
            throttle_ms,
            strict,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("deployment_id", &self.deployment_id)
            .field("base_url", &self.base_url)
            .field("output_dir", &self.output_dir)
            .field("manifest_path", &self.manifest_path)
            .field("endpoint", &self.endpoint)
            .field("throttle_ms", &self.throttle_ms)
            .field("strict", &self.strict)
            .finish()
    }
}
