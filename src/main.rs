mod api;
mod config;
mod manifest;
mod mirror;
mod store;

use std::process;
use std::time::Duration;

use anyhow::Result;
use log::debug;

use crate::api::VercelClient;
use crate::config::Config;
use crate::manifest::file_count;
use crate::mirror::Mirror;
use crate::store::ManifestStore;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load()?;
    debug!("{config:?}");

    let client = VercelClient::new(&config)?;
    let store = ManifestStore::new(config.manifest_path.clone());
    let manifest = store.load_or_fetch(&client).await?;

    println!(
        "Mirroring {} files to {}",
        file_count(&manifest),
        config.output_dir.display()
    );
    println!("{}", "=".repeat(60));

    let mut mirror = Mirror::new(
        client,
        config.output_dir.clone(),
        Duration::from_millis(config.throttle_ms),
    );
    let stats = mirror.run(&manifest).await;

    println!("{}", "=".repeat(60));
    println!(
        "Done: {} files, {} succeeded, {} failed",
        stats.total(),
        stats.succeeded,
        stats.failed
    );

    if config.strict && stats.failed > 0 {
        process::exit(1);
    }
    Ok(())
}
