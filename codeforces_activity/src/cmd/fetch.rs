use crate::modules::{config::FetchConfig, fetcher::ActivityFetcher, roster};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use codeforces_activity_libs::{CodeforcesClient, Credentials};
use std::env;

#[derive(Debug, Args)]
pub struct FetchArgs {}

pub async fn run(_args: FetchArgs) -> Result<()> {
    let config = FetchConfig::from_env()?;

    let credentials = Credentials::load(&config.credentials_file);
    if credentials.is_none() {
        tracing::warn!(
            "CF_API_KEY/CF_API_SECRET are not configured. Group contests will not be available."
        );
    }

    let client = CodeforcesClient::new(&config.api_base_url, credentials).with_context(|| {
        let message = "failed to create Codeforces API client";
        tracing::error!(message);
        message
    })?;

    let handles = roster::load_handles(&config.roster_path, &config.roster_column)?;
    let dir = env::current_dir()?;

    let fetcher = ActivityFetcher::new(&client, &config);
    let path = fetcher.run(&dir, &handles, Utc::now()).await?;
    tracing::info!("Wrote {}", path.display());

    Ok(())
}
