//! pcapi command line entry point.
//!
//! Logging goes to stderr so stdout carries only the JSON result.

use anyhow::{Context, Result};
use clap::Parser;
use pcapi_client::{PostcodeClient, PostcodeConfig};
use pcapi_core::lookup::quota_json;
use pcapi_core::{AppConfig, CacheDb, Resolver};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "starting pcapi");

    let config = AppConfig::load().context("loading configuration")?;
    let db = CacheDb::open(&config.cache_path).await.context("opening cache")?;

    let output = match cli.command {
        Command::Quota => quota_json(db.quota_report().await.as_ref()),
        Command::Lookup { postcode, number } => {
            serde_json::to_string_pretty(&resolver(db, &config).await?.resolve(&postcode, &number).await)?
        }
        Command::Parse { text } => {
            serde_json::to_string_pretty(&resolver(db, &config).await?.resolve_from_combined(&text).await)?
        }
        Command::Short { postcode, number } => {
            serde_json::to_string_pretty(&resolver(db, &config).await?.resolve_short(&postcode, &number).await)?
        }
    };
    println!("{output}");

    Ok(())
}

/// Resolver backed by the HTTP client; fails without an API token.
async fn resolver(db: CacheDb, config: &AppConfig) -> Result<Resolver<PostcodeClient>> {
    let client = PostcodeClient::new(PostcodeConfig::from_app_config(config)?)?;
    Ok(Resolver::new(db, client, config.cache_ttl()).await)
}
