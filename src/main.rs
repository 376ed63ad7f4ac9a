mod api;
mod config;
mod error;
mod models;
mod notifications;
mod scan;
mod server;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use api::client::PolymarketClient;
use api::ListingSource;
use config::BotConfig;
use notifications::TelegramNotifier;
use scan::ScanEngine;

#[derive(Parser)]
#[command(name = "polymarket-whale-watch", about = "Whale trade and market activity alerts for Polymarket")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan once at startup, then serve the HTTP trigger (default)
    Serve {
        /// Override the listen port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run a single scan, print the result as JSON and exit
    Scan,
    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present (override system env vars)
    dotenvy::dotenv_override().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "polymarket_whale_watch=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = BotConfig::load()?;

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let engine = Arc::new(build_engine(&config)?);

            info!(
                "Starting whale watch: window {}s, whale ${:.2}, high-volume ${:.2}",
                config.feed.window_secs, config.thresholds.whale_usd, config.thresholds.high_volume_market_usd
            );

            let startup = engine.clone();
            tokio::spawn(async move {
                startup.run_scan("startup").await;
            });

            server::serve(engine, port).await?;
        }
        Commands::Scan => {
            let engine = build_engine(&config)?;
            let result = engine.run_scan("cli").await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config.redacted())?);
        }
    }

    Ok(())
}

fn build_engine(config: &BotConfig) -> Result<ScanEngine> {
    let trades = PolymarketClient::new(&config.feed)?;
    let listings: Option<Box<dyn ListingSource>> = if config.listings.enabled {
        Some(Box::new(PolymarketClient::new(&config.feed)?))
    } else {
        None
    };
    let notifier = TelegramNotifier::new(&config.telegram)?;

    Ok(ScanEngine::new(config, Box::new(trades), listings, Box::new(notifier)))
}
