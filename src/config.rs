use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::api::endpoints;

pub const CONFIG_FILE: &str = "config.toml";

/// Trade feed polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// How many most-recent trades to request per scan
    #[serde(default = "default_trade_lookback")]
    pub trade_lookback: usize,
    /// Trades older than this (relative to scan time) are ignored
    #[serde(default = "default_window_secs")]
    pub window_secs: i64,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_data_api_url")]
    pub data_api_url: String,
    #[serde(default = "default_gamma_api_url")]
    pub gamma_api_url: String,
}

fn default_trade_lookback() -> usize { 50 }
fn default_window_secs() -> i64 { 300 }
fn default_fetch_timeout() -> u64 { 15 }
fn default_data_api_url() -> String { endpoints::DATA_API.to_string() }
fn default_gamma_api_url() -> String { endpoints::GAMMA_API.to_string() }

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            trade_lookback: default_trade_lookback(),
            window_secs: default_window_secs(),
            fetch_timeout_secs: default_fetch_timeout(),
            data_api_url: default_data_api_url(),
            gamma_api_url: default_gamma_api_url(),
        }
    }
}

/// Classification thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    /// Single trade (or wallet total) at or above this is a whale
    #[serde(default = "default_whale_usd")]
    pub whale_usd: f64,
    #[serde(default = "default_high_volume_market_usd")]
    pub high_volume_market_usd: f64,
    #[serde(default = "default_top_traders_count")]
    pub top_traders_count: usize,
    /// Max wallet rows across all outcomes in one high-volume market alert
    #[serde(default = "default_top_holders_limit")]
    pub top_holders_limit: usize,
    #[serde(default = "default_top_wallets_per_outcome")]
    pub top_wallets_per_outcome: usize,
    /// Only consider crypto-flavoured markets for the high-volume rule
    #[serde(default = "default_true")]
    pub crypto_markets_only: bool,
}

fn default_whale_usd() -> f64 { 500.0 }
fn default_high_volume_market_usd() -> f64 { 4_000_000.0 }
fn default_top_traders_count() -> usize { 3 }
fn default_top_holders_limit() -> usize { 10 }
fn default_top_wallets_per_outcome() -> usize { 5 }
fn default_true() -> bool { true }

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            whale_usd: default_whale_usd(),
            high_volume_market_usd: default_high_volume_market_usd(),
            top_traders_count: default_top_traders_count(),
            top_holders_limit: default_top_holders_limit(),
            top_wallets_per_outcome: default_top_wallets_per_outcome(),
            crypto_markets_only: true,
        }
    }
}

/// New-wallet and watch-list rules. These keep state across scans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_new_wallet_min_usd")]
    pub new_wallet_min_usd: f64,
    #[serde(default)]
    pub wallets: Vec<String>,
    /// Condition ids or slugs
    #[serde(default)]
    pub markets: Vec<String>,
    /// Seen-id sets are trimmed back to `seen_retain` once they exceed this
    #[serde(default = "default_seen_capacity")]
    pub seen_capacity: usize,
    #[serde(default = "default_seen_retain")]
    pub seen_retain: usize,
}

fn default_new_wallet_min_usd() -> f64 { 1000.0 }
fn default_seen_capacity() -> usize { 500 }
fn default_seen_retain() -> usize { 250 }

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            new_wallet_min_usd: default_new_wallet_min_usd(),
            wallets: Vec::new(),
            markets: Vec::new(),
            seen_capacity: default_seen_capacity(),
            seen_retain: default_seen_retain(),
        }
    }
}

/// New event listings from the Gamma API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_listings_limit")]
    pub limit: usize,
}

fn default_listings_limit() -> usize { 50 }

impl Default for ListingsConfig {
    fn default() -> Self {
        Self { enabled: false, limit: default_listings_limit() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 { 3000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

/// Telegram credentials. Missing values disable delivery, they never stop the bot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub listings: ListingsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

impl BotConfig {
    /// Load `config.toml` if present (defaults otherwise), then apply env overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(Path::new(CONFIG_FILE))?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&data).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(data: &str) -> Result<Self> {
        Ok(toml::from_str(data)?)
    }

    /// Environment wins over the file for credentials and port.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| var(key).filter(|s| !s.is_empty());

        if let Some(token) = non_empty("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(token);
        }
        if let Some(chat_id) = non_empty("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = Some(chat_id);
        }
        if let Some(port) = non_empty("PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!("Ignoring invalid PORT value: {}", port),
            }
        }
    }

    /// Copy safe to print: the bot token is masked.
    pub fn redacted(&self) -> Self {
        let mut shown = self.clone();
        if shown.telegram.bot_token.is_some() {
            shown.telegram.bot_token = Some("<redacted>".to_string());
        }
        shown
    }
}
