use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{endpoints, ListingSource, TradeSource};
use crate::config::FeedConfig;
use crate::error::FetchError;
use crate::models::listing::RawEvent;

/// Read-only client for the public Polymarket data and Gamma APIs
pub struct PolymarketClient {
    http: Client,
    data_url: String,
    gamma_url: String,
}

impl PolymarketClient {
    pub fn new(feed: &FeedConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent("polymarket-whale-watch/0.1.0")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            data_url: feed.data_api_url.trim_end_matches('/').to_string(),
            gamma_url: feed.gamma_api_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET a JSON array. Elements are left undecoded so one bad record
    /// can't take the rest of the batch down with it.
    async fn get_records(&self, url: &str) -> Result<Vec<serde_json::Value>, FetchError> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl TradeSource for PolymarketClient {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<serde_json::Value>, FetchError> {
        let url = format!("{}{}?limit={}", self.data_url, endpoints::TRADES, limit);
        debug!("Fetching trades: {}", url);

        let records = self.get_records(&url).await?;
        debug!("Fetched {} trade records", records.len());
        Ok(records)
    }
}

#[async_trait]
impl ListingSource for PolymarketClient {
    async fn fetch_new_events(&self, limit: usize) -> Result<Vec<RawEvent>, FetchError> {
        let url = format!(
            "{}{}?order=id&ascending=false&closed=false&limit={}",
            self.gamma_url,
            endpoints::EVENTS,
            limit
        );
        debug!("Fetching events: {}", url);

        let events = self
            .get_records(&url)
            .await?
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<RawEvent>(record) {
                Ok(event) => Some(event),
                Err(e) => {
                    debug!("Skipping undecodable event: {}", e);
                    None
                }
            })
            .collect();
        Ok(events)
    }
}
