pub mod client;
pub mod endpoints;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::listing::RawEvent;

/// Anything that can hand back the N most recent trades, one undecoded
/// JSON record per trade. Decoding happens per record in the scan.
#[async_trait]
pub trait TradeSource: Send + Sync {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<serde_json::Value>, FetchError>;
}

/// Anything that can hand back the newest open events
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_new_events(&self, limit: usize) -> Result<Vec<RawEvent>, FetchError>;
}
