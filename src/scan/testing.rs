//! Shared fixtures for tests: trade builders and in-memory source/sink doubles.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{ListingSource, TradeSource};
use crate::error::{FetchError, NotifyError};
use crate::models::listing::RawEvent;
use crate::models::trade::{RawTrade, Side, Trade};
use crate::notifications::NotificationSink;

pub fn trade(wallet: &str, market: &str, usd: f64, timestamp: i64) -> Trade {
    Trade {
        tx_hash: None,
        wallet: wallet.to_string(),
        market_id: market.to_string(),
        side: Some(Side::Buy),
        size: None,
        price: None,
        usd_value: usd,
        outcome: None,
        timestamp,
        title: format!("Market {}", market),
        slug: market.to_string(),
    }
}

pub fn trade_in(wallet: &str, market: &str, usd: f64, outcome: Option<&str>, title: &str, slug: &str) -> Trade {
    Trade {
        outcome: outcome.map(String::from),
        title: title.to_string(),
        slug: slug.to_string(),
        ..trade(wallet, market, usd, 0)
    }
}

pub fn priced(wallet: &str, market: &str, size: f64, price: f64, timestamp: i64) -> Trade {
    Trade {
        size: Some(size),
        price: Some(price),
        usd_value: size * price,
        ..trade(wallet, market, 0.0, timestamp)
    }
}

pub fn raw(wallet: &str, market: &str, size: f64, price: f64, timestamp: i64) -> RawTrade {
    RawTrade {
        proxy_wallet: Some(wallet.to_string()),
        side: Some("BUY".to_string()),
        condition_id: Some(market.to_string()),
        size: Some(size),
        price: Some(price),
        timestamp: Some(timestamp),
        title: Some(format!("Market {}", market)),
        slug: Some(market.to_string()),
        outcome: Some("Yes".to_string()),
        ..RawTrade::default()
    }
}

/// Returns a fixed batch, or a transport-style failure when `batch` is `None`.
pub struct StaticTrades {
    pub batch: Option<Vec<serde_json::Value>>,
    pub requested: Mutex<Vec<usize>>,
}

impl StaticTrades {
    pub fn new(batch: Vec<RawTrade>) -> Self {
        Self::from_records(batch.iter().map(|t| serde_json::to_value(t).unwrap()).collect())
    }

    /// Feed records as they come off the wire, mistyped ones included
    pub fn from_records(records: Vec<serde_json::Value>) -> Self {
        Self { batch: Some(records), requested: Mutex::new(Vec::new()) }
    }

    pub fn failing() -> Self {
        Self { batch: None, requested: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl TradeSource for StaticTrades {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<serde_json::Value>, FetchError> {
        self.requested.lock().unwrap().push(limit);
        match &self.batch {
            Some(batch) => Ok(batch.iter().take(limit).cloned().collect()),
            None => Err(FetchError::Status(reqwest::StatusCode::BAD_GATEWAY)),
        }
    }
}

/// Never answers; used to exercise the fetch timeout.
pub struct HangingTrades;

#[async_trait]
impl TradeSource for HangingTrades {
    async fn fetch_recent(&self, _limit: usize) -> Result<Vec<serde_json::Value>, FetchError> {
        std::future::pending().await
    }
}

pub struct StaticEvents(pub Vec<RawEvent>);

#[async_trait]
impl ListingSource for StaticEvents {
    async fn fetch_new_events(&self, limit: usize) -> Result<Vec<RawEvent>, FetchError> {
        Ok(self.0.iter().take(limit).cloned().collect())
    }
}

/// Records every message; fails the ones whose 1-based position is listed in `fail_on`.
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<String>>,
    pub attempts: Mutex<usize>,
    pub fail_on: Vec<usize>,
}

impl RecordingSink {
    pub fn failing_on(fail_on: Vec<usize>) -> Self {
        Self { fail_on, ..Self::default() }
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            *attempts
        };
        if self.fail_on.contains(&attempt) {
            return Err(NotifyError::Rejected(reqwest::StatusCode::TOO_MANY_REQUESTS));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
