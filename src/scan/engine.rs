use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::classify::{Alert, Classifier};
use super::filter::filter_recent;
use super::watch::WatchState;
use crate::api::{ListingSource, TradeSource};
use crate::config::{BotConfig, FeedConfig};
use crate::error::{FetchError, NotifyError};
use crate::models::listing::Listing;
use crate::models::trade::Trade;
use crate::notifications::format::format_alert;
use crate::notifications::NotificationSink;

/// Outcome of one scan, for logs, the HTTP trigger and tests
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanResult {
    pub fetched: usize,
    pub malformed: usize,
    pub in_window: usize,
    pub alerts: usize,
    pub alerts_sent: usize,
    pub dispatch_failures: usize,
}

/// Runs fetch → filter → classify → format → dispatch, once per call.
///
/// Safe to call concurrently; the only shared state is the watch state,
/// which sits behind a mutex and is never held across I/O.
pub struct ScanEngine {
    trades: Box<dyn TradeSource>,
    listings: Option<Box<dyn ListingSource>>,
    sink: Box<dyn NotificationSink>,
    classifier: Classifier,
    feed: FeedConfig,
    watch_enabled: bool,
    listings_limit: usize,
    watch: Mutex<WatchState>,
}

impl ScanEngine {
    pub fn new(
        config: &BotConfig,
        trades: Box<dyn TradeSource>,
        listings: Option<Box<dyn ListingSource>>,
        sink: Box<dyn NotificationSink>,
    ) -> Self {
        Self {
            trades,
            listings: listings.filter(|_| config.listings.enabled),
            sink,
            classifier: Classifier::new(
                config.thresholds.clone(),
                config.feed.window_secs,
                config.watch.new_wallet_min_usd,
            ),
            feed: config.feed.clone(),
            watch_enabled: config.watch.enabled,
            listings_limit: config.listings.limit,
            watch: Mutex::new(WatchState::new(&config.watch)),
        }
    }

    pub async fn run_scan(&self, trigger: &str) -> ScanResult {
        let span = info_span!("scan", id = %Uuid::new_v4(), trigger);
        self.run_scan_at(Utc::now()).instrument(span).await
    }

    pub async fn run_scan_at(&self, now: DateTime<Utc>) -> ScanResult {
        let mut result = ScanResult::default();

        let raw = self.fetch_trades().await;
        result.fetched = raw.len();

        let mut trades = Vec::with_capacity(raw.len());
        for record in raw {
            match Trade::from_record(record) {
                Ok(trade) => trades.push(trade),
                Err(e) => {
                    debug!("Dropping malformed trade: {}", e);
                    result.malformed += 1;
                }
            }
        }

        let trades = filter_recent(trades, now.timestamp(), self.feed.window_secs);
        result.in_window = trades.len();

        let listings = self.fetch_listings().await;
        let alerts = self.classify(&trades, listings, now).await;
        result.alerts = alerts.len();

        self.dispatch(&alerts, &mut result).await;

        info!(
            "Scan complete: {} fetched, {} malformed, {} in window, {} alerts ({} sent, {} failed)",
            result.fetched,
            result.malformed,
            result.in_window,
            result.alerts,
            result.alerts_sent,
            result.dispatch_failures,
        );
        result
    }

    async fn fetch_trades(&self) -> Vec<serde_json::Value> {
        let timeout = Duration::from_secs(self.feed.fetch_timeout_secs);
        let fetched = match tokio::time::timeout(timeout, self.trades.fetch_recent(self.feed.trade_lookback)).await {
            Ok(res) => res,
            Err(_) => Err(FetchError::Timeout(self.feed.fetch_timeout_secs)),
        };
        fetched.unwrap_or_else(|e| {
            warn!("Trades fetch error: {}", e);
            Vec::new()
        })
    }

    async fn fetch_listings(&self) -> Vec<Listing> {
        let Some(source) = &self.listings else {
            return Vec::new();
        };
        let timeout = Duration::from_secs(self.feed.fetch_timeout_secs);
        let fetched = match tokio::time::timeout(timeout, source.fetch_new_events(self.listings_limit)).await {
            Ok(res) => res,
            Err(_) => Err(FetchError::Timeout(self.feed.fetch_timeout_secs)),
        };
        match fetched {
            Ok(events) => events.into_iter().filter_map(Listing::from_raw).collect(),
            Err(e) => {
                warn!("Events fetch error: {}", e);
                Vec::new()
            }
        }
    }

    async fn classify(&self, trades: &[Trade], listings: Vec<Listing>, now: DateTime<Utc>) -> Vec<Alert> {
        let mut alerts = self.classifier.classify(trades);

        if self.watch_enabled || !listings.is_empty() {
            let mut watch = self.watch.lock().await;
            if self.watch_enabled {
                alerts.extend(self.classifier.watch_alerts(trades, &mut watch));
            }
            alerts.extend(self.classifier.new_listings(listings, &mut watch, now));
        }

        self.classifier.finalize(alerts)
    }

    /// One message at a time, in alert order. A failed send is logged and
    /// counted; the rest of the batch is still attempted.
    async fn dispatch(&self, alerts: &[Alert], result: &mut ScanResult) {
        let mut reported_unconfigured = false;
        for alert in alerts {
            let text = format_alert(alert);
            match self.sink.send(&text).await {
                Ok(()) => {
                    debug!("Sent {} alert", alert.kind());
                    result.alerts_sent += 1;
                }
                Err(NotifyError::NotConfigured) => {
                    if !reported_unconfigured {
                        warn!("{}", NotifyError::NotConfigured);
                        reported_unconfigured = true;
                    }
                    result.dispatch_failures += 1;
                }
                Err(e) => {
                    warn!("Failed to send {} alert: {}", alert.kind(), e);
                    result.dispatch_failures += 1;
                }
            }
        }
    }
}
