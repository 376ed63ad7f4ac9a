use chrono::{DateTime, Utc};

use super::aggregate::{aggregate_by_market, aggregate_by_wallet, is_crypto_market};
use super::watch::{WatchReason, WatchState};
use crate::config::Thresholds;
use crate::models::listing::Listing;
use crate::models::trade::Trade;

/// How the market priced the outcome that was traded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    HeavyFavorite,
    Favorite,
    Neutral,
    Underdog,
    HeavyUnderdog,
}

impl Strength {
    pub fn from_price(price: f64) -> Self {
        if price >= 0.80 {
            Strength::HeavyFavorite
        } else if price >= 0.60 {
            Strength::Favorite
        } else if price <= 0.20 {
            Strength::HeavyUnderdog
        } else if price <= 0.40 {
            Strength::Underdog
        } else {
            Strength::Neutral
        }
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strength::HeavyFavorite => write!(f, "Heavy Favorite"),
            Strength::Favorite => write!(f, "Favorite"),
            Strength::Neutral => write!(f, "Neutral"),
            Strength::Underdog => write!(f, "Underdog"),
            Strength::HeavyUnderdog => write!(f, "Heavy Underdog"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopTrader {
    pub wallet: String,
    pub total_usd: f64,
    pub market_title: String,
    pub market_slug: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeHolders {
    pub outcome: String,
    pub wallets: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    WhaleTrade {
        trade: Trade,
        usd_value: f64,
        implied_probability: Option<u32>,
        strength: Option<Strength>,
    },
    TopTraders {
        window_secs: i64,
        traders: Vec<TopTrader>,
    },
    HighVolumeMarket {
        market_id: String,
        title: String,
        slug: String,
        total_usd: f64,
        window_secs: i64,
        holders: Vec<OutcomeHolders>,
    },
    NewWallet {
        trade: Trade,
    },
    WatchedTrade {
        trade: Trade,
        reason: WatchReason,
    },
    NewListing {
        listing: Listing,
        /// Whole days until the event ends, relative to scan time
        days_left: Option<i64>,
    },
    Heartbeat {
        window_secs: i64,
    },
}

impl Alert {
    pub fn kind(&self) -> &'static str {
        match self {
            Alert::WhaleTrade { .. } => "whale_trade",
            Alert::TopTraders { .. } => "top_traders",
            Alert::HighVolumeMarket { .. } => "high_volume_market",
            Alert::NewWallet { .. } => "new_wallet",
            Alert::WatchedTrade { .. } => "watched_trade",
            Alert::NewListing { .. } => "new_listing",
            Alert::Heartbeat { .. } => "heartbeat",
        }
    }
}

/// Threshold rules over one window of trades.
///
/// `classify` and `finalize` are pure. The watch and listing rules take the
/// cross-scan [`WatchState`] explicitly.
#[derive(Debug, Clone)]
pub struct Classifier {
    pub thresholds: Thresholds,
    pub window_secs: i64,
    pub new_wallet_min_usd: f64,
}

impl Classifier {
    pub fn new(thresholds: Thresholds, window_secs: i64, new_wallet_min_usd: f64) -> Self {
        Self { thresholds, window_secs, new_wallet_min_usd }
    }

    /// Whale trades, then top traders, then high-volume markets.
    pub fn classify(&self, trades: &[Trade]) -> Vec<Alert> {
        let mut alerts = self.whale_trades(trades);
        alerts.extend(self.top_traders(trades));
        alerts.extend(self.high_volume_markets(trades));
        alerts
    }

    /// Classify and close out the scan in one go (no cross-scan rules).
    #[cfg(test)]
    pub fn run(&self, trades: &[Trade]) -> Vec<Alert> {
        self.finalize(self.classify(trades))
    }

    /// The only place a heartbeat is produced: exactly one, and only when
    /// nothing else fired. Call once per scan, after every other rule.
    pub fn finalize(&self, mut alerts: Vec<Alert>) -> Vec<Alert> {
        if alerts.is_empty() {
            alerts.push(Alert::Heartbeat { window_secs: self.window_secs });
        }
        alerts
    }

    pub fn whale_trades(&self, trades: &[Trade]) -> Vec<Alert> {
        trades
            .iter()
            .filter(|t| t.usd_value >= self.thresholds.whale_usd)
            .map(|t| Alert::WhaleTrade {
                trade: t.clone(),
                usd_value: t.usd_value,
                implied_probability: t.price.map(|p| (p * 100.0).round().clamp(0.0, 100.0) as u32),
                strength: t.price.map(Strength::from_price),
            })
            .collect()
    }

    pub fn top_traders(&self, trades: &[Trade]) -> Option<Alert> {
        let wallets = aggregate_by_wallet(trades);
        let mut ranked: Vec<TopTrader> = wallets
            .iter()
            .filter(|(_, agg)| agg.total_usd >= self.thresholds.whale_usd)
            .map(|(wallet, agg)| TopTrader {
                wallet: wallet.to_string(),
                total_usd: agg.total_usd,
                market_title: agg.first_trade.title.clone(),
                market_slug: agg.first_trade.slug.clone(),
            })
            .collect();

        ranked.sort_by(|a, b| b.total_usd.partial_cmp(&a.total_usd).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(self.thresholds.top_traders_count);

        if ranked.is_empty() {
            None
        } else {
            Some(Alert::TopTraders { window_secs: self.window_secs, traders: ranked })
        }
    }

    pub fn high_volume_markets(&self, trades: &[Trade]) -> Vec<Alert> {
        let crypto_only = self.thresholds.crypto_markets_only;
        let markets = aggregate_by_market(trades, |t| !crypto_only || is_crypto_market(t));

        markets
            .values()
            .filter(|m| m.total_usd >= self.thresholds.high_volume_market_usd)
            .map(|m| {
                let mut budget = self.thresholds.top_holders_limit;
                let mut holders = Vec::new();
                for (outcome, _) in m.outcomes.iter() {
                    if budget == 0 {
                        break;
                    }
                    let wallets = m.top_wallets(outcome, self.thresholds.top_wallets_per_outcome.min(budget));
                    budget -= wallets.len();
                    holders.push(OutcomeHolders { outcome: outcome.to_string(), wallets });
                }
                Alert::HighVolumeMarket {
                    market_id: m.market_id.clone(),
                    title: m.title.clone(),
                    slug: m.slug.clone(),
                    total_usd: m.total_usd,
                    window_secs: self.window_secs,
                    holders,
                }
            })
            .collect()
    }

    /// New-wallet and watched-entity rules. Mutates `watch`.
    pub fn watch_alerts(&self, trades: &[Trade], watch: &mut WatchState) -> Vec<Alert> {
        let mut alerts = Vec::new();
        for trade in trades {
            if !watch.known_wallets.contains(&trade.wallet) && trade.usd_value >= self.new_wallet_min_usd {
                watch.known_wallets.insert(trade.wallet.clone());
                alerts.push(Alert::NewWallet { trade: trade.clone() });
            }

            if let Some(reason) = watch.watch_reason(trade) {
                if watch.seen_trades.insert(trade.dedup_key()) {
                    alerts.push(Alert::WatchedTrade { trade: trade.clone(), reason });
                }
            }
        }
        alerts
    }

    /// Listings not announced before. Mutates `watch.seen_events`.
    pub fn new_listings(&self, listings: Vec<Listing>, watch: &mut WatchState, now: DateTime<Utc>) -> Vec<Alert> {
        listings
            .into_iter()
            .filter(|l| watch.seen_events.insert(&l.id))
            .map(|listing| {
                let days_left = listing.end_date.map(|end| days_until(now, end));
                Alert::NewListing { listing, days_left }
            })
            .collect()
    }
}

/// Whole days remaining, rounded up. Zero or negative means expired.
fn days_until(now: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let secs = (end - now).num_seconds();
    if secs <= 0 {
        secs.div_euclid(86_400)
    } else {
        (secs + 86_399) / 86_400
    }
}
