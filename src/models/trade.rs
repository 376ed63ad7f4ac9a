use serde::Deserialize;

use super::{deserialize_epoch_secs, deserialize_string_f64};
use crate::error::MalformedTrade;

/// Raw trade record from the data API `/trades` feed.
///
/// Feed variants disagree on field names. Each spelling is its own field
/// (a record may carry several) and [`Trade::try_from`] picks the first
/// usable one. Nothing here is validated.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct RawTrade {
    #[serde(default)]
    pub proxy_wallet: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub trader: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub condition_id: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_f64")]
    pub size: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_f64")]
    pub price: Option<f64>,
    /// Explicit USD notional, when the feed provides one
    #[serde(default, deserialize_with = "deserialize_string_f64")]
    pub usdc_size: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_f64")]
    pub usd_value: Option<f64>,
    #[serde(default, rename = "amountUSD", deserialize_with = "deserialize_string_f64")]
    pub amount_usd: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_epoch_secs")]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub event_slug: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Some(Side::Buy),
            "SELL" => Some(Side::Sell),
            _ => None,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Canonical, validated trade. `usd_value` is always finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub tx_hash: Option<String>,
    pub wallet: String,
    pub market_id: String,
    pub side: Option<Side>,
    pub size: Option<f64>,
    pub price: Option<f64>,
    pub usd_value: f64,
    pub outcome: Option<String>,
    pub timestamp: i64,
    pub title: String,
    pub slug: String,
}

impl Trade {
    /// Decode and validate one feed record. A record with a mistyped field
    /// fails on its own; the caller keeps going with the rest of the batch.
    pub fn from_record(record: serde_json::Value) -> Result<Self, MalformedTrade> {
        let raw: RawTrade = serde_json::from_value(record).map_err(|e| MalformedTrade::Undecodable(e.to_string()))?;
        Trade::try_from(raw)
    }

    /// Key used to remember a trade across overlapping scan windows
    pub fn dedup_key(&self) -> String {
        match &self.tx_hash {
            Some(hash) => format!("{}:{}", hash, self.wallet),
            None => format!("{}:{}:{}:{:.2}", self.wallet, self.market_id, self.timestamp, self.usd_value),
        }
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|v| v.is_finite())
}

impl TryFrom<RawTrade> for Trade {
    type Error = MalformedTrade;

    /// Explicit USD field wins; otherwise `size * price`. Records without a
    /// usable value are rejected rather than zero-valued.
    fn try_from(raw: RawTrade) -> Result<Self, Self::Error> {
        let wallet = non_empty(raw.proxy_wallet)
            .or_else(|| non_empty(raw.wallet_address))
            .or_else(|| non_empty(raw.trader))
            .ok_or(MalformedTrade::MissingWallet)?;
        let market_id = non_empty(raw.condition_id)
            .or_else(|| non_empty(raw.market))
            .ok_or(MalformedTrade::MissingMarket)?;
        let timestamp = raw.timestamp.ok_or(MalformedTrade::BadTimestamp)?;

        let size = finite(raw.size);
        let price = finite(raw.price);
        let explicit = finite(raw.usdc_size).or(finite(raw.usd_value)).or(finite(raw.amount_usd));
        let usd_value = match (explicit, size, price) {
            (Some(usd), _, _) => usd,
            (None, Some(size), Some(price)) => size * price,
            _ => return Err(MalformedTrade::NoUsdValue),
        };
        // size * price can still overflow
        if !usd_value.is_finite() {
            return Err(MalformedTrade::NoUsdValue);
        }

        let slug = non_empty(raw.slug).or(non_empty(raw.event_slug)).unwrap_or_default();
        let title = non_empty(raw.title).unwrap_or_else(|| slug.clone());

        Ok(Trade {
            tx_hash: non_empty(raw.transaction_hash),
            wallet,
            market_id,
            side: raw.side.as_deref().and_then(Side::parse),
            size,
            price,
            usd_value,
            outcome: non_empty(raw.outcome),
            timestamp,
            title,
            slug,
        })
    }
}
