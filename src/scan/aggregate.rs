use std::collections::HashMap;

use crate::models::trade::Trade;

/// Words that make a market "crypto-ish" for the high-volume rule.
/// Deliberately loose: "market" alone matches most titles.
const CRYPTO_KEYWORDS: &[&str] = &[
    "bitcoin", "ethereum", "solana", "crypto", "token", "airdrop", "exchange",
    "launch", "price", "sale", "dip", "cap", "buyback", "fdv", "market",
];

/// Bucket label for trades that carry no outcome
pub const UNKNOWN_OUTCOME: &str = "UNKNOWN";

/// Insertion-ordered string-keyed map. Iteration order is first-seen order,
/// which is what ranking ties fall back on.
#[derive(Debug, Clone, PartialEq)]
pub struct Ordered<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Default for Ordered<V> {
    fn default() -> Self {
        Self { entries: Vec::new(), index: HashMap::new() }
    }
}

impl<V> Ordered<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: &str, make: F) -> &mut V {
        let i = match self.index.get(key) {
            Some(&i) => i,
            None => {
                self.entries.push((key.to_string(), make()));
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[i].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalletAggregate {
    pub total_usd: f64,
    /// First trade seen for this wallet in the window, used for display
    pub first_trade: Trade,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketAggregate {
    pub market_id: String,
    pub title: String,
    pub slug: String,
    pub total_usd: f64,
    /// outcome label -> wallet -> usd
    pub outcomes: Ordered<Ordered<f64>>,
}

impl MarketAggregate {
    /// Highest-spending wallets for one outcome, descending; ties keep first-seen order.
    pub fn top_wallets(&self, outcome: &str, n: usize) -> Vec<(String, f64)> {
        let Some(wallets) = self.outcomes.get(outcome) else {
            return Vec::new();
        };
        let mut ranked: Vec<(String, f64)> = wallets.iter().map(|(w, usd)| (w.to_string(), *usd)).collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(n);
        ranked
    }
}

/// Map raw outcome labels onto YES/NO where that's what they mean.
pub fn normalize_outcome(label: Option<&str>) -> String {
    let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) else {
        return UNKNOWN_OUTCOME.to_string();
    };
    match label.to_lowercase().as_str() {
        "yes" | "up" => "YES".to_string(),
        "no" | "down" => "NO".to_string(),
        _ => label.to_string(),
    }
}

pub fn is_crypto_market(trade: &Trade) -> bool {
    let haystack = format!("{} {}", trade.title, trade.slug).to_lowercase();
    CRYPTO_KEYWORDS.iter().any(|kw| haystack.contains(kw))
}

pub fn aggregate_by_wallet(trades: &[Trade]) -> Ordered<WalletAggregate> {
    let mut wallets: Ordered<WalletAggregate> = Ordered::default();
    for trade in trades {
        let agg = wallets.get_or_insert_with(&trade.wallet, || WalletAggregate {
            total_usd: 0.0,
            first_trade: trade.clone(),
        });
        agg.total_usd += trade.usd_value;
    }
    wallets
}

/// Aggregate per market, bucketed by normalized outcome and then by wallet.
/// `keep` is applied before anything is counted.
pub fn aggregate_by_market<F>(trades: &[Trade], keep: F) -> Ordered<MarketAggregate>
where
    F: Fn(&Trade) -> bool,
{
    let mut markets: Ordered<MarketAggregate> = Ordered::default();
    for trade in trades.iter().filter(|t| keep(*t)) {
        let agg = markets.get_or_insert_with(&trade.market_id, || MarketAggregate {
            market_id: trade.market_id.clone(),
            title: trade.title.clone(),
            slug: trade.slug.clone(),
            total_usd: 0.0,
            outcomes: Ordered::default(),
        });
        agg.total_usd += trade.usd_value;

        let outcome = normalize_outcome(trade.outcome.as_deref());
        let by_wallet = agg.outcomes.get_or_insert_with(&outcome, Ordered::default);
        *by_wallet.get_or_insert_with(&trade.wallet, || 0.0) += trade.usd_value;
    }
    markets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::testing::{trade, trade_in};

    #[test]
    fn test_wallet_totals_are_additive() {
        let trades = vec![
            trade("0xa", "m1", 300.0, 0),
            trade("0xb", "m1", 50.0, 0),
            trade("0xa", "m2", 250.0, 0),
            trade("0xa", "m1", 350.0, 0),
        ];
        let wallets = aggregate_by_wallet(&trades);
        assert_eq!(wallets.len(), 2);

        let a = wallets.get("0xa").unwrap();
        assert_eq!(a.total_usd, 900.0);
        assert_eq!(a.first_trade.market_id, "m1");

        let sum: f64 = wallets.values().map(|w| w.total_usd).sum();
        let expected: f64 = trades.iter().map(|t| t.usd_value).sum();
        assert_eq!(sum, expected);
    }

    #[test]
    fn test_wallet_keys_are_full_addresses() {
        let trades = vec![
            trade("0x1234567890aaaa", "m", 1.0, 0),
            trade("0x1234567890bbbb", "m", 1.0, 0),
        ];
        assert_eq!(aggregate_by_wallet(&trades).len(), 2);
    }

    #[test]
    fn test_normalize_outcome() {
        assert_eq!(normalize_outcome(Some("Yes")), "YES");
        assert_eq!(normalize_outcome(Some("UP")), "YES");
        assert_eq!(normalize_outcome(Some("no")), "NO");
        assert_eq!(normalize_outcome(Some("Down")), "NO");
        assert_eq!(normalize_outcome(Some("Trump")), "Trump");
        assert_eq!(normalize_outcome(None), UNKNOWN_OUTCOME);
        assert_eq!(normalize_outcome(Some("  ")), UNKNOWN_OUTCOME);
    }

    #[test]
    fn test_market_buckets_by_outcome_and_wallet() {
        let trades = vec![
            trade_in("0xa", "m1", 100.0, Some("Yes"), "Bitcoin above 100k?", "btc-100k"),
            trade_in("0xb", "m1", 40.0, Some("No"), "Bitcoin above 100k?", "btc-100k"),
            trade_in("0xa", "m1", 60.0, Some("yes"), "Bitcoin above 100k?", "btc-100k"),
            trade_in("0xc", "m1", 10.0, Some("down"), "Bitcoin above 100k?", "btc-100k"),
        ];
        let markets = aggregate_by_market(&trades, |_| true);
        let m1 = markets.get("m1").unwrap();
        assert_eq!(m1.total_usd, 210.0);
        assert_eq!(m1.outcomes.len(), 2);
        assert_eq!(m1.outcomes.get("YES").unwrap().get("0xa"), Some(&160.0));
        assert_eq!(
            m1.top_wallets("NO", 5),
            vec![("0xb".to_string(), 40.0), ("0xc".to_string(), 10.0)]
        );
    }

    #[test]
    fn test_top_wallets_ties_keep_first_seen_order() {
        let trades = vec![
            trade_in("0xa", "m", 10.0, Some("Yes"), "t", "s"),
            trade_in("0xb", "m", 30.0, Some("Yes"), "t", "s"),
            trade_in("0xc", "m", 10.0, Some("Yes"), "t", "s"),
        ];
        let markets = aggregate_by_market(&trades, |_| true);
        let top = markets.get("m").unwrap().top_wallets("YES", 5);
        let order: Vec<&str> = top.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(order, vec!["0xb", "0xa", "0xc"]);
        assert_eq!(markets.get("m").unwrap().top_wallets("YES", 1).len(), 1);
        assert!(markets.get("m").unwrap().top_wallets("NO", 5).is_empty());
    }

    #[test]
    fn test_market_filter_applies_before_aggregation() {
        let trades = vec![
            trade_in("0xa", "m1", 100.0, Some("Yes"), "Will Solana flip ETH?", "sol-flip"),
            trade_in("0xa", "m2", 100.0, Some("Yes"), "Lakers vs Celtics", "nba-lal-bos"),
        ];
        let markets = aggregate_by_market(&trades, is_crypto_market);
        assert_eq!(markets.len(), 1);
        assert!(markets.get("m1").is_some());
    }

    #[test]
    fn test_crypto_keyword_match_uses_title_and_slug() {
        let by_slug = trade_in("0xa", "m", 1.0, None, "Who wins?", "ethereum-etf-approval");
        let by_title = trade_in("0xa", "m", 1.0, None, "Token launch by June?", "x");
        let neither = trade_in("0xa", "m", 1.0, None, "Who wins the Super Bowl?", "super-bowl");
        assert!(is_crypto_market(&by_slug));
        assert!(is_crypto_market(&by_title));
        assert!(!is_crypto_market(&neither));
    }
}
