use std::collections::{HashSet, VecDeque};

use crate::config::WatchConfig;
use crate::models::trade::Trade;

/// Once a set grows past `capacity`, only the `retain` most recent ids survive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimPolicy {
    pub capacity: usize,
    pub retain: usize,
}

/// Insertion-ordered id set with a size cap
#[derive(Debug, Clone)]
pub struct RecentSet {
    order: VecDeque<String>,
    members: HashSet<String>,
    policy: TrimPolicy,
}

impl RecentSet {
    pub fn new(policy: TrimPolicy) -> Self {
        Self {
            order: VecDeque::new(),
            members: HashSet::new(),
            policy: TrimPolicy {
                capacity: policy.capacity,
                retain: policy.retain.min(policy.capacity),
            },
        }
    }

    #[cfg(test)]
    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// Returns true if the id was not already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if !self.members.insert(id.to_string()) {
            return false;
        }
        self.order.push_back(id.to_string());

        if self.order.len() > self.policy.capacity {
            while self.order.len() > self.policy.retain {
                if let Some(old) = self.order.pop_front() {
                    self.members.remove(&old);
                }
            }
        }
        true
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.order.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchReason {
    Wallet,
    Market,
}

/// State that outlives a single scan. Lost on restart.
#[derive(Debug, Clone)]
pub struct WatchState {
    pub known_wallets: HashSet<String>,
    /// Lowercased addresses
    pub watched_wallets: HashSet<String>,
    /// Condition ids or slugs
    pub watched_markets: HashSet<String>,
    /// Watched trades already announced
    pub seen_trades: HashSet<String>,
    /// Listing ids already announced
    pub seen_events: RecentSet,
}

impl WatchState {
    pub fn new(config: &WatchConfig) -> Self {
        let mut state = Self {
            known_wallets: HashSet::new(),
            watched_wallets: HashSet::new(),
            watched_markets: HashSet::new(),
            seen_trades: HashSet::new(),
            seen_events: RecentSet::new(TrimPolicy {
                capacity: config.seen_capacity,
                retain: config.seen_retain,
            }),
        };
        for wallet in &config.wallets {
            state.watch_wallet(wallet);
        }
        for market in &config.markets {
            state.watch_market(market);
        }
        state
    }

    pub fn watch_wallet(&mut self, wallet: &str) {
        self.watched_wallets.insert(wallet.trim().to_lowercase());
    }

    pub fn watch_market(&mut self, market: &str) {
        self.watched_markets.insert(market.trim().to_string());
    }

    pub fn watch_reason(&self, trade: &Trade) -> Option<WatchReason> {
        if self.watched_wallets.contains(&trade.wallet.to_lowercase()) {
            Some(WatchReason::Wallet)
        } else if self.watched_markets.contains(&trade.market_id)
            || (!trade.slug.is_empty() && self.watched_markets.contains(&trade.slug))
        {
            Some(WatchReason::Market)
        } else {
            None
        }
    }
}
