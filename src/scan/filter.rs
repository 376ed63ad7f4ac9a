use crate::models::trade::Trade;

/// Keep trades with `now - timestamp <= window_secs`, in input order.
///
/// There is no lower bound: trades stamped in the future stay in the window.
/// Records whose timestamp could not be parsed never reach this point, they
/// are rejected by `Trade::try_from`.
pub fn filter_recent(trades: Vec<Trade>, now: i64, window_secs: i64) -> Vec<Trade> {
    trades
        .into_iter()
        .filter(|t| in_window(t.timestamp, now, window_secs))
        .collect()
}

pub fn in_window(timestamp: i64, now: i64, window_secs: i64) -> bool {
    now.saturating_sub(timestamp) <= window_secs
}
