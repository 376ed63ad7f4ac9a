use thiserror::Error;

/// Failure while pulling records from a feed (trades or listings).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("feed returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("fetch timed out after {0}s")]
    Timeout(u64),

    #[error("feed body is not a JSON array: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure while delivering one message. Never aborts the rest of a scan.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifier not configured (missing TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID)")]
    NotConfigured,

    #[error("send failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("messaging API rejected message: HTTP {0}")]
    Rejected(reqwest::StatusCode),
}

/// A feed record that could not be turned into a canonical trade.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedTrade {
    #[error("missing wallet address")]
    MissingWallet,

    #[error("missing market identifier")]
    MissingMarket,

    #[error("missing or non-numeric timestamp")]
    BadTimestamp,

    #[error("no usable USD value (size/price missing, non-numeric or out of range)")]
    NoUsdValue,

    #[error("record does not decode: {0}")]
    Undecodable(String),
}
