/// Polymarket API endpoints
pub const GAMMA_API: &str = "https://gamma-api.polymarket.com";
pub const DATA_API: &str = "https://data-api.polymarket.com";

// Data API (public trade feed)
pub const TRADES: &str = "/trades";

// Gamma (market discovery)
pub const EVENTS: &str = "/events";

// Telegram
pub const TELEGRAM_API: &str = "https://api.telegram.org";
