//! Alert → Telegram message text (HTML parse mode). No I/O.

use chrono::{DateTime, Utc};

use crate::models::trade::Trade;
use crate::scan::classify::Alert;
use crate::scan::watch::WatchReason;

const MARKET_URL: &str = "https://polymarket.com/market";
const EVENT_URL: &str = "https://polymarket.com/event";

pub fn format_alert(alert: &Alert) -> String {
    match alert {
        Alert::WhaleTrade { trade, usd_value, implied_probability, strength } => {
            let odds = match (implied_probability, strength) {
                (Some(p), Some(s)) => format!("\n📈 <b>Odds:</b> {}% ({})", p, s),
                _ => String::new(),
            };
            format!(
                "🐳 <b>Whale Trade Detected</b>\n\n\
                 📊 <b>Market:</b> {}\n\
                 🆔 <code>{}</code>\n\
                 🎯 <b>Outcome:</b> {}{}\n\n\
                 👛 Wallet: <code>{}</code>\n\
                 🔄 Action: <b>{}</b>\n\
                 💰 Size: <b>{}</b>\n\
                 ⏱ Time: {}\n\n\
                 🔗 {}",
                html_escape(&trade.title),
                html_escape(&trade.market_id),
                html_escape(trade.outcome.as_deref().unwrap_or("N/A")),
                odds,
                abbreviate_wallet(&trade.wallet),
                trade.side.map(|s| s.to_string()).unwrap_or_else(|| "N/A".to_string()),
                usd(*usd_value),
                format_time(trade.timestamp),
                link(MARKET_URL, &trade.slug, "Place Trade"),
            )
        }
        Alert::TopTraders { window_secs, traders } => {
            let mut msg = format!("🧠 <b>Top Traders (last {})</b>\n\n", describe_window(*window_secs));
            for (i, t) in traders.iter().enumerate() {
                let market = format!("<b>{}</b>", html_escape(&t.market_title));
                msg.push_str(&format!(
                    "{}. <code>{}</code>\n   💰 {} on {}\n\n",
                    i + 1,
                    abbreviate_wallet(&t.wallet),
                    usd(t.total_usd),
                    link(MARKET_URL, &t.market_slug, &market),
                ));
            }
            msg.trim_end().to_string()
        }
        Alert::HighVolumeMarket { market_id, title, slug, total_usd, window_secs, holders } => {
            let mut msg = format!(
                "🔥 <b>High-Volume Market</b>\n\n\
                 📊 <b>{}</b>\n\
                 🆔 <code>{}</code>\n\
                 💰 Volume (last {}): <b>{}</b>\n",
                html_escape(title),
                html_escape(market_id),
                describe_window(*window_secs),
                usd(*total_usd),
            );
            for bucket in holders.iter().filter(|h| !h.wallets.is_empty()) {
                msg.push_str(&format!("\n<b>{}</b>\n", html_escape(&bucket.outcome)));
                for (i, (wallet, amount)) in bucket.wallets.iter().enumerate() {
                    msg.push_str(&format!("{}. <code>{}</code> {}\n", i + 1, abbreviate_wallet(wallet), usd(*amount)));
                }
            }
            msg.push_str(&format!("\n🔗 {}", link(MARKET_URL, slug, "View Market")));
            msg
        }
        Alert::NewWallet { trade } => format!(
            "🆕 <b>New Wallet</b>\n\n{}",
            trade_summary(trade),
        ),
        Alert::WatchedTrade { trade, reason } => {
            let what = match reason {
                WatchReason::Wallet => "Wallet",
                WatchReason::Market => "Market",
            };
            format!("👀 <b>Watched {} Activity</b>\n\n{}", what, trade_summary(trade))
        }
        Alert::NewListing { listing, days_left } => {
            let ends = match (listing.end_date, days_left) {
                (Some(end), Some(days)) if *days > 0 => format!("{} ({} days left)", end.format("%a %b %d %Y"), days),
                (Some(end), _) => format!("{} (expired)", end.format("%a %b %d %Y")),
                (None, _) => "N/A".to_string(),
            };
            format!(
                "🚨 <b>New Polymarket Listing!</b>\n\n\
                 <b>{}</b>\n\n\
                 📅 <b>Ends:</b> {}\n\
                 💰 <b>Volume:</b> {}\n\
                 🔗 {}",
                html_escape(&listing.title),
                ends,
                listing.volume.map(usd).unwrap_or_else(|| "N/A".to_string()),
                link(EVENT_URL, &listing.slug, "View Market"),
            )
        }
        Alert::Heartbeat { window_secs } => format!(
            "🤖 <b>Bot Active</b>\n\n\
             Scanning Polymarket...\n\
             No whale trades or major activity detected in the last {}.",
            describe_window_long(*window_secs),
        ),
    }
}

fn trade_summary(trade: &Trade) -> String {
    format!(
        "👛 Wallet: <code>{}</code>\n\
         📊 <b>Market:</b> {}\n\
         🎯 <b>Outcome:</b> {} | 🔄 <b>{}</b>\n\
         💰 Size: <b>{}</b>\n\
         ⏱ Time: {}\n\n\
         🔗 {}",
        abbreviate_wallet(&trade.wallet),
        html_escape(&trade.title),
        html_escape(trade.outcome.as_deref().unwrap_or("N/A")),
        trade.side.map(|s| s.to_string()).unwrap_or_else(|| "N/A".to_string()),
        usd(trade.usd_value),
        format_time(trade.timestamp),
        link(MARKET_URL, &trade.slug, "View Market"),
    )
}

/// Two decimals, leading `$`, no digit grouping
pub fn usd(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// `0x1234...abcd`. Display only; aggregation always keys on the full address.
pub fn abbreviate_wallet(wallet: &str) -> String {
    let chars: Vec<char> = wallet.chars().collect();
    if chars.len() <= 10 {
        return html_escape(wallet);
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    html_escape(&format!("{}...{}", head, tail))
}

fn format_time(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn describe_window(secs: i64) -> String {
    if secs > 0 && secs % 60 == 0 {
        format!("{} mins", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

fn describe_window_long(secs: i64) -> String {
    if secs > 0 && secs % 60 == 0 {
        format!("{} minutes", secs / 60)
    } else {
        format!("{} seconds", secs)
    }
}

fn link(base: &str, slug: &str, label: &str) -> String {
    if slug.is_empty() {
        return label.to_string();
    }
    format!("<a href=\"{}/{}\">{}</a>", base, html_escape(slug), label)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
