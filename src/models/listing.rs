use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{deserialize_string_f64, deserialize_string_id};

/// Raw event from the Gamma API `/events` listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default, deserialize_with = "deserialize_string_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_f64")]
    pub volume24hr: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_f64")]
    pub volume: Option<f64>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// A newly listed event worth announcing
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub slug: String,
    /// 24h volume, falling back to lifetime volume
    pub volume: Option<f64>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Listing {
    /// Events without an id can't be de-duplicated and are skipped.
    pub fn from_raw(raw: RawEvent) -> Option<Self> {
        let id = raw.id?;
        let title = [raw.title, raw.question]
            .into_iter()
            .flatten()
            .find(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Untitled Market".to_string());
        let volume = raw
            .volume24hr
            .filter(|v| v.is_finite() && *v > 0.0)
            .or(raw.volume.filter(|v| v.is_finite() && *v > 0.0));
        let end_date = raw
            .end_date
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Some(Listing {
            id,
            title,
            slug: raw.slug.unwrap_or_default(),
            volume,
            end_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gamma_event() {
        let raw: RawEvent = serde_json::from_str(
            r#"{"id":"16085","title":"","question":"Solana above $300?","slug":"sol-300","volume24hr":0,"volume":"12500.5","endDate":"2026-12-31T12:00:00Z"}"#,
        )
        .unwrap();
        let listing = Listing::from_raw(raw).unwrap();
        assert_eq!(listing.id, "16085");
        assert_eq!(listing.title, "Solana above $300?");
        assert_eq!(listing.volume, Some(12500.5));
        assert!(listing.end_date.is_some());
    }

    #[test]
    fn test_numeric_id_and_missing_title() {
        let raw: RawEvent = serde_json::from_str(r#"{"id":42,"slug":"x","endDate":"soon"}"#).unwrap();
        let listing = Listing::from_raw(raw).unwrap();
        assert_eq!(listing.id, "42");
        assert_eq!(listing.title, "Untitled Market");
        assert_eq!(listing.volume, None);
        assert_eq!(listing.end_date, None);
    }

    #[test]
    fn test_event_without_id_is_skipped() {
        let raw: RawEvent = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert!(Listing::from_raw(raw).is_none());
    }
}
