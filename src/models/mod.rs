pub mod listing;
pub mod trade;

use serde::{Deserialize, Deserializer};

/// Deserialize a value that might be a string or a number as f64
pub(crate) fn deserialize_string_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNum {
        Num(f64),
        Str(String),
        Null,
    }
    match StringOrNum::deserialize(deserializer)? {
        StringOrNum::Num(n) => Ok(Some(n)),
        StringOrNum::Str(s) => Ok(s.trim().parse::<f64>().ok()),
        StringOrNum::Null => Ok(None),
    }
}

/// Deserialize an epoch-seconds timestamp sent as an integer, a float or a numeric string.
/// Anything else becomes `None` so the record can be rejected explicitly later.
pub(crate) fn deserialize_epoch_secs<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Epoch {
        Int(i64),
        Float(f64),
        Str(String),
        Null,
    }
    let from_float = |f: f64| f.is_finite().then(|| f.trunc() as i64);
    match Epoch::deserialize(deserializer)? {
        Epoch::Int(n) => Ok(Some(n)),
        Epoch::Float(f) => Ok(from_float(f)),
        Epoch::Str(s) => {
            let s = s.trim();
            Ok(s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(from_float)))
        }
        Epoch::Null => Ok(None),
    }
}

/// Deserialize an identifier that some feeds send as a number and others as a string
pub(crate) fn deserialize_string_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
