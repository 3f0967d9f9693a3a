// Shared listing models for the sniper dashboard services
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub mod category;

pub use category::{CartelCategory, CategoryFilter, ConfidenceBand};

/// A single marketplace listing as served by the listings API.
///
/// Every field except `token_mint` is optional and decodes leniently:
/// malformed values are treated as absent rather than failing the whole
/// snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub token_mint: String,

    // Descriptive
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub grade: Option<String>, // e.g. "PSA 10"
    #[serde(default, deserialize_with = "lenient_string")]
    pub grading_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub supply: Option<u32>, // graded population count
    #[serde(default, deserialize_with = "lenient_string")]
    pub img_url: Option<String>,

    // Pricing
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_amount: Option<f64>, // native SOL price
    #[serde(default, deserialize_with = "lenient_f64")]
    pub alt_value: Option<f64>, // ALT fair value estimate (USD)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub alt_value_lower_bound: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub alt_value_upper_bound: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub alt_value_confidence: Option<f64>, // 0-100
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_price: Option<f64>, // trailing cartel average (USD)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub insured_value: Option<f64>,

    // Classification
    #[serde(default)]
    pub cartel_category: CartelCategory,
    #[serde(default, deserialize_with = "lenient_string")]
    pub alt_asset_id: Option<String>,

    // Temporal
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub listed_at: Option<DateTime<Utc>>,
}

/// Wire value that may be a number, a string, or junk.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientValue {
    Num(f64),
    Str(String),
    Other(#[allow(dead_code)] serde_json::Value),
}

/// Numbers and numeric strings. Strings parsing to non-finite floats
/// ("NaN", "inf") are junk, not values.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<LenientValue>::deserialize(deserializer)? {
        Some(LenientValue::Num(n)) => Some(n),
        Some(LenientValue::Str(s)) => s.trim().parse().ok().filter(|v: &f64| v.is_finite()),
        _ => None,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<LenientValue>::deserialize(deserializer)? {
        Some(LenientValue::Num(n)) if n >= 0.0 => Some(n as u32),
        Some(LenientValue::Str(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<LenientValue>::deserialize(deserializer)? {
        Some(LenientValue::Str(s)) => Some(s),
        Some(LenientValue::Num(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Timestamps arrive as RFC 3339 strings, naive ISO strings (assumed UTC),
/// or unix milliseconds. Anything else is treated as absent.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<LenientValue>::deserialize(deserializer)? {
        Some(LenientValue::Str(s)) => parse_timestamp(&s),
        Some(LenientValue::Num(ms)) => DateTime::<Utc>::from_timestamp_millis(ms as i64),
        _ => None,
    })
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.and_utc())
}
