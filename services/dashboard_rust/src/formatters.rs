//! Console formatting for listing rows and session status lines.

use cartel_rust_core::models::{CartelCategory, ConfidenceBand};
use cartel_rust_core::pipeline::EnrichedListing;
use chrono::{DateTime, Utc};

use crate::state::DashboardSnapshot;

const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
const MONTH: i64 = 2_592_000; // 30 days
const YEAR: i64 = 31_536_000; // 365 days

/// Coarse "how long ago" label for listing ages.
pub fn time_ago(ts: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let t = match ts {
        Some(t) => t,
        None => return "N/A".to_string(),
    };
    let seconds = now.signed_duration_since(t).num_seconds();
    if seconds < 60 {
        return "Just now".to_string();
    }
    if seconds < HOUR {
        return format!("{} mins ago", seconds / 60);
    }
    if seconds < DAY {
        return format!("{} hours ago", seconds / HOUR);
    }
    if seconds < MONTH {
        return format!("{} days ago", seconds / DAY);
    }
    if seconds < YEAR {
        return format!("{} months ago", seconds / MONTH);
    }
    format!("{} years ago", seconds / YEAR)
}

/// Signed percent difference, "N/A" when undefined.
pub fn format_difference(diff_percent: Option<f64>) -> String {
    match diff_percent {
        Some(diff) => format!("{diff:+.2}%"),
        None => "N/A".to_string(),
    }
}

/// Native SOL price with the USD conversion alongside when known.
pub fn format_price(price_amount: Option<f64>, price_usd: Option<f64>) -> String {
    let sol = match price_amount {
        Some(p) => p,
        None => return "N/A".to_string(),
    };
    let mut out = format!("{sol:.4} SOL");
    if let Some(usd) = price_usd {
        out.push_str(&format!(" (~${usd:.2})"));
    }
    out
}

/// One log line per listing row, composed left to right the way the grid
/// card lays its fields out.
pub fn format_listing_line(row: &EnrichedListing, now: DateTime<Utc>) -> String {
    let listing = &row.listing;

    let mut out = String::new();
    out.push_str(listing.name.as_deref().unwrap_or("(unnamed)"));
    if let Some(grade) = &listing.grade {
        out.push_str(&format!(" [{grade}]"));
    }
    if listing.cartel_category != CartelCategory::Unknown {
        out.push_str(&format!(" {}", listing.cartel_category.as_code()));
    }
    out.push_str(&format!(
        " | {}",
        format_price(listing.price_amount, row.price_usd)
    ));
    out.push_str(&format!(" | diff {}", format_difference(row.diff_percent)));
    match listing.alt_value {
        Some(alt) => {
            let band = ConfidenceBand::from_confidence(listing.alt_value_confidence);
            out.push_str(&format!(" | alt ${alt:.2} ({})", band.as_str()));
        }
        None => out.push_str(" | alt N/A"),
    }
    if let Some(supply) = listing.supply {
        out.push_str(&format!(" | pop {supply}"));
    }
    out.push_str(&format!(" | {}", time_ago(listing.listed_at, now)));
    out
}

/// Compact session status for the periodic summary log.
pub fn format_status_line(snapshot: &DashboardSnapshot, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str(&format!("status={}", snapshot.status.as_str()));
    out.push_str(&format!(" listings={}", snapshot.listings_count));
    match snapshot.sol_price_usd {
        Some(rate) => out.push_str(&format!(" sol=${rate:.2}")),
        None => out.push_str(" sol=N/A"),
    }
    out.push_str(&format!(" updated={}", time_ago(snapshot.last_updated, now)));
    if let Some(error) = &snapshot.last_error {
        out.push_str(&format!(" error=\"{error}\""));
    }
    out
}
