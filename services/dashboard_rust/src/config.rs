//! Configuration for dashboard_rust

use anyhow::{anyhow, Result};
use cartel_rust_core::clients::coingecko::COINGECKO_BASE_URL;
use std::env;

/// Seconds between listing snapshot refreshes.
pub const DEFAULT_LISTING_REFRESH_SECS: u64 = 5;
/// Seconds between SOL/USD rate refreshes.
pub const DEFAULT_PRICE_REFRESH_SECS: u64 = 60;
/// Per-request HTTP timeout. Keeps responses from arriving after the
/// ticks that superseded them have long passed.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
/// Seconds between session summary log lines.
pub const DEFAULT_SUMMARY_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    // Listings API
    pub api_url: String,
    pub api_key: String,

    // Refresh cadences
    pub listing_refresh_secs: u64,
    pub price_refresh_secs: u64,

    // HTTP
    pub http_timeout_secs: u64,
    pub coingecko_base_url: String,

    // Logging
    pub summary_interval_secs: u64,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("API_URL").map_err(|_| anyhow!("API_URL must be set"))?;
        let api_key = env::var("API_KEY").map_err(|_| anyhow!("API_KEY must be set"))?;

        let listing_refresh_secs =
            parse_u64("LISTING_REFRESH_SECS", DEFAULT_LISTING_REFRESH_SECS)?;
        let price_refresh_secs = parse_u64("PRICE_REFRESH_SECS", DEFAULT_PRICE_REFRESH_SECS)?;
        let http_timeout_secs = parse_u64("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        let summary_interval_secs =
            parse_u64("SUMMARY_INTERVAL_SECS", DEFAULT_SUMMARY_INTERVAL_SECS)?;

        if listing_refresh_secs == 0 {
            return Err(anyhow!("LISTING_REFRESH_SECS must be > 0"));
        }
        if price_refresh_secs == 0 {
            return Err(anyhow!("PRICE_REFRESH_SECS must be > 0"));
        }
        if http_timeout_secs == 0 {
            return Err(anyhow!("HTTP_TIMEOUT_SECS must be > 0"));
        }
        if summary_interval_secs == 0 {
            return Err(anyhow!("SUMMARY_INTERVAL_SECS must be > 0"));
        }

        Ok(Self {
            api_url,
            api_key,
            listing_refresh_secs,
            price_refresh_secs,
            http_timeout_secs,
            coingecko_base_url: env::var("COINGECKO_BASE_URL")
                .unwrap_or_else(|_| COINGECKO_BASE_URL.to_string()),
            summary_interval_secs,
        })
    }
}

/// Parse environment variable as u64 with default fallback
fn parse_u64(var_name: &str, default: u64) -> Result<u64> {
    match env::var(var_name) {
        Ok(val) => val.parse().map_err(|_| anyhow!("{} must be a valid u64", var_name)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests that set environment variables are avoided here; parallel test
    // runs share the process environment.

    #[test]
    fn test_parse_u64_with_default() {
        assert_eq!(parse_u64("NON_EXISTENT_VAR_ABC", 100).unwrap(), 100);
    }
}
