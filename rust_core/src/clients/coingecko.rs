//! CoinGecko Price Oracle Client
//!
//! Provides the SOL/USD conversion rate used to price native-SOL listings
//! in dollars. Only the /simple/price endpoint is used.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::RateSource;

/// Public CoinGecko API root.
pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// CoinGecko client scoped to the SOL/USD simple price lookup.
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
}

/// Response from the /simple/price endpoint
#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    solana: SimplePriceData,
}

#[derive(Debug, Deserialize)]
struct SimplePriceData {
    usd: f64,
}

impl CoinGeckoClient {
    /// Create a client against the public CoinGecko API.
    pub fn new() -> Self {
        Self::with_base_url(COINGECKO_BASE_URL, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client against a custom base URL (proxy or mock server).
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("CartelSniper/1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Get the current SOL price in USD.
    ///
    /// Any response shape other than `{"solana": {"usd": <positive>}}` is
    /// an error; the caller keeps its last known rate on failure.
    pub async fn get_sol_price_usd(&self) -> Result<f64> {
        let url = format!("{}/simple/price?ids=solana&vs_currencies=usd", self.base_url);

        debug!("Fetching SOL/USD rate from CoinGecko");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch from CoinGecko")?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(anyhow!("CoinGecko API error: {}", status));
        }

        let parsed: SimplePriceResponse = response
            .json()
            .await
            .context("Failed to parse CoinGecko response")?;

        let rate = parsed.solana.usd;
        if rate <= 0.0 {
            return Err(anyhow!("CoinGecko returned non-positive SOL price: {}", rate));
        }

        Ok(rate)
    }
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateSource for CoinGeckoClient {
    async fn get_sol_price_usd(&self) -> Result<f64> {
        CoinGeckoClient::get_sol_price_usd(self).await
    }
}
