//! Listings API Client
//!
//! Fetches the full marketplace listing snapshot that backs the dashboard
//! grid. The API is authenticated with a static X-API-Key header.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::ListingSource;
use crate::models::Listing;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Client for the cartel listings API.
pub struct ListingsClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl ListingsClient {
    /// Create a client with the default request timeout.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_timeout(api_url, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("CartelSniper/1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Fetch the current listing snapshot.
    ///
    /// Non-2xx responses and undecodable bodies are errors; malformed
    /// optional fields inside a record are not (see `Listing`).
    pub async fn fetch_listings(&self) -> Result<Vec<Listing>> {
        debug!("Fetching listings from {}", self.api_url);

        let response = self
            .client
            .get(&self.api_url)
            .header("X-API-Key", &self.api_key)
            .send()
            .await
            .context("Failed to fetch listings")?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(anyhow!("Listings API error: {}", status));
        }

        let listings: Vec<Listing> = response
            .json()
            .await
            .context("Failed to parse listings response")?;

        debug!("Fetched {} listings", listings.len());

        Ok(listings)
    }
}

#[async_trait]
impl ListingSource for ListingsClient {
    async fn fetch_listings(&self) -> Result<Vec<Listing>> {
        ListingsClient::fetch_listings(self).await
    }
}
