//! HTTP clients for the dashboard's two upstream data sources.
//!
//! The session depends on the `ListingSource` and `RateSource` traits rather
//! than the concrete clients, so tests can drive it with scripted sources.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Listing;

pub mod coingecko;
pub mod listings;

// Re-export commonly used types
pub use coingecko::CoinGeckoClient;
pub use listings::ListingsClient;

/// Source of marketplace listing snapshots.
///
/// Implementations must be Send + Sync for use in async contexts.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch the current full listing snapshot.
    async fn fetch_listings(&self) -> Result<Vec<Listing>>;
}

/// Source of the SOL/USD conversion rate.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch the current SOL price in USD. Must return a positive rate.
    async fn get_sol_price_usd(&self) -> Result<f64>;
}
