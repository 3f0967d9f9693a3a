//! Cartel Core - Listing aggregation and deal surfacing for the sniper dashboard.
//!
//! This module provides:
//! - The listing data model with lenient wire decoding
//! - Deal category classification and filter mapping
//! - The enrichment, filter, and sort pipeline behind the dashboard grid
//! - HTTP clients for the listings API and the CoinGecko price oracle

pub mod clients;
pub mod models;
pub mod pipeline;

pub use models::{CartelCategory, CategoryFilter, ConfidenceBand, Listing};
pub use pipeline::{filter_and_sort, EnrichedListing, ListingQuery, SortKey};
