//! DashboardSession: the live aggregation session behind the grid
//!
//! Main orchestrator that coordinates:
//! - Periodic listing snapshot refreshes (fast cadence)
//! - Periodic SOL/USD rate refreshes (slow cadence)
//! - The shared state container and its stale-response bookkeeping
//! - Periodic summary logging

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use cartel_rust_core::clients::{CoinGeckoClient, ListingSource, ListingsClient, RateSource};
use cartel_rust_core::pipeline::{filter_and_sort, EnrichedListing, ListingQuery};
use chrono::Utc;
use log::{debug, error, info, warn};
use tokio::sync::RwLock;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

use crate::config::DashboardConfig;
use crate::formatters;
use crate::state::{ApiStatus, ApplyOutcome, DashboardSnapshot, DashboardState};

/// Live dashboard session over the listings API and the price oracle.
pub struct DashboardSession {
    pub config: DashboardConfig,
    listings_client: Arc<dyn ListingSource>,
    rate_client: Arc<dyn RateSource>,
    state: Arc<RwLock<DashboardState>>,
    // Issues one sequence number per request; the state container drops
    // responses that resolve out of order
    listings_seq: Arc<AtomicU64>,
    price_seq: Arc<AtomicU64>,
    pub stats: Arc<SessionStats>,
    cancel: CancellationToken,
}

#[derive(Debug, Clone)]
pub struct SessionStats {
    pub listing_refreshes: Arc<AtomicU64>,
    pub listing_failures: Arc<AtomicU64>,
    pub price_updates: Arc<AtomicU64>,
    pub price_failures: Arc<AtomicU64>,
    pub stale_drops: Arc<AtomicU64>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            listing_refreshes: Arc::new(AtomicU64::new(0)),
            listing_failures: Arc::new(AtomicU64::new(0)),
            price_updates: Arc::new(AtomicU64::new(0)),
            price_failures: Arc::new(AtomicU64::new(0)),
            stale_drops: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn snapshot(&self) -> SessionStatsSnapshot {
        SessionStatsSnapshot {
            listing_refreshes: self.listing_refreshes.load(Ordering::Relaxed),
            listing_failures: self.listing_failures.load(Ordering::Relaxed),
            price_updates: self.price_updates.load(Ordering::Relaxed),
            price_failures: self.price_failures.load(Ordering::Relaxed),
            stale_drops: self.stale_drops.load(Ordering::Relaxed),
        }
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct SessionStatsSnapshot {
    pub listing_refreshes: u64,
    pub listing_failures: u64,
    pub price_updates: u64,
    pub price_failures: u64,
    pub stale_drops: u64,
}

impl DashboardSession {
    pub fn new(config: DashboardConfig) -> Self {
        let timeout = Duration::from_secs(config.http_timeout_secs);
        let listings_client = Arc::new(ListingsClient::with_timeout(
            config.api_url.clone(),
            config.api_key.clone(),
            timeout,
        ));
        let rate_client = Arc::new(CoinGeckoClient::with_base_url(
            config.coingecko_base_url.clone(),
            timeout,
        ));
        Self::with_sources(config, listings_client, rate_client)
    }

    /// Build a session over explicit sources. Tests use this to drive the
    /// session with scripted responses.
    pub fn with_sources(
        config: DashboardConfig,
        listings_client: Arc<dyn ListingSource>,
        rate_client: Arc<dyn RateSource>,
    ) -> Self {
        Self {
            config,
            listings_client,
            rate_client,
            state: Arc::new(RwLock::new(DashboardState::new())),
            listings_seq: Arc::new(AtomicU64::new(0)),
            price_seq: Arc::new(AtomicU64::new(0)),
            stats: Arc::new(SessionStats::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Run the session until shutdown: initial load, then the two refresh
    /// loops and the summary ticker.
    pub async fn run(&self) -> Result<()> {
        info!(
            "Starting dashboard session (listings every {}s, rate every {}s)",
            self.config.listing_refresh_secs, self.config.price_refresh_secs
        );

        // Initial load: rate first so the first grid render can price in USD
        self.refresh_price().await;
        self.refresh_listings().await;

        {
            let state = self.state.read().await;
            match state.status {
                ApiStatus::Live => {
                    info!("Initial load complete: {} listings", state.listings.len())
                }
                _ => warn!("Initial load failed; retrying on the refresh cadence"),
            }
        }

        self.spawn_price_loop();
        self.spawn_listings_loop();

        let mut summary_ticker = interval(Duration::from_secs(self.config.summary_interval_secs));
        summary_ticker.tick().await; // first tick resolves immediately

        loop {
            tokio::select! {
                _ = summary_ticker.tick() => {
                    self.log_summary().await;
                }
                _ = self.cancel.cancelled() => {
                    info!("Dashboard session stopped");
                    return Ok(());
                }
            }
        }
    }

    /// Cancel the refresh loops and stop `run`.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Run one listings refresh to completion.
    pub async fn refresh_listings(&self) {
        let seq = self.listings_seq.fetch_add(1, Ordering::SeqCst) + 1;
        Self::fetch_listings_into(
            self.listings_client.clone(),
            self.state.clone(),
            self.stats.clone(),
            seq,
        )
        .await;
    }

    /// Run one rate refresh to completion.
    pub async fn refresh_price(&self) {
        let seq = self.price_seq.fetch_add(1, Ordering::SeqCst) + 1;
        Self::fetch_price_into(
            self.rate_client.clone(),
            self.state.clone(),
            self.stats.clone(),
            seq,
        )
        .await;
    }

    /// Current grid rows for a query. Pure pipeline over the shared state.
    pub async fn view(&self, query: &ListingQuery) -> Vec<EnrichedListing> {
        let state = self.state.read().await;
        filter_and_sort(&state.listings, state.sol_price_usd, query)
    }

    /// Point-in-time session status.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.state.read().await.snapshot()
    }

    fn spawn_listings_loop(&self) {
        let client = self.listings_client.clone();
        let state = self.state.clone();
        let stats = self.stats.clone();
        let seq_counter = self.listings_seq.clone();
        let cancel = self.cancel.clone();
        let period = Duration::from_secs(self.config.listing_refresh_secs);

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.tick().await; // the initial load already ran

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let seq = seq_counter.fetch_add(1, Ordering::SeqCst) + 1;
                        // Spawned so a slow response never delays the next tick
                        tokio::spawn(Self::fetch_listings_into(
                            client.clone(),
                            state.clone(),
                            stats.clone(),
                            seq,
                        ));
                    }
                    _ = cancel.cancelled() => {
                        debug!("Listings refresh loop stopped");
                        break;
                    }
                }
            }
        });
    }

    fn spawn_price_loop(&self) {
        let client = self.rate_client.clone();
        let state = self.state.clone();
        let stats = self.stats.clone();
        let seq_counter = self.price_seq.clone();
        let cancel = self.cancel.clone();
        let period = Duration::from_secs(self.config.price_refresh_secs);

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.tick().await; // the initial load already ran

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let seq = seq_counter.fetch_add(1, Ordering::SeqCst) + 1;
                        tokio::spawn(Self::fetch_price_into(
                            client.clone(),
                            state.clone(),
                            stats.clone(),
                            seq,
                        ));
                    }
                    _ = cancel.cancelled() => {
                        debug!("Rate refresh loop stopped");
                        break;
                    }
                }
            }
        });
    }

    async fn fetch_listings_into(
        client: Arc<dyn ListingSource>,
        state: Arc<RwLock<DashboardState>>,
        stats: Arc<SessionStats>,
        seq: u64,
    ) {
        match client.fetch_listings().await {
            Ok(listings) => {
                let count = listings.len();
                let outcome = state.write().await.apply_listings(seq, listings, Utc::now());
                match outcome {
                    ApplyOutcome::Updated => {
                        stats.listing_refreshes.fetch_add(1, Ordering::Relaxed);
                        debug!("Refreshed {} listings (seq {})", count, seq);
                    }
                    ApplyOutcome::Stale => {
                        stats.stale_drops.fetch_add(1, Ordering::Relaxed);
                        debug!("Dropped superseded listings response (seq {})", seq);
                    }
                    ApplyOutcome::Swallowed => {}
                }
            }
            Err(e) => {
                let outcome = state.write().await.apply_listings_error(seq, &e.to_string());
                match outcome {
                    ApplyOutcome::Updated => {
                        stats.listing_failures.fetch_add(1, Ordering::Relaxed);
                        error!("Initial listings load failed: {}", e);
                    }
                    ApplyOutcome::Swallowed => {
                        stats.listing_failures.fetch_add(1, Ordering::Relaxed);
                        warn!("Background listings refresh failed: {}", e);
                    }
                    ApplyOutcome::Stale => {
                        stats.stale_drops.fetch_add(1, Ordering::Relaxed);
                        debug!("Dropped superseded listings failure (seq {})", seq);
                    }
                }
            }
        }
    }

    async fn fetch_price_into(
        client: Arc<dyn RateSource>,
        state: Arc<RwLock<DashboardState>>,
        stats: Arc<SessionStats>,
        seq: u64,
    ) {
        match client.get_sol_price_usd().await {
            Ok(rate) => {
                let outcome = state.write().await.apply_price(seq, rate);
                match outcome {
                    ApplyOutcome::Updated => {
                        stats.price_updates.fetch_add(1, Ordering::Relaxed);
                        debug!("SOL/USD rate updated to {:.2} (seq {})", rate, seq);
                    }
                    ApplyOutcome::Swallowed => {
                        stats.price_failures.fetch_add(1, Ordering::Relaxed);
                        warn!("Ignoring non-positive SOL/USD rate {} (seq {})", rate, seq);
                    }
                    ApplyOutcome::Stale => {
                        stats.stale_drops.fetch_add(1, Ordering::Relaxed);
                        debug!("Dropped superseded rate response (seq {})", seq);
                    }
                }
            }
            Err(e) => {
                let outcome = state.write().await.apply_price_error(seq);
                match outcome {
                    ApplyOutcome::Stale => {
                        stats.stale_drops.fetch_add(1, Ordering::Relaxed);
                        debug!("Dropped superseded rate failure (seq {})", seq);
                    }
                    _ => {
                        stats.price_failures.fetch_add(1, Ordering::Relaxed);
                        warn!("SOL price refresh failed: {}", e);
                    }
                }
            }
        }
    }

    async fn log_summary(&self) {
        let now = Utc::now();
        let query = ListingQuery::default();
        let (snapshot, top) = {
            let state = self.state.read().await;
            let rows = filter_and_sort(&state.listings, state.sol_price_usd, &query);
            (state.snapshot(), rows.into_iter().take(3).collect::<Vec<_>>())
        };

        let stats = self.stats.snapshot();
        info!("{}", formatters::format_status_line(&snapshot, now));
        info!(
            "Session stats: refreshes={}, failures={}, rate_updates={}, rate_failures={}, stale_drops={}",
            stats.listing_refreshes,
            stats.listing_failures,
            stats.price_updates,
            stats.price_failures,
            stats.stale_drops
        );
        debug!(
            "Top {} listings (category {}, sort {}):",
            top.len(),
            query.category.as_str(),
            query.sort.as_str()
        );
        for row in &top {
            debug!("{}", formatters::format_listing_line(row, now));
        }
    }
}
