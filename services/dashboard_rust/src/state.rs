//! Dashboard session state and its transition functions.
//!
//! All mutation of shared session state goes through the methods here, so the
//! status machine and the stale-response rule live in one place. Fetch tasks
//! feed responses in with the sequence number their request was issued under;
//! the container drops anything older than what it has already consumed.

use cartel_rust_core::models::Listing;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of the session's listings feed.
///
/// `loading` until the first listings response resolves, then `live`. Only a
/// failed first load enters `error`; a later successful refresh recovers to
/// `live`. Background failures never leave `live`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Loading,
    Live,
    Error,
}

impl ApiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiStatus::Loading => "loading",
            ApiStatus::Live => "live",
            ApiStatus::Error => "error",
        }
    }
}

impl Default for ApiStatus {
    fn default() -> Self {
        ApiStatus::Loading
    }
}

/// What a transition did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Consumed, visible state changed.
    Updated,
    /// Consumed, but visible state was deliberately kept.
    Swallowed,
    /// Older than a response already consumed; dropped without touching state.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub listings: Vec<Listing>,
    pub sol_price_usd: Option<f64>,
    pub status: ApiStatus,
    pub last_error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    // Highest sequence consumed per fetcher, successes and failures alike
    listings_seq: u64,
    price_seq: u64,
}

/// Point-in-time view of the session for logging and status lines.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub status: ApiStatus,
    pub listings_count: usize,
    pub sol_price_usd: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a successful listings response: replace the snapshot, move to
    /// `live`, clear any recorded error.
    pub fn apply_listings(
        &mut self,
        seq: u64,
        listings: Vec<Listing>,
        now: DateTime<Utc>,
    ) -> ApplyOutcome {
        if seq <= self.listings_seq {
            return ApplyOutcome::Stale;
        }
        self.listings_seq = seq;
        self.listings = listings;
        self.status = ApiStatus::Live;
        self.last_error = None;
        self.last_updated = Some(now);
        ApplyOutcome::Updated
    }

    /// Consume a failed listings response.
    ///
    /// A failure only surfaces while still `loading`; once `live` or already
    /// `error` the previous state is kept and the failure is the caller's to
    /// log. The first recorded error message wins.
    pub fn apply_listings_error(&mut self, seq: u64, error: &str) -> ApplyOutcome {
        if seq <= self.listings_seq {
            return ApplyOutcome::Stale;
        }
        self.listings_seq = seq;
        match self.status {
            ApiStatus::Loading => {
                self.status = ApiStatus::Error;
                self.last_error = Some(error.to_string());
                ApplyOutcome::Updated
            }
            ApiStatus::Live | ApiStatus::Error => ApplyOutcome::Swallowed,
        }
    }

    /// Consume a SOL/USD rate. Non-positive rates are rejected and the last
    /// known rate kept.
    pub fn apply_price(&mut self, seq: u64, rate: f64) -> ApplyOutcome {
        if seq <= self.price_seq {
            return ApplyOutcome::Stale;
        }
        self.price_seq = seq;
        if rate <= 0.0 {
            return ApplyOutcome::Swallowed;
        }
        self.sol_price_usd = Some(rate);
        ApplyOutcome::Updated
    }

    /// Consume a failed rate fetch. Advances the watermark so a slower,
    /// older success cannot land afterwards; the rate itself is untouched.
    pub fn apply_price_error(&mut self, seq: u64) -> ApplyOutcome {
        if seq <= self.price_seq {
            return ApplyOutcome::Stale;
        }
        self.price_seq = seq;
        ApplyOutcome::Swallowed
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            status: self.status,
            listings_count: self.listings.len(),
            sol_price_usd: self.sol_price_usd,
            last_updated: self.last_updated,
            last_error: self.last_error.clone(),
        }
    }
}
