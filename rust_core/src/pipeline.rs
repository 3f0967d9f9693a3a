//! Enrichment, filtering, and sorting behind the dashboard listing grid.
//!
//! Everything here is a pure function of its inputs: the session supplies the
//! latest listings snapshot and SOL/USD rate, the UI supplies the query, and
//! the output is the exact row order the grid renders.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{CategoryFilter, Listing};

/// Sort keys offered by the dashboard toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    PriceLow,
    PriceHigh,
    DifferencePercent,
    Popularity,
    ListedTime,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::PriceLow => "price-low",
            SortKey::PriceHigh => "price-high",
            SortKey::DifferencePercent => "difference-percent",
            SortKey::Popularity => "popularity",
            SortKey::ListedTime => "listed-time",
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        SortKey::ListedTime
    }
}

/// UI query state: free-text search, category filter, and sort key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub category: CategoryFilter,
    #[serde(default)]
    pub sort: SortKey,
}

/// A listing joined with the SOL/USD rate: one row of the rendered grid.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedListing {
    #[serde(flatten)]
    pub listing: Listing,
    /// Asking price converted to USD, when both price and rate are known.
    pub price_usd: Option<f64>,
    /// Premium (+) or discount (-) of the USD price against `alt_value`.
    pub diff_percent: Option<f64>,
}

/// Join a listing with the current SOL/USD rate.
///
/// `price_usd` requires a positive `price_amount` and a known rate;
/// `diff_percent` additionally requires a positive `alt_value`. Anything
/// missing leaves the derived field undefined rather than guessing.
pub fn enrich(listing: Listing, sol_price_usd: Option<f64>) -> EnrichedListing {
    let price_usd = match (listing.price_amount, sol_price_usd) {
        (Some(price), Some(rate)) if price > 0.0 => Some(price * rate),
        _ => None,
    };
    let diff_percent = match (price_usd, listing.alt_value) {
        (Some(usd), Some(alt)) if alt > 0.0 => Some((usd - alt) / alt * 100.0),
        _ => None,
    };
    EnrichedListing {
        listing,
        price_usd,
        diff_percent,
    }
}

/// Case-insensitive substring match against name, grading id, and supply.
/// An empty query matches everything.
fn matches_search(listing: &Listing, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let q = query.to_lowercase();
    let name_match = listing
        .name
        .as_deref()
        .map_or(false, |n| n.to_lowercase().contains(&q));
    let grading_match = listing
        .grading_id
        .as_deref()
        .map_or(false, |g| g.to_lowercase().contains(&q));
    let supply_match = listing
        .supply
        .map_or(false, |s| s.to_string().contains(&q));
    name_match || grading_match || supply_match
}

/// UNKNOWN listings match nothing but the `all` filter.
fn matches_category(listing: &Listing, filter: CategoryFilter) -> bool {
    match filter.target_category() {
        Some(category) => listing.cartel_category == category,
        None => true,
    }
}

/// Missing and non-finite values compare as zero; NaN must never reach the
/// comparator, where it would break the total order `sort_by` requires.
fn sort_value(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

fn compare_listings(a: &EnrichedListing, b: &EnrichedListing, sort: SortKey) -> Ordering {
    match sort {
        SortKey::PriceLow => {
            let pa = sort_value(a.listing.price_amount);
            let pb = sort_value(b.listing.price_amount);
            pa.partial_cmp(&pb).unwrap_or(Ordering::Equal)
        }
        SortKey::PriceHigh => {
            let pa = sort_value(a.listing.price_amount);
            let pb = sort_value(b.listing.price_amount);
            pb.partial_cmp(&pa).unwrap_or(Ordering::Equal)
        }
        SortKey::DifferencePercent => {
            let da = sort_value(a.diff_percent);
            let db = sort_value(b.diff_percent);
            da.partial_cmp(&db).unwrap_or(Ordering::Equal)
        }
        SortKey::Popularity => {
            let sa = a.listing.supply.unwrap_or(0);
            let sb = b.listing.supply.unwrap_or(0);
            sa.cmp(&sb)
        }
        // Newest first; listings without a timestamp sort last
        SortKey::ListedTime => match (a.listing.listed_at, b.listing.listed_at) {
            (Some(ta), Some(tb)) => tb.cmp(&ta),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

/// Run the full listing pipeline: filter, enrich, then sort.
///
/// Steps mirror the dashboard grid:
/// 1. Drop listings failing the text search or the category filter (AND)
/// 2. Join each survivor with the SOL/USD rate (`enrich`)
/// 3. Stable-sort by the requested key; ties keep input order
///
/// The pipeline never fails: missing and non-finite values compare as zero,
/// and missing values render as "N/A" downstream.
pub fn filter_and_sort(
    listings: &[Listing],
    sol_price_usd: Option<f64>,
    query: &ListingQuery,
) -> Vec<EnrichedListing> {
    let mut rows: Vec<EnrichedListing> = listings
        .iter()
        .filter(|l| matches_search(l, &query.search) && matches_category(l, query.category))
        .cloned()
        .map(|l| enrich(l, sol_price_usd))
        .collect();
    rows.sort_by(|a, b| compare_listings(a, b, query.sort));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CartelCategory;
    use chrono::{TimeZone, Utc};

    fn make_listing(token_mint: &str, name: &str, price: Option<f64>, alt: Option<f64>) -> Listing {
        Listing {
            token_mint: token_mint.to_string(),
            name: Some(name.to_string()),
            price_amount: price,
            alt_value: alt,
            ..Default::default()
        }
    }

    fn sample_listings() -> Vec<Listing> {
        vec![
            Listing {
                grading_id: Some("89217744".to_string()),
                supply: Some(42),
                alt_value_confidence: Some(82.5),
                cartel_category: CartelCategory::Autobuy,
                listed_at: Some(Utc.with_ymd_and_hms(2025, 9, 12, 10, 0, 0).unwrap()),
                ..make_listing("m1", "Charizard", Some(2.0), Some(100.0))
            },
            Listing {
                supply: Some(900),
                cartel_category: CartelCategory::Good,
                listed_at: Some(Utc.with_ymd_and_hms(2025, 9, 12, 11, 30, 0).unwrap()),
                ..make_listing("m2", "Pikachu", Some(0.5), Some(40.0))
            },
            make_listing("m3", "Blastoise", None, None),
            Listing {
                supply: Some(7),
                cartel_category: CartelCategory::Ok,
                listed_at: Some(Utc.with_ymd_and_hms(2025, 9, 11, 8, 0, 0).unwrap()),
                ..make_listing("m4", "Mewtwo", Some(10.0), Some(480.0))
            },
        ]
    }

    fn mints(rows: &[EnrichedListing]) -> Vec<&str> {
        rows.iter().map(|r| r.listing.token_mint.as_str()).collect()
    }

    #[test]
    fn test_diff_percent_formula() {
        // 2 SOL * $60 = $120 USD; (120 - 100) / 100 * 100 = +20%
        let row = enrich(make_listing("m1", "Charizard", Some(2.0), Some(100.0)), Some(60.0));
        assert_eq!(row.price_usd, Some(120.0));
        assert_eq!(row.diff_percent, Some(20.0));
    }

    #[test]
    fn test_enrich_undefined_cases() {
        // No rate known yet: nothing derivable
        let row = enrich(make_listing("a", "X", Some(2.0), Some(100.0)), None);
        assert_eq!(row.price_usd, None);
        assert_eq!(row.diff_percent, None);

        // Zero price is not a price
        let row = enrich(make_listing("b", "X", Some(0.0), Some(100.0)), Some(60.0));
        assert_eq!(row.price_usd, None);

        // Missing alt_value: USD price still derivable, difference is not
        let row = enrich(make_listing("c", "X", Some(2.0), None), Some(60.0));
        assert_eq!(row.price_usd, Some(120.0));
        assert_eq!(row.diff_percent, None);

        // Non-positive alt_value never divides
        let row = enrich(make_listing("d", "X", Some(2.0), Some(0.0)), Some(60.0));
        assert_eq!(row.diff_percent, None);
    }

    #[test]
    fn test_output_is_permutation_of_filtered_input() {
        let listings = sample_listings();
        let keys = [
            SortKey::PriceLow,
            SortKey::PriceHigh,
            SortKey::DifferencePercent,
            SortKey::Popularity,
            SortKey::ListedTime,
        ];
        for sort in keys {
            let query = ListingQuery {
                sort,
                ..Default::default()
            };
            let rows = filter_and_sort(&listings, Some(60.0), &query);
            let mut got = mints(&rows);
            got.sort();
            assert_eq!(got, vec!["m1", "m2", "m3", "m4"], "sort {:?}", sort);
        }
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let listings = sample_listings();
        let query = ListingQuery {
            search: "a".to_string(),
            category: CategoryFilter::All,
            sort: SortKey::PriceLow,
        };
        let once = filter_and_sort(&listings, Some(60.0), &query);
        let again: Vec<Listing> = once.iter().map(|r| r.listing.clone()).collect();
        let twice = filter_and_sort(&again, Some(60.0), &query);
        assert_eq!(mints(&once), mints(&twice));
    }

    #[test]
    fn test_price_low_reversed_equals_price_high() {
        // Every listing here has a price, so the two orders are exact mirrors
        let listings: Vec<Listing> = sample_listings()
            .into_iter()
            .filter(|l| l.price_amount.is_some())
            .collect();
        let low = filter_and_sort(
            &listings,
            Some(60.0),
            &ListingQuery {
                sort: SortKey::PriceLow,
                ..Default::default()
            },
        );
        let high = filter_and_sort(
            &listings,
            Some(60.0),
            &ListingQuery {
                sort: SortKey::PriceHigh,
                ..Default::default()
            },
        );
        let mut reversed = mints(&low);
        reversed.reverse();
        assert_eq!(reversed, mints(&high));
    }

    #[test]
    fn test_search_matches() {
        let listings = sample_listings();

        let query = |s: &str| ListingQuery {
            search: s.to_string(),
            ..Default::default()
        };

        assert_eq!(mints(&filter_and_sort(&listings, None, &query("char"))), vec!["m1"]);
        assert_eq!(mints(&filter_and_sort(&listings, None, &query("CHAR"))), vec!["m1"]);
        assert!(filter_and_sort(&listings, None, &query("zzz")).is_empty());

        // Numeric queries hit grading id and supply
        assert_eq!(mints(&filter_and_sort(&listings, None, &query("8921"))), vec!["m1"]);
        assert_eq!(mints(&filter_and_sort(&listings, None, &query("900"))), vec!["m2"]);
    }

    #[test]
    fn test_category_filter() {
        let listings = sample_listings();

        let autobuy = filter_and_sort(
            &listings,
            None,
            &ListingQuery {
                category: CategoryFilter::Autobuy,
                ..Default::default()
            },
        );
        assert_eq!(mints(&autobuy), vec!["m1"]);

        // `all` keeps everything, including UNKNOWN
        let all = filter_and_sort(&listings, None, &ListingQuery::default());
        assert_eq!(all.len(), 4);

        // UNKNOWN (m3) matches no narrower filter
        let info = filter_and_sort(
            &listings,
            None,
            &ListingQuery {
                category: CategoryFilter::Info,
                ..Default::default()
            },
        );
        assert_eq!(mints(&info), vec!["m4"]);
    }

    #[test]
    fn test_sort_orders() {
        let listings = sample_listings();
        let sorted = |sort: SortKey| {
            mints(&filter_and_sort(
                &listings,
                Some(60.0),
                &ListingQuery {
                    sort,
                    ..Default::default()
                },
            ))
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
        };

        // Missing price on m3 compares as 0 and sorts first ascending
        assert_eq!(sorted(SortKey::PriceLow), vec!["m3", "m2", "m1", "m4"]);
        assert_eq!(sorted(SortKey::PriceHigh), vec!["m4", "m1", "m2", "m3"]);
        // m2: 30 vs 40 = -25%; m3: none = 0; m1: +20%; m4: 600 vs 480 = +25%
        assert_eq!(sorted(SortKey::DifferencePercent), vec!["m2", "m3", "m1", "m4"]);
        assert_eq!(sorted(SortKey::Popularity), vec!["m3", "m4", "m1", "m2"]);
        // Newest first; m3 has no timestamp and sorts last
        assert_eq!(sorted(SortKey::ListedTime), vec!["m2", "m1", "m4", "m3"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let listings = vec![
            make_listing("first", "A", Some(1.0), None),
            make_listing("second", "B", Some(1.0), None),
            make_listing("third", "C", Some(1.0), None),
        ];
        let rows = filter_and_sort(
            &listings,
            None,
            &ListingQuery {
                sort: SortKey::PriceLow,
                ..Default::default()
            },
        );
        assert_eq!(mints(&rows), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_non_finite_prices_sort_as_zero() {
        // The decoder screens wire junk, but rows built in code can still
        // hold NaN, and a USD overflow can make diff_percent infinite
        let mut listings = Vec::new();
        for i in 0..100 {
            listings.push(make_listing(&format!("x{}", i), "Junk", Some(f64::NAN), None));
            listings.push(make_listing(&format!("r{}", i), "Real", Some((100 - i) as f64), None));
        }

        let rows = filter_and_sort(
            &listings,
            None,
            &ListingQuery {
                sort: SortKey::PriceLow,
                ..Default::default()
            },
        );

        // NaN rows group with price zero at the front, input order kept
        assert!(rows[..100]
            .iter()
            .all(|r| r.listing.price_amount.map_or(false, f64::is_nan)));

        // The real prices come back ascending, untouched by the NaN rows
        let reals: Vec<f64> = rows[100..]
            .iter()
            .filter_map(|r| r.listing.price_amount)
            .collect();
        let expected: Vec<f64> = (1..=100).map(f64::from).collect();
        assert_eq!(reals, expected);
    }

    #[test]
    fn test_sort_key_labels_match_wire_values() {
        assert_eq!(SortKey::PriceLow.as_str(), "price-low");
        assert_eq!(SortKey::PriceHigh.as_str(), "price-high");
        assert_eq!(SortKey::DifferencePercent.as_str(), "difference-percent");
        assert_eq!(SortKey::Popularity.as_str(), "popularity");
        assert_eq!(SortKey::ListedTime.as_str(), "listed-time");

        // serde speaks the same kebab-case codes
        let parsed: SortKey = serde_json::from_str("\"price-low\"").unwrap();
        assert_eq!(parsed, SortKey::PriceLow);
    }

    #[test]
    fn test_default_query_returns_all() {
        let listings = sample_listings();
        let rows = filter_and_sort(&listings, None, &ListingQuery::default());
        assert_eq!(rows.len(), listings.len());
    }
}
