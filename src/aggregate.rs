//! Per-location login aggregation.
//!
//! Events are split into failures and successes, counted per `geo_location`,
//! outer-joined with zero fill, placed on the map through the fixed
//! [`LocationTable`], and given marker sizes scaled against the busiest
//! location of each series. Locations without a coordinate are dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::LocationTable;
use crate::data::Table;
use crate::error::SchemaError;
use crate::events::{events_from_table, AuthEvent, LoginStatus};
use crate::logging::{log, obj, Domain, Level, ProfileScope};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationStat {
    pub geo_location: String,
    pub fail_count: u64,
    pub success_count: u64,
    pub fail_marker_size: f64,
    pub success_marker_size: f64,
    pub lat: f64,
    pub lon: f64,
}

/// Aggregate events into one stat per mapped location.
///
/// Order depends only on the data: locations with at least one failure come
/// first, sorted by name, followed by success-only locations, also sorted.
pub fn aggregate(
    events: &[AuthEvent],
    locations: &LocationTable,
    max_marker_size: f64,
) -> Vec<LocationStat> {
    let _scope = ProfileScope::new("aggregate");
    let mut fails: BTreeMap<&str, u64> = BTreeMap::new();
    let mut successes: BTreeMap<&str, u64> = BTreeMap::new();

    for event in events {
        let Some(location) = event.geo_location.as_deref() else {
            continue;
        };
        let tally = match event.login_status {
            LoginStatus::Failure => &mut fails,
            LoginStatus::Success => &mut successes,
            LoginStatus::Other(_) => continue,
        };
        *tally.entry(location).or_insert(0) += 1;
    }

    let order = fails.keys().chain(
        successes
            .keys()
            .filter(|location| !fails.contains_key(*location)),
    );

    let mut unmapped = 0usize;
    let mut stats: Vec<LocationStat> = Vec::with_capacity(fails.len() + successes.len());
    for &location in order {
        let Some(coord) = locations.lookup(location) else {
            unmapped += 1;
            continue;
        };
        stats.push(LocationStat {
            geo_location: location.to_string(),
            fail_count: fails.get(location).copied().unwrap_or(0),
            success_count: successes.get(location).copied().unwrap_or(0),
            fail_marker_size: 0.0,
            success_marker_size: 0.0,
            lat: coord.lat,
            lon: coord.lon,
        });
    }

    let max_fail = stats.iter().map(|s| s.fail_count).max().unwrap_or(0);
    let max_success = stats.iter().map(|s| s.success_count).max().unwrap_or(0);
    for s in &mut stats {
        s.fail_marker_size = marker_size(s.fail_count, max_fail, max_marker_size);
        s.success_marker_size = marker_size(s.success_count, max_success, max_marker_size);
    }

    log(
        Level::Debug,
        Domain::Aggregate,
        "location_stats",
        obj(&[
            ("events", json!(events.len())),
            ("locations", json!(stats.len())),
            ("unmapped_locations", json!(unmapped)),
            ("max_fail", json!(max_fail)),
            ("max_success", json!(max_success)),
        ]),
    );

    stats
}

/// Same as [`aggregate`] but starting from a raw table, which must carry
/// `login_status` and `geo_location`.
pub fn aggregate_table(
    table: &Table,
    locations: &LocationTable,
    max_marker_size: f64,
) -> Result<Vec<LocationStat>, SchemaError> {
    let events = events_from_table(table)?;
    Ok(aggregate(&events, locations, max_marker_size))
}

/// Linear scale against the column maximum. A zero maximum, or a maximum
/// size that is not a positive finite number, yields zero.
pub fn marker_size(count: u64, max: u64, max_marker_size: f64) -> f64 {
    if max == 0 || !max_marker_size.is_finite() || max_marker_size <= 0.0 {
        return 0.0;
    }
    count as f64 / max as f64 * max_marker_size
}
