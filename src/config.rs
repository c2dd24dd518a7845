//! Runtime configuration and the fixed lookup tables.
//!
//! Every setting comes from the environment with a default, the same way for
//! each field. Coordinates and time zones for the locations seen in the
//! authentication logs are compiled in.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono_tz::Tz;
use serde::Serialize;
use serde_json::json;

use crate::logging::{log, obj, v_str, Domain, Level};

pub const DEFAULT_MAX_MARKER_SIZE: f64 = 40.0;
pub const AUTH_LOG_DATASET: &str = "Dateset 2__User_Authentication_Logs.csv";

pub const DEFAULT_DATASETS: [&str; 4] = [
    "Dataset 3__Malware_Threat_Alerts.csv",
    "Dataset 4__Network_Traffic_Summary.csv",
    AUTH_LOG_DATASET,
    "Dataset 5__Security_Incident_Reports.csv",
];

/// Fixed coordinates for the locations that appear in the authentication logs.
const KNOWN_LOCATIONS: [(&str, f64, f64, &str); 10] = [
    ("Toronto, Canada", 43.65107, -79.347015, "America/Toronto"),
    ("Cape Town, South Africa", -33.9249, 18.4241, "Africa/Johannesburg"),
    ("San Francisco, USA", 37.7749, -122.4194, "America/Los_Angeles"),
    ("New York, USA", 40.7128, -74.0060, "America/New_York"),
    ("São Paulo, Brazil", -23.5505, -46.6333, "America/Sao_Paulo"),
    ("Sydney, Australia", -33.8688, 151.2093, "Australia/Sydney"),
    ("Tokyo, Japan", 35.6762, 139.6503, "Asia/Tokyo"),
    ("Berlin, Germany", 52.52, 13.4050, "Europe/Berlin"),
    ("Mumbai, India", 19.0760, 72.8777, "Asia/Kolkata"),
    ("London, UK", 51.5074, -0.1278, "Europe/London"),
];

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub auth_log_file: String,
    pub datasets: Vec<String>,
    pub max_marker_size: f64,
    pub business_hours: BusinessWindow,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        let mut datasets: Vec<String> = std::env::var("DATASETS")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| DEFAULT_DATASETS.iter().map(|s| s.to_string()).collect());
        let auth_log_file =
            std::env::var("AUTH_LOG_FILE").unwrap_or_else(|_| AUTH_LOG_DATASET.to_string());
        if !datasets.contains(&auth_log_file) {
            datasets.push(auth_log_file.clone());
        }
        Self {
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            auth_log_file,
            datasets,
            max_marker_size: parse_max_marker_size(
                std::env::var("MAX_MARKER_SIZE").ok().as_deref(),
            ),
            business_hours: BusinessWindow {
                start_hour: std::env::var("BUSINESS_START")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(9),
                end_hour: std::env::var("BUSINESS_END")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(17),
            },
            port: std::env::var("DASHBOARD_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8050),
        }
    }
}

/// Largest marker diameter from its raw setting. Only finite values above
/// zero are accepted; anything else falls back to the default with a warning.
pub fn parse_max_marker_size(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return DEFAULT_MAX_MARKER_SIZE;
    };
    match raw.trim().parse::<f64>() {
        Ok(size) if size.is_finite() && size > 0.0 => size,
        _ => {
            log(
                Level::Warn,
                Domain::System,
                "config_rejected",
                obj(&[
                    ("key", v_str("MAX_MARKER_SIZE")),
                    ("value", v_str(raw)),
                    ("fallback", json!(DEFAULT_MAX_MARKER_SIZE)),
                ]),
            );
            DEFAULT_MAX_MARKER_SIZE
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            auth_log_file: AUTH_LOG_DATASET.to_string(),
            datasets: DEFAULT_DATASETS.iter().map(|s| s.to_string()).collect(),
            max_marker_size: DEFAULT_MAX_MARKER_SIZE,
            business_hours: BusinessWindow::default(),
            port: 8050,
        }
    }
}

/// Local-time hour range `[start_hour, end_hour)` counted as business hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BusinessWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for BusinessWindow {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 17,
        }
    }
}

impl BusinessWindow {
    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// `geo_location` → coordinate. Anything not listed has no position on the map.
#[derive(Debug, Clone)]
pub struct LocationTable {
    entries: HashMap<String, Coordinate>,
}

impl LocationTable {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Coordinate)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn lookup(&self, location: &str) -> Option<Coordinate> {
        self.entries.get(location).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LocationTable {
    fn default() -> Self {
        Self::new(
            KNOWN_LOCATIONS
                .iter()
                .map(|(name, lat, lon, _)| (*name, Coordinate { lat: *lat, lon: *lon })),
        )
    }
}

/// `geo_location` → IANA time zone.
#[derive(Debug, Clone)]
pub struct TimezoneTable {
    entries: HashMap<String, Tz>,
}

impl TimezoneTable {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Tz)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn lookup(&self, location: &str) -> Option<Tz> {
        self.entries.get(location).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TimezoneTable {
    fn default() -> Self {
        // Zone names in KNOWN_LOCATIONS are all valid; an invalid one simply drops out.
        Self::new(
            KNOWN_LOCATIONS
                .iter()
                .filter_map(|(name, _, _, zone)| zone.parse::<Tz>().ok().map(|tz| (*name, tz))),
        )
    }
}
