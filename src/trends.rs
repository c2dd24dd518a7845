//! Simple count series for the bar-chart views.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::events::AuthEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub label: String,
    pub count: u64,
}

/// Total logins per `geo_location`, busiest first. Events without a location are skipped.
pub fn location_trends(events: &[AuthEvent]) -> Vec<CountEntry> {
    ranked(events.iter().filter_map(|e| e.geo_location.as_deref()))
}

/// Total logins per country (text after the last comma of `geo_location`).
pub fn country_trends(events: &[AuthEvent]) -> Vec<CountEntry> {
    ranked(
        events
            .iter()
            .filter_map(|e| e.geo_location.as_deref())
            .map(country_of),
    )
}

pub fn country_of(location: &str) -> &str {
    location
        .rsplit_once(',')
        .map(|(_, country)| country.trim())
        .unwrap_or_else(|| location.trim())
}

fn ranked<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<CountEntry> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let mut out: Vec<CountEntry> = counts
        .into_iter()
        .map(|(label, count)| CountEntry {
            label: label.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Browser {
    Chrome,
    Firefox,
    Edge,
    Safari,
    Opera,
    Other,
    Unknown,
}

impl Browser {
    pub const ALL: [Browser; 7] = [
        Browser::Chrome,
        Browser::Firefox,
        Browser::Edge,
        Browser::Safari,
        Browser::Opera,
        Browser::Other,
        Browser::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Browser::Chrome => "Chrome",
            Browser::Firefox => "Firefox",
            Browser::Edge => "Edge",
            Browser::Safari => "Safari",
            Browser::Opera => "Opera",
            Browser::Other => "Other",
            Browser::Unknown => "Unknown",
        }
    }

    /// Token order matters: Chromium-based agents also advertise Chrome and Safari.
    pub fn from_user_agent(ua: &str) -> Self {
        let ua = ua.to_lowercase();
        if ua.trim().is_empty() {
            Browser::Unknown
        } else if ua.contains("edg/") || ua.contains("edge/") || ua == "edge" {
            Browser::Edge
        } else if ua.contains("opr/") || ua.contains("opera") {
            Browser::Opera
        } else if ua.contains("firefox") || ua.contains("fxios") {
            Browser::Firefox
        } else if ua.contains("chrome") || ua.contains("crios") || ua.contains("chromium") {
            Browser::Chrome
        } else if ua.contains("safari") {
            Browser::Safari
        } else {
            Browser::Other
        }
    }
}

/// Counts per browser in [`Browser::ALL`] order; empty buckets are omitted.
pub fn browser_distribution(events: &[AuthEvent]) -> Vec<(Browser, u64)> {
    let mut counts: HashMap<Browser, u64> = HashMap::new();
    for e in events {
        let b = e
            .user_agent
            .as_deref()
            .map(Browser::from_user_agent)
            .unwrap_or(Browser::Unknown);
        *counts.entry(b).or_default() += 1;
    }
    Browser::ALL
        .iter()
        .filter_map(|b| counts.get(b).map(|c| (*b, *c)))
        .collect()
}
