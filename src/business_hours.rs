//! Business-hours classification in each event's local time zone.

use chrono::{TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{BusinessWindow, TimezoneTable};
use crate::events::AuthEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessWindow {
    Business,
    NonBusiness,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHoursSummary {
    pub business: u64,
    pub non_business: u64,
    /// No timestamp, no location, or a location without a known time zone.
    pub unclassified: u64,
}

impl BusinessHoursSummary {
    pub fn classified(&self) -> u64 {
        self.business + self.non_business
    }

    pub fn business_share(&self) -> Option<f64> {
        match self.classified() {
            0 => None,
            n => Some(self.business as f64 / n as f64),
        }
    }
}

/// Local hour of the event in its location's time zone, then checked against `window`.
pub fn classify_event(
    event: &AuthEvent,
    timezones: &TimezoneTable,
    window: BusinessWindow,
) -> Option<AccessWindow> {
    let ts = event.login_timestamp?;
    let tz = timezones.lookup(event.geo_location.as_deref()?)?;
    let local = Utc.from_utc_datetime(&ts).with_timezone(&tz);
    if window.contains(local.hour()) {
        Some(AccessWindow::Business)
    } else {
        Some(AccessWindow::NonBusiness)
    }
}

pub fn classify_business_hours(
    events: &[AuthEvent],
    timezones: &TimezoneTable,
    window: BusinessWindow,
) -> BusinessHoursSummary {
    events
        .iter()
        .fold(BusinessHoursSummary::default(), |mut acc, ev| {
            match classify_event(ev, timezones, window) {
                Some(AccessWindow::Business) => acc.business += 1,
                Some(AccessWindow::NonBusiness) => acc.non_business += 1,
                None => acc.unclassified += 1,
            }
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{parse_timestamp, LoginStatus};

    fn at(loc: &str, ts: &str) -> AuthEvent {
        AuthEvent::new(LoginStatus::Success, Some(loc)).with_timestamp(parse_timestamp(ts).unwrap())
    }

    #[test]
    fn converts_to_local_time() {
        let tz = TimezoneTable::default();
        let w = BusinessWindow::default();
        // 01:00 UTC is 10:00 in Tokyo (no DST).
        assert_eq!(
            classify_event(&at("Tokyo, Japan", "2024-06-03 01:00:00"), &tz, w),
            Some(AccessWindow::Business)
        );
        // Same instant is 21:00 the previous evening in New York (EDT).
        assert_eq!(
            classify_event(&at("New York, USA", "2024-06-03 01:00:00"), &tz, w),
            Some(AccessWindow::NonBusiness)
        );
    }

    #[test]
    fn window_end_is_exclusive() {
        let tz = TimezoneTable::default();
        let w = BusinessWindow::default();
        // London in January is UTC+0.
        assert_eq!(
            classify_event(&at("London, UK", "2024-01-10 16:59:59"), &tz, w),
            Some(AccessWindow::Business)
        );
        assert_eq!(
            classify_event(&at("London, UK", "2024-01-10 17:00:00"), &tz, w),
            Some(AccessWindow::NonBusiness)
        );
        assert_eq!(
            classify_event(&at("London, UK", "2024-01-10 09:00:00"), &tz, w),
            Some(AccessWindow::Business)
        );
    }

    #[test]
    fn summary_counts_unclassified() {
        let tz = TimezoneTable::default();
        let events = vec![
            at("Mumbai, India", "2024-02-01 05:00:00"), // 10:30 IST
            at("Mumbai, India", "2024-02-01 20:00:00"), // 01:30 IST
            at("Paris, France", "2024-02-01 10:00:00"),
            AuthEvent::new(LoginStatus::Failure, Some("Mumbai, India")),
            AuthEvent::new(LoginStatus::Failure, None),
        ];
        let s = classify_business_hours(&events, &tz, BusinessWindow::default());
        assert_eq!(s.business, 1);
        assert_eq!(s.non_business, 1);
        assert_eq!(s.unclassified, 3);
        assert_eq!(s.business_share(), Some(0.5));
    }

    #[test]
    fn empty_summary_has_no_share() {
        assert_eq!(BusinessHoursSummary::default().business_share(), None);
    }
}
