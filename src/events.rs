//! Typed authentication events read from a loaded table.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::data::Table;
use crate::error::SchemaError;

pub const COL_LOGIN_STATUS: &str = "login_status";
pub const COL_GEO_LOCATION: &str = "geo_location";
pub const COL_LOGIN_TIMESTAMP: &str = "login_timestamp";
pub const COL_USER_AGENT: &str = "user_agent";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoginStatus {
    Success,
    Failure,
    /// Any other value, lowercased. Never counted as success or failure.
    Other(String),
}

impl LoginStatus {
    /// Case-insensitive; surrounding whitespace is ignored.
    pub fn parse(s: &str) -> Self {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "success" => LoginStatus::Success,
            "failure" => LoginStatus::Failure,
            _ => LoginStatus::Other(lower),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthEvent {
    pub login_status: LoginStatus,
    pub geo_location: Option<String>,
    /// Naive timestamps are treated as UTC.
    pub login_timestamp: Option<NaiveDateTime>,
    pub user_agent: Option<String>,
}

impl AuthEvent {
    pub fn new(status: LoginStatus, geo_location: Option<&str>) -> Self {
        Self {
            login_status: status,
            geo_location: geo_location.map(|s| s.to_string()),
            login_timestamp: None,
            user_agent: None,
        }
    }

    pub fn with_timestamp(mut self, ts: NaiveDateTime) -> Self {
        self.login_timestamp = Some(ts);
        self
    }

    pub fn with_user_agent(mut self, ua: &str) -> Self {
        self.user_agent = Some(ua.to_string());
        self
    }
}

/// Convert table rows into events. `login_status` and `geo_location` are required;
/// the timestamp and user-agent columns are optional.
pub fn events_from_table(table: &Table) -> Result<Vec<AuthEvent>, SchemaError> {
    let status_col = table.require_column(COL_LOGIN_STATUS)?;
    let geo_col = table.require_column(COL_GEO_LOCATION)?;
    let ts_col = table.column_index(COL_LOGIN_TIMESTAMP);
    let ua_col = table.column_index(COL_USER_AGENT);

    let events = (0..table.len())
        .map(|row| AuthEvent {
            login_status: LoginStatus::parse(table.cell(row, status_col).unwrap_or("")),
            geo_location: table.cell(row, geo_col).map(|s| s.trim().to_string()),
            login_timestamp: ts_col
                .and_then(|c| table.cell(row, c))
                .and_then(parse_timestamp),
            user_agent: ua_col
                .and_then(|c| table.cell(row, c))
                .map(|s| s.trim().to_string()),
        })
        .collect();
    Ok(events)
}

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

/// ISO-8601-ish timestamp parsing. Offsets are normalised to UTC; a bare date is midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_csv;
    use chrono::Timelike;

    #[test]
    fn status_is_case_insensitive() {
        assert_eq!(LoginStatus::parse("SUCCESS"), LoginStatus::Success);
        assert_eq!(LoginStatus::parse(" Failure "), LoginStatus::Failure);
        assert_eq!(LoginStatus::parse("Locked"), LoginStatus::Other("locked".to_string()));
    }

    #[test]
    fn timestamp_formats() {
        let a = parse_timestamp("2024-03-01 14:05:00").unwrap();
        assert_eq!(a.hour(), 14);
        let b = parse_timestamp("2024-03-01T14:05:00+02:00").unwrap();
        assert_eq!(b.hour(), 12);
        let c = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(c.hour(), 0);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn table_rows_become_events() {
        let t = parse_csv(
            "user_id,login_status,geo_location,login_timestamp,user_agent\n\
             u1,Success,\"Tokyo, Japan\",2024-03-01 10:00:00,Mozilla/5.0 Firefox/120.0\n\
             u2,failure,,not-a-date,\n",
        )
        .unwrap();
        let events = events_from_table(&t).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].geo_location.as_deref(), Some("Tokyo, Japan"));
        assert!(events[0].login_timestamp.is_some());
        assert_eq!(events[1].login_status, LoginStatus::Failure);
        assert_eq!(events[1].geo_location, None);
        assert_eq!(events[1].login_timestamp, None);
        assert_eq!(events[1].user_agent, None);
    }

    #[test]
    fn missing_required_column_is_schema_error() {
        let t = parse_csv("login_status,user_agent\nsuccess,x\n").unwrap();
        let err = events_from_table(&t).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumn {
                column: COL_GEO_LOCATION.to_string()
            }
        );
    }

    #[test]
    fn padded_cells_are_trimmed() {
        let t = parse_csv("login_status,geo_location\n failure ,\" Tokyo, Japan \"\n").unwrap();
        let events = events_from_table(&t).unwrap();
        assert_eq!(events[0].login_status, LoginStatus::Failure);
        assert_eq!(events[0].geo_location.as_deref(), Some("Tokyo, Japan"));
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let t = parse_csv("login_status,geo_location\nsuccess,\"London, UK\"\n").unwrap();
        let events = events_from_table(&t).unwrap();
        assert_eq!(events[0].login_timestamp, None);
        assert_eq!(events[0].user_agent, None);
    }
}
