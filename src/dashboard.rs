//! Tabs and views of the security dashboard.
//!
//! A `Dashboard` owns immutable configuration and the datasets loaded at
//! startup. Every render is computed from scratch; nothing is cached between
//! calls, so overlapping requests never see each other's state.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::aggregate::{aggregate, LocationStat};
use crate::business_hours::classify_business_hours;
use crate::config::{Config, LocationTable, TimezoneTable};
use crate::data::{DatasetRegistry, DatasetSummary};
use crate::error::DashboardError;
use crate::events::{events_from_table, AuthEvent};
use crate::figure::{self, Figure};
use crate::layers::{build_map_layers, MapLayer};
use crate::logging::{log, log_view_error, obj, v_str, Domain, Level, ProfileScope};
use crate::trends::{browser_distribution, country_trends, location_trends};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tab {
    UserLogins,
    MalwareThreats,
    NetworkResponse,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::UserLogins, Tab::MalwareThreats, Tab::NetworkResponse];

    pub fn value(self) -> &'static str {
        match self {
            Tab::UserLogins => "User Login Data",
            Tab::MalwareThreats => "Malware and Threat Data",
            Tab::NetworkResponse => "Network and Response Data",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::UserLogins => "User Behavior & Access Monitoring",
            Tab::MalwareThreats => "Threat Detection & Malware Insights",
            Tab::NetworkResponse => "Network and Incident Response",
        }
    }

    /// Accepts either the tab value or its label.
    pub fn parse(s: &str) -> Result<Self, DashboardError> {
        Tab::ALL
            .into_iter()
            .find(|t| t.value() == s || t.label() == s)
            .ok_or_else(|| DashboardError::UnknownTab(s.to_string()))
    }

    pub fn views(self) -> &'static [View] {
        match self {
            Tab::UserLogins => &View::ALL,
            Tab::MalwareThreats | Tab::NetworkResponse => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    FailedHeatmap,
    LocationTrends,
    BusinessHours,
    UserAgentDist,
}

impl View {
    pub const ALL: [View; 4] = [
        View::FailedHeatmap,
        View::LocationTrends,
        View::BusinessHours,
        View::UserAgentDist,
    ];

    pub fn value(self) -> &'static str {
        match self {
            View::FailedHeatmap => "failed_heatmap",
            View::LocationTrends => "location_trends",
            View::BusinessHours => "business_hours",
            View::UserAgentDist => "user_agent_dist",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            View::FailedHeatmap => "Failed Login Heatmap",
            View::LocationTrends => "City and Country Login Trends",
            View::BusinessHours => "Business Hours vs Non-business Hours",
            View::UserAgentDist => "Browser Distribution",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DashboardError> {
        View::ALL
            .into_iter()
            .find(|v| v.value() == s)
            .ok_or_else(|| DashboardError::UnknownView(s.to_string()))
    }
}

/// Content for one tab: heading, selectable views, default view, or a placeholder.
#[derive(Debug, Clone, Serialize)]
pub struct TabContent {
    pub heading: &'static str,
    pub options: Vec<ViewOption>,
    pub default_view: Option<&'static str>,
    pub message: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewOption {
    pub label: &'static str,
    pub value: &'static str,
}

/// Map-view result with both the aggregated stats and the layers built from them.
#[derive(Debug, Clone, Serialize)]
pub struct LoginMap {
    pub stats: Vec<LocationStat>,
    pub layers: Vec<MapLayer>,
}

pub struct Dashboard {
    config: Config,
    locations: LocationTable,
    timezones: TimezoneTable,
    datasets: DatasetRegistry,
}

impl Dashboard {
    pub fn new(config: Config, datasets: DatasetRegistry) -> Self {
        Self::with_tables(config, datasets, LocationTable::default(), TimezoneTable::default())
    }

    pub fn with_tables(
        config: Config,
        datasets: DatasetRegistry,
        locations: LocationTable,
        timezones: TimezoneTable,
    ) -> Self {
        Self {
            config,
            locations,
            timezones,
            datasets,
        }
    }

    /// Load every configured dataset from `config.data_dir`.
    pub fn load(config: Config) -> Self {
        let datasets = DatasetRegistry::load_all(&config.data_dir, config.datasets.as_slice());
        Self::new(config, datasets)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn datasets(&self) -> Vec<DatasetSummary> {
        self.datasets.summaries()
    }

    pub fn tab_content(&self, tab: Tab) -> TabContent {
        let options: Vec<ViewOption> = tab
            .views()
            .iter()
            .map(|v| ViewOption {
                label: v.label(),
                value: v.value(),
            })
            .collect();
        TabContent {
            heading: tab.label(),
            default_view: tab.views().first().map(|v| v.value()),
            message: if options.is_empty() {
                Some("Content coming soon...")
            } else {
                None
            },
            options,
        }
    }

    fn auth_events(&self) -> Result<Vec<AuthEvent>, DashboardError> {
        let name = &self.config.auth_log_file;
        let table = self
            .datasets
            .get(name)
            .ok_or_else(|| DashboardError::DatasetUnavailable(name.clone()))?;
        Ok(events_from_table(table)?)
    }

    pub fn login_map(&self) -> Result<LoginMap, DashboardError> {
        let events = self.auth_events()?;
        let stats = aggregate(&events, &self.locations, self.config.max_marker_size);
        let layers = build_map_layers(&stats);
        Ok(LoginMap { stats, layers })
    }

    pub fn render_view(&self, view: View) -> Result<Figure, DashboardError> {
        let _scope = ProfileScope::with_context("render_view", &[("view", v_str(view.value()))]);
        let fig = match view {
            View::FailedHeatmap => figure::login_map(&self.login_map()?.layers),
            View::LocationTrends => {
                let events = self.auth_events()?;
                figure::location_trends_chart(&location_trends(&events), &country_trends(&events))
            }
            View::BusinessHours => figure::business_hours_chart(&classify_business_hours(
                &self.auth_events()?,
                &self.timezones,
                self.config.business_hours,
            )),
            View::UserAgentDist => figure::browser_chart(&browser_distribution(&self.auth_events()?)),
        };
        log(
            Level::Debug,
            Domain::Render,
            "view_rendered",
            obj(&[("view", v_str(view.value())), ("traces", json!(fig.data.len()))]),
        );
        Ok(fig)
    }

    /// Like [`render_view`](Self::render_view) but never fails: errors become a
    /// placeholder figure naming the problem.
    pub fn render_view_or_placeholder(&self, view: View) -> Figure {
        match self.render_view(view) {
            Ok(fig) => fig,
            Err(err) => {
                log_view_error(view.value(), &err.to_string());
                Figure::placeholder(view.label(), &format!("Unable to render view: {}", err))
            }
        }
    }

    /// Resolve a view by name; unknown names produce an empty figure.
    pub fn render_named_view(&self, name: &str) -> Figure {
        match View::parse(name) {
            Ok(view) => self.render_view_or_placeholder(view),
            Err(err) => {
                log_view_error(name, &err.to_string());
                Figure {
                    data: Vec::new(),
                    layout: json!({}),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_csv;

    fn dashboard_with(csv: Option<&str>) -> Dashboard {
        let config = Config::default();
        let mut registry = DatasetRegistry::new();
        if let Some(text) = csv {
            registry.insert(&config.auth_log_file, parse_csv(text).unwrap());
        }
        Dashboard::new(config, registry)
    }

    const SAMPLE: &str = "login_status,geo_location,login_timestamp,user_agent\n\
        failure,\"Tokyo, Japan\",2024-06-03 01:00:00,Firefox/121.0\n\
        success,\"Tokyo, Japan\",2024-06-03 02:00:00,Chrome/120.0 Safari/537.36\n\
        success,\"Berlin, Germany\",2024-06-03 20:00:00,Firefox/121.0\n";

    #[test]
    fn tab_parse_accepts_value_and_label() {
        assert_eq!(Tab::parse("User Login Data").unwrap(), Tab::UserLogins);
        assert_eq!(Tab::parse("Network and Incident Response").unwrap(), Tab::NetworkResponse);
        assert!(matches!(Tab::parse("nope"), Err(DashboardError::UnknownTab(_))));
    }

    #[test]
    fn user_tab_lists_four_views() {
        let d = dashboard_with(None);
        let content = d.tab_content(Tab::UserLogins);
        assert_eq!(content.options.len(), 4);
        assert_eq!(content.default_view, Some("failed_heatmap"));
        assert!(content.message.is_none());
    }

    #[test]
    fn other_tabs_are_placeholders() {
        let d = dashboard_with(None);
        let content = d.tab_content(Tab::MalwareThreats);
        assert!(content.options.is_empty());
        assert_eq!(content.message, Some("Content coming soon..."));
    }

    #[test]
    fn missing_dataset_surfaces_as_error() {
        let d = dashboard_with(None);
        assert!(matches!(
            d.render_view(View::FailedHeatmap),
            Err(DashboardError::DatasetUnavailable(_))
        ));
        let fig = d.render_view_or_placeholder(View::FailedHeatmap);
        assert!(fig.data.is_empty());
    }

    #[test]
    fn missing_column_is_fatal_for_the_view_only() {
        let d = dashboard_with(Some("login_status,user_agent\nsuccess,Firefox\n"));
        assert!(matches!(d.render_view(View::FailedHeatmap), Err(DashboardError::Schema(_))));
        let fig = d.render_view_or_placeholder(View::FailedHeatmap);
        let msg = fig.layout["annotations"][0]["text"].as_str().unwrap();
        assert!(msg.contains("geo_location"));
    }

    #[test]
    fn every_view_renders_from_sample() {
        let d = dashboard_with(Some(SAMPLE));
        for view in View::ALL {
            let fig = d.render_view(view).unwrap();
            assert!(!fig.data.is_empty(), "{} rendered no traces", view.value());
        }
    }

    #[test]
    fn login_map_matches_aggregation() {
        let d = dashboard_with(Some(SAMPLE));
        let map = d.login_map().unwrap();
        assert_eq!(map.stats.len(), 2);
        assert_eq!(map.layers.len(), 3);
    }

    #[test]
    fn unknown_view_name_gives_empty_figure() {
        let d = dashboard_with(Some(SAMPLE));
        let fig = d.render_named_view("heatmap3d");
        assert!(fig.data.is_empty());
    }
}
