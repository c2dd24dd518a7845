//! Map layers for the login heatmap.
//!
//! At each location the series with the larger count is drawn first, faded and
//! without a tooltip; the smaller series is drawn on top, solid and with a
//! tooltip, so both stay visible when one dominates.

use serde::{Deserialize, Serialize};

use crate::aggregate::LocationStat;

pub const BACKGROUND_OPACITY: f64 = 0.3;
pub const FOREGROUND_OPACITY: f64 = 0.7;
pub const OUTLINE_WIDTH: f64 = 1.0;
pub const OUTLINE_COLOR: &str = "white";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Series {
    Success,
    Failure,
}

impl Series {
    pub fn name(self) -> &'static str {
        match self {
            Series::Success => "Successful Logins",
            Series::Failure => "Failed Logins",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Series::Success => "blue",
            Series::Failure => "red",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Series::Success => "circle",
            Series::Failure => "diamond",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    BackgroundFaded,
    ForegroundSolid,
}

impl RenderMode {
    pub fn opacity(self) -> f64 {
        match self {
            RenderMode::BackgroundFaded => BACKGROUND_OPACITY,
            RenderMode::ForegroundSolid => FOREGROUND_OPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub lat: f64,
    pub lon: f64,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub color: String,
    pub opacity: f64,
    pub symbol: String,
    pub line_width: f64,
    pub line_color: String,
}

impl MarkerStyle {
    pub fn for_layer(series: Series, mode: RenderMode) -> Self {
        Self {
            color: series.color().to_string(),
            opacity: mode.opacity(),
            symbol: series.symbol().to_string(),
            line_width: OUTLINE_WIDTH,
            line_color: OUTLINE_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLayer {
    pub name: String,
    pub series: Series,
    pub render_mode: RenderMode,
    pub points: Vec<MapPoint>,
    pub marker: MarkerStyle,
    /// Tooltip markup; `None` means hover is skipped.
    pub hover: Option<String>,
    pub show_legend: bool,
}

impl MapLayer {
    fn at(stat: &LocationStat, series: Series, mode: RenderMode, show_legend: bool) -> Self {
        let size = match series {
            Series::Success => stat.success_marker_size,
            Series::Failure => stat.fail_marker_size,
        };
        let hover = match mode {
            RenderMode::ForegroundSolid => Some(hover_text(stat)),
            RenderMode::BackgroundFaded => None,
        };
        Self {
            name: series.name().to_string(),
            series,
            render_mode: mode,
            points: vec![MapPoint {
                lat: stat.lat,
                lon: stat.lon,
                size,
            }],
            marker: MarkerStyle::for_layer(series, mode),
            hover,
            show_legend,
        }
    }
}

pub fn hover_text(stat: &LocationStat) -> String {
    format!(
        "<b>{}</b><br>Successful Logins: {}<br>Failed Logins: {}",
        stat.geo_location, stat.success_count, stat.fail_count
    )
}

/// Build layers in stat order. The first layer of each series carries its legend entry.
pub fn build_map_layers(stats: &[LocationStat]) -> Vec<MapLayer> {
    let mut layers = Vec::with_capacity(stats.len() * 2);
    let mut legend_success = false;
    let mut legend_failure = false;
    let mut claim_legend = |series: Series| -> bool {
        let seen = match series {
            Series::Success => &mut legend_success,
            Series::Failure => &mut legend_failure,
        };
        !std::mem::replace(seen, true)
    };

    for stat in stats {
        let success_bigger = stat.success_count >= stat.fail_count;
        let (larger, smaller, smaller_count) = if success_bigger {
            (Series::Success, Series::Failure, stat.fail_count)
        } else {
            (Series::Failure, Series::Success, stat.success_count)
        };

        let legend = claim_legend(larger);
        layers.push(MapLayer::at(stat, larger, RenderMode::BackgroundFaded, legend));

        if smaller_count > 0 {
            let legend = claim_legend(smaller);
            layers.push(MapLayer::at(stat, smaller, RenderMode::ForegroundSolid, legend));
        }
    }
    layers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(name: &str, fail: u64, success: u64) -> LocationStat {
        LocationStat {
            geo_location: name.to_string(),
            fail_count: fail,
            success_count: success,
            fail_marker_size: fail as f64,
            success_marker_size: success as f64,
            lat: 1.0,
            lon: 2.0,
        }
    }

    #[test]
    fn worked_example_layers() {
        let stats = vec![stat("Tokyo, Japan", 3, 3), stat("Berlin, Germany", 0, 5)];
        let layers = build_map_layers(&stats);
        assert_eq!(layers.len(), 3);

        assert_eq!(layers[0].series, Series::Success);
        assert_eq!(layers[0].render_mode, RenderMode::BackgroundFaded);
        assert!(layers[0].show_legend);
        assert!(layers[0].hover.is_none());

        assert_eq!(layers[1].series, Series::Failure);
        assert_eq!(layers[1].render_mode, RenderMode::ForegroundSolid);
        assert!(layers[1].show_legend);
        let hover = layers[1].hover.as_deref().unwrap();
        assert!(hover.contains("Tokyo, Japan"));
        assert!(hover.contains("Successful Logins: 3"));
        assert!(hover.contains("Failed Logins: 3"));

        assert_eq!(layers[2].series, Series::Success);
        assert!(!layers[2].show_legend);
    }

    #[test]
    fn failure_dominant_location_draws_failure_behind() {
        let layers = build_map_layers(&[stat("London, UK", 9, 2)]);
        assert_eq!(layers[0].series, Series::Failure);
        assert_eq!(layers[0].marker.opacity, BACKGROUND_OPACITY);
        assert_eq!(layers[0].marker.symbol, "diamond");
        assert_eq!(layers[0].marker.color, "red");
        assert_eq!(layers[1].series, Series::Success);
        assert_eq!(layers[1].marker.opacity, FOREGROUND_OPACITY);
        assert_eq!(layers[1].marker.symbol, "circle");
        assert_eq!(layers[1].points[0].size, 2.0);
    }

    #[test]
    fn outline_is_white_and_one_wide() {
        for layer in build_map_layers(&[stat("A", 1, 4)]) {
            assert_eq!(layer.marker.line_width, 1.0);
            assert_eq!(layer.marker.line_color, "white");
        }
    }

    #[test]
    fn legend_goes_to_first_layer_of_each_series() {
        // The first location has no failures, so the failure legend moves to the next one.
        let stats = vec![stat("A", 0, 4), stat("B", 2, 1), stat("C", 5, 5)];
        let layers = build_map_layers(&stats);
        let legends: Vec<(Series, bool)> = layers.iter().map(|l| (l.series, l.show_legend)).collect();
        assert_eq!(
            legends,
            vec![
                (Series::Success, true),
                (Series::Failure, true),
                (Series::Success, false),
                (Series::Success, false),
                (Series::Failure, false),
            ]
        );
    }

    #[test]
    fn empty_stats_give_no_layers() {
        assert!(build_map_layers(&[]).is_empty());
    }
}
