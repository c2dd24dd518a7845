//! Render-ready chart descriptions.
//!
//! Field names follow the plotly.js figure schema so the front end can hand
//! the JSON straight to `Plotly.react`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::business_hours::BusinessHoursSummary;
use crate::layers::MapLayer;
use crate::trends::{Browser, CountEntry};

pub const BACKGROUND: &str = "#252525";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
}

impl Figure {
    pub fn title(&self) -> Option<&str> {
        self.layout.get("title")?.get("text")?.as_str()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Empty figure with a centred message, used when a view cannot be drawn.
    pub fn placeholder(title: &str, message: &str) -> Self {
        Self {
            data: Vec::new(),
            layout: json!({
                "title": { "text": title },
                "paper_bgcolor": BACKGROUND,
                "plot_bgcolor": BACKGROUND,
                "xaxis": { "visible": false },
                "yaxis": { "visible": false },
                "annotations": [{
                    "text": message,
                    "showarrow": false,
                    "xref": "paper",
                    "yref": "paper",
                    "x": 0.5,
                    "y": 0.5,
                    "font": { "color": "#ffffff", "size": 18 }
                }]
            }),
        }
    }
}

pub fn scattergeo_trace(layer: &MapLayer) -> Value {
    let mut trace = json!({
        "type": "scattergeo",
        "mode": "markers",
        "name": layer.name,
        "lat": layer.points.iter().map(|p| p.lat).collect::<Vec<_>>(),
        "lon": layer.points.iter().map(|p| p.lon).collect::<Vec<_>>(),
        "marker": {
            "size": layer.points.iter().map(|p| p.size).collect::<Vec<_>>(),
            "color": layer.marker.color,
            "opacity": layer.marker.opacity,
            "symbol": layer.marker.symbol,
            "line": { "width": layer.marker.line_width, "color": layer.marker.line_color }
        },
        "showlegend": layer.show_legend,
    });
    match &layer.hover {
        Some(text) => trace["hovertemplate"] = json!(format!("{}<extra></extra>", text)),
        None => trace["hoverinfo"] = json!("skip"),
    }
    trace
}

pub fn login_map(layers: &[MapLayer]) -> Figure {
    Figure {
        data: layers.iter().map(scattergeo_trace).collect(),
        layout: json!({
            "title": { "text": "Login Attempts by Location", "font": { "color": "#ffffff", "size": 30 } },
            "geo": {
                "scope": "world",
                "projection": { "type": "natural earth" },
                "showland": true,
                "landcolor": "rgb(243, 243, 243)",
                "showcountries": true,
                "countrycolor": "rgb(204, 204, 204)"
            },
            "paper_bgcolor": BACKGROUND,
            "plot_bgcolor": BACKGROUND,
            "legend": {
                "title": { "text": "Login Status" },
                "x": 0.8,
                "y": 0.9,
                "bgcolor": "rgba(255,255,255,0.7)"
            }
        }),
    }
}

pub fn bar_chart(title: &str, entries: &[CountEntry], color: &str) -> Figure {
    Figure {
        data: vec![json!({
            "type": "bar",
            "x": entries.iter().map(|e| e.label.as_str()).collect::<Vec<_>>(),
            "y": entries.iter().map(|e| e.count).collect::<Vec<_>>(),
            "marker": { "color": color }
        })],
        layout: json!({ "title": { "text": title } }),
    }
}

/// City bars plus a second, hidden-by-default trace grouped by country.
pub fn location_trends_chart(cities: &[CountEntry], countries: &[CountEntry]) -> Figure {
    let mut fig = bar_chart("Login Trends by Location", cities, "mediumturquoise");
    fig.data[0]["name"] = json!("City");
    fig.data.push(json!({
        "type": "bar",
        "name": "Country",
        "visible": "legendonly",
        "x": countries.iter().map(|e| e.label.as_str()).collect::<Vec<_>>(),
        "y": countries.iter().map(|e| e.count).collect::<Vec<_>>(),
        "marker": { "color": "steelblue" }
    }));
    fig
}

pub fn browser_chart(dist: &[(Browser, u64)]) -> Figure {
    let entries: Vec<CountEntry> = dist
        .iter()
        .map(|(b, c)| CountEntry {
            label: b.label().to_string(),
            count: *c,
        })
        .collect();
    bar_chart("User Agent / Browser Distribution", &entries, "lightgreen")
}

pub fn business_hours_chart(summary: &BusinessHoursSummary) -> Figure {
    Figure {
        data: vec![json!({
            "type": "pie",
            "labels": ["Business Hours", "Non-Business Hours"],
            "values": [summary.business, summary.non_business]
        })],
        layout: json!({
            "title": { "text": "Access During Business vs Non-Business Hours" },
            "meta": {
                "classified": summary.classified(),
                "unclassified": summary.unclassified,
                "business_share": summary.business_share()
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::LocationStat;
    use crate::layers::build_map_layers;

    fn stats() -> Vec<LocationStat> {
        vec![LocationStat {
            geo_location: "Tokyo, Japan".to_string(),
            fail_count: 3,
            success_count: 3,
            fail_marker_size: 40.0,
            success_marker_size: 24.0,
            lat: 35.6762,
            lon: 139.6503,
        }]
    }

    #[test]
    fn background_trace_skips_hover() {
        let fig = login_map(&build_map_layers(&stats()));
        assert_eq!(fig.data.len(), 2);
        assert_eq!(fig.data[0]["hoverinfo"], "skip");
        assert_eq!(fig.data[0]["marker"]["opacity"], 0.3);
        assert_eq!(fig.data[0]["marker"]["size"][0], 24.0);
        assert!(fig.data[1]["hovertemplate"]
            .as_str()
            .unwrap()
            .ends_with("<extra></extra>"));
        assert_eq!(fig.title(), Some("Login Attempts by Location"));
    }

    #[test]
    fn placeholder_has_no_traces() {
        let fig = Figure::placeholder("Network and Incident Response", "Content coming soon...");
        assert!(fig.data.is_empty());
        assert_eq!(fig.layout["annotations"][0]["text"], "Content coming soon...");
    }

    #[test]
    fn pie_values_follow_summary() {
        let fig = business_hours_chart(&BusinessHoursSummary {
            business: 7,
            non_business: 3,
            unclassified: 1,
        });
        assert_eq!(fig.data[0]["values"], json!([7, 3]));
        assert_eq!(fig.layout["meta"]["classified"], 10);
        assert_eq!(fig.layout["meta"]["business_share"], 0.7);
    }

    #[test]
    fn pie_share_is_null_without_classified_events() {
        let fig = business_hours_chart(&BusinessHoursSummary {
            business: 0,
            non_business: 0,
            unclassified: 4,
        });
        assert!(fig.layout["meta"]["business_share"].is_null());
    }

    #[test]
    fn figure_serialises_to_json_object() {
        let fig = browser_chart(&[(Browser::Chrome, 4)]);
        let v: Value = serde_json::from_str(&fig.to_json()).unwrap();
        assert_eq!(v["data"][0]["x"][0], "Chrome");
        assert_eq!(v["data"][0]["y"][0], 4);
    }
}
