use authmap::config::{Config, AUTH_LOG_DATASET};
use authmap::dashboard::{Dashboard, View};
use authmap::data::{build_manifest, load_csv, DatasetRegistry};
use authmap::error::{DashboardError, LoadError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_csv(path: &Path, header: &[&str], rows: &[&str]) {
    let mut out = String::new();
    out.push_str(&header.join(","));
    out.push('\n');
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    fs::write(path, out).unwrap();
}

const HEADER: [&str; 5] = ["user_id", "login_status", "geo_location", "login_timestamp", "user_agent"];

#[test]
fn missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let err = load_csv(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, LoadError::NotFound { .. }));
}

#[test]
fn registry_keeps_going_after_failures() {
    let dir = TempDir::new().unwrap();
    write_csv(
        &dir.path().join(AUTH_LOG_DATASET),
        &HEADER,
        &["u1,Success,\"Tokyo, Japan\",2024-03-01 01:00:00,Firefox/121.0"],
    );
    fs::write(dir.path().join("broken.csv"), "a,b\n\"unterminated,1\n").unwrap();

    let registry = DatasetRegistry::load_all(dir.path(), &[AUTH_LOG_DATASET, "broken.csv", "absent.csv"]);
    assert!(registry.get(AUTH_LOG_DATASET).is_some());
    assert!(registry.get("broken.csv").is_none());
    assert!(registry.failure("broken.csv").unwrap().contains("unterminated"));
    assert!(registry.failure("absent.csv").unwrap().contains("not found"));

    let summaries = registry.summaries();
    assert_eq!(summaries.len(), 3);
    assert_eq!(summaries.iter().filter(|s| s.loaded).count(), 1);
}

#[test]
fn dashboard_loads_from_directory() {
    let dir = TempDir::new().unwrap();
    write_csv(
        &dir.path().join(AUTH_LOG_DATASET),
        &HEADER,
        &[
            "u1,failure,\"Tokyo, Japan\",2024-03-01 01:00:00,Firefox/121.0",
            "u1,failure,\"Tokyo, Japan\",2024-03-01 01:05:00,Firefox/121.0",
            "u2,SUCCESS,\"Berlin, Germany\",2024-03-01 09:30:00,Chrome/120.0 Safari/537.36",
            "u3,success,\"Atlantis\",2024-03-01 09:30:00,",
        ],
    );
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        datasets: vec![AUTH_LOG_DATASET.to_string()],
        ..Config::default()
    };
    let dashboard = Dashboard::load(config);

    let map = dashboard.login_map().unwrap();
    assert_eq!(map.stats.len(), 2);
    assert_eq!(map.stats[0].geo_location, "Tokyo, Japan");
    assert_eq!(map.stats[0].fail_marker_size, 40.0);
    assert_eq!(map.stats[1].success_marker_size, 40.0);

    let fig = dashboard.render_view(View::BusinessHours).unwrap();
    // Tokyo 10:00 and 10:05 local, Berlin 10:30 local; Atlantis has no zone.
    assert_eq!(fig.data[0]["values"], serde_json::json!([3, 0]));
    assert_eq!(fig.layout["meta"]["unclassified"], 1);
}

#[test]
fn absent_auth_log_renders_placeholder() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    let dashboard = Dashboard::load(config);
    assert!(matches!(
        dashboard.render_view(View::UserAgentDist),
        Err(DashboardError::DatasetUnavailable(_))
    ));
    let fig = dashboard.render_view_or_placeholder(View::UserAgentDist);
    assert!(fig.data.is_empty());
}

#[test]
fn manifest_reports_missing_columns() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.csv");
    write_csv(&path, &["login_status", "user_agent"], &["success,Firefox", "failure,Chrome"]);
    let manifest = build_manifest(&path, &["login_status", "geo_location"], 1_700_000_000).unwrap();
    assert_eq!(manifest.row_count, 2);
    assert_eq!(manifest.missing_columns, vec!["geo_location".to_string()]);
    assert_eq!(manifest.hash_sha256.len(), 64);
}
