//! Security-log dashboard backend.
//!
//! Loads the configured datasets once, then serves figures as JSON.
//! Run with: cargo run -- (DATA_DIR, DASHBOARD_PORT, ... from the environment)

use std::net::TcpListener;

use anyhow::{Context, Result};
use serde_json::json;

use authmap::config::Config;
use authmap::dashboard::Dashboard;
use authmap::logging::{log, obj, v_str, Domain, Level};
use authmap::server::serve;

fn main() -> Result<()> {
    let cfg = Config::from_env();
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("data_dir", v_str(&cfg.data_dir.display().to_string())),
            ("datasets", json!(cfg.datasets)),
            ("port", json!(cfg.port)),
        ]),
    );

    let dashboard = Dashboard::load(cfg);
    let port = dashboard.config().port;
    let loaded = dashboard.datasets().iter().filter(|d| d.loaded).count();
    log(
        Level::Info,
        Domain::System,
        "datasets_ready",
        obj(&[("loaded", json!(loaded)), ("total", json!(dashboard.datasets().len()))]),
    );

    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).with_context(|| format!("failed to bind {}", addr))?;
    println!("Dashboard API running at http://localhost:{}", port);
    println!();
    println!("Endpoints:");
    println!("  GET /api/tabs              - Tab list");
    println!("  GET /api/tab?name=<tab>    - Views for a tab");
    println!("  GET /api/view?name=<view>  - Figure JSON");
    println!("  GET /api/login_map         - Heatmap stats and layers");
    println!("  GET /api/datasets          - Dataset load status");
    println!("  GET /api/health            - Health check");
    println!();

    serve(listener, &dashboard);
    Ok(())
}
