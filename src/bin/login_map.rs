//! Print the login heatmap for one authentication log as JSON.
//!
//! Usage: login_map <file.csv> [--figure]

use anyhow::{bail, Context, Result};
use serde_json::json;
use std::env;
use std::path::PathBuf;

use authmap::aggregate::aggregate_table;
use authmap::config::{Config, LocationTable};
use authmap::data::load_csv;
use authmap::figure::login_map;
use authmap::layers::build_map_layers;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(path) = args.iter().find(|a| !a.starts_with("--")) else {
        bail!("usage: login_map <file.csv> [--figure]");
    };
    let as_figure = args.iter().any(|a| a == "--figure");
    let cfg = Config::from_env();

    let path = PathBuf::from(path);
    let table = load_csv(&path)?;
    let stats = aggregate_table(&table, &LocationTable::default(), cfg.max_marker_size)
        .with_context(|| format!("cannot aggregate {}", path.display()))?;
    let layers = build_map_layers(&stats);

    let payload = if as_figure {
        serde_json::to_value(login_map(&layers))?
    } else {
        json!({ "stats": stats, "layers": layers })
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
