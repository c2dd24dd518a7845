//! Synthetic authentication log generator.
//!
//! Usage: gen_sample [rows] [out.csv]
//! Env: SEED (default 42)

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::env;
use std::fmt::Write as _;
use std::fs;

const LOCATIONS: [&str; 12] = [
    "Toronto, Canada",
    "Cape Town, South Africa",
    "San Francisco, USA",
    "New York, USA",
    "São Paulo, Brazil",
    "Sydney, Australia",
    "Tokyo, Japan",
    "Berlin, Germany",
    "Mumbai, India",
    "London, UK",
    // Not in the coordinate table; exercise the unmapped path.
    "Paris, France",
    "Lagos, Nigeria",
];

const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "curl/8.4.0",
];

fn main() -> Result<()> {
    let rows: usize = env::args().nth(1).and_then(|v| v.parse().ok()).unwrap_or(500);
    let out = env::args()
        .nth(2)
        .unwrap_or_else(|| "Dateset 2__User_Authentication_Logs.csv".to_string());
    let seed: u64 = env::var("SEED").ok().and_then(|v| v.parse().ok()).unwrap_or(42);
    let mut rng = StdRng::seed_from_u64(seed);

    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow::anyhow!("invalid start date"))?;

    let mut csv = String::from("user_id,login_status,geo_location,login_timestamp,user_agent\n");
    for i in 0..rows {
        let loc = LOCATIONS[rng.gen_range(0..LOCATIONS.len())];
        // Some locations are noisier than others.
        let fail_rate = 0.1 + 0.05 * (loc.len() % 7) as f64;
        let status = if rng.gen_bool(fail_rate) { "failure" } else { "success" };
        let ts = start + Duration::seconds(rng.gen_range(0..90 * 24 * 3600));
        let geo = if rng.gen_bool(0.02) { String::new() } else { format!("\"{}\"", loc) };
        let ua = USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())];
        writeln!(
            csv,
            "u{:04},{},{},{},\"{}\"",
            i % 200,
            status,
            geo,
            ts.format("%Y-%m-%d %H:%M:%S"),
            ua
        )?;
    }

    fs::write(&out, csv)?;
    println!("wrote {} rows to {}", rows, out);
    Ok(())
}
