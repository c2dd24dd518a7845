use authmap::data::{build_manifest, default_manifest_path};
use authmap::events::{COL_GEO_LOCATION, COL_LOGIN_STATUS, COL_LOGIN_TIMESTAMP, COL_USER_AGENT};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "Dateset 2__User_Authentication_Logs.csv".to_string());
    let path = PathBuf::from(path);

    let now_ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let required = [COL_LOGIN_STATUS, COL_GEO_LOCATION, COL_LOGIN_TIMESTAMP, COL_USER_AGENT];
    let manifest = match build_manifest(&path, &required, now_ts) {
        Ok(m) => m,
        Err(err) => {
            eprintln!("manifest failed: {}", err);
            std::process::exit(1);
        }
    };

    if !manifest.missing_columns.is_empty() {
        eprintln!("missing columns: {:?}", manifest.missing_columns);
    }

    let out_path = default_manifest_path(&path);
    let body = match serde_json::to_string_pretty(&manifest) {
        Ok(b) => b,
        Err(err) => {
            eprintln!("failed to encode manifest: {}", err);
            std::process::exit(2);
        }
    };
    if let Err(err) = fs::write(&out_path, body) {
        eprintln!("failed to write {}: {}", out_path.display(), err);
        std::process::exit(3);
    }
    println!("wrote manifest {}", out_path.display());
    if !manifest.missing_columns.is_empty() {
        std::process::exit(4);
    }
}
