//! Dataset loading: CSV files into in-memory tables.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{LoadError, SchemaError};
use crate::logging::{log_dataset_loaded, log_load_failure};

/// A loaded CSV: header plus string cells. Rows always have `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub bad_rows: usize,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, SchemaError> {
        self.column_index(name).ok_or_else(|| SchemaError::MissingColumn {
            column: name.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `(row, col)`; `None` for blank cells.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
    }
}

pub fn load_csv(path: &Path) -> Result<Table, LoadError> {
    let mut file = File::open(path).map_err(|e| LoadError::from_io(path.to_path_buf(), e))?;
    let mut raw = Vec::new();
    file.read_to_end(&mut raw)
        .map_err(|e| LoadError::from_io(path.to_path_buf(), e))?;
    let text = String::from_utf8(raw).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        message: format!("invalid utf-8: {}", e),
    })?;
    parse_csv(&text).map_err(|message| LoadError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse CSV text. The first non-blank record is the header.
pub fn parse_csv(text: &str) -> Result<Table, String> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = split_records(text)?.into_iter();
    let columns: Vec<String> = match records.next() {
        Some(header) => header.into_iter().map(|s| s.trim().to_string()).collect(),
        None => return Err("empty file: no header row".to_string()),
    };

    let mut rows = Vec::new();
    let mut bad_rows = 0usize;
    for mut record in records {
        if record.len() > columns.len() {
            bad_rows += 1;
            continue;
        }
        record.resize(columns.len(), String::new());
        rows.push(record);
    }

    Ok(Table {
        columns,
        rows,
        bad_rows,
    })
}

/// Split text into records of fields. Quoted fields may contain commas,
/// newlines and `""` escapes. Blank lines are skipped.
fn split_records(text: &str) -> Result<Vec<Vec<String>>, String> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line_no = 1usize;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line_no += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                line_no += 1;
                finish_record(&mut records, &mut record, &mut field);
            }
            _ => field.push(c),
        }
    }
    if in_quotes {
        return Err(format!("unterminated quoted field at line {}", line_no));
    }
    finish_record(&mut records, &mut record, &mut field);
    Ok(records)
}

fn finish_record(records: &mut Vec<Vec<String>>, record: &mut Vec<String>, field: &mut String) {
    if record.is_empty() && field.trim().is_empty() {
        field.clear();
        return;
    }
    record.push(std::mem::take(field));
    records.push(std::mem::take(record));
}

// =============================================================================
// Registry of loaded datasets
// =============================================================================

/// Datasets loaded at startup, keyed by file name. Failed loads are absent.
#[derive(Debug, Default, Clone)]
pub struct DatasetRegistry {
    tables: BTreeMap<String, Table>,
    failures: BTreeMap<String, String>,
}

impl DatasetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every named file from `dir`. Failures are logged and recorded; loading continues.
    pub fn load_all<S: AsRef<str>>(dir: &Path, names: &[S]) -> Self {
        let mut registry = Self::new();
        for name in names {
            let name = name.as_ref();
            match load_csv(&dir.join(name)) {
                Ok(table) => {
                    log_dataset_loaded(name, table.len(), table.bad_rows);
                    registry.insert(name, table);
                }
                Err(err) => {
                    log_load_failure(name, &err.to_string());
                    registry.failures.insert(name.to_string(), err.to_string());
                }
            }
        }
        registry
    }

    pub fn insert(&mut self, name: &str, table: Table) {
        self.failures.remove(name);
        self.tables.insert(name.to_string(), table);
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn failure(&self, name: &str) -> Option<&str> {
        self.failures.get(name).map(|s| s.as_str())
    }

    pub fn summaries(&self) -> Vec<DatasetSummary> {
        let loaded = self.tables.iter().map(|(name, t)| DatasetSummary {
            name: name.clone(),
            loaded: true,
            rows: t.len(),
            columns: t.columns.clone(),
            error: None,
        });
        let failed = self.failures.iter().map(|(name, err)| DatasetSummary {
            name: name.clone(),
            loaded: false,
            rows: 0,
            columns: Vec::new(),
            error: Some(err.clone()),
        });
        loaded.chain(failed).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub name: String,
    pub loaded: bool,
    pub rows: usize,
    pub columns: Vec<String>,
    pub error: Option<String>,
}

// =============================================================================
// Manifest
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub path: String,
    pub hash_sha256: String,
    pub row_count: usize,
    pub bad_rows: usize,
    pub columns: Vec<String>,
    pub missing_columns: Vec<String>,
    pub generated_at_epoch: u64,
}

pub fn build_manifest(
    path: &Path,
    required: &[&str],
    now_ts: u64,
) -> Result<DatasetManifest, LoadError> {
    let hash = file_sha256(path)?;
    let table = load_csv(path)?;
    let missing_columns = required
        .iter()
        .filter(|c| table.column_index(c).is_none())
        .map(|c| c.to_string())
        .collect();
    Ok(DatasetManifest {
        path: path.display().to_string(),
        hash_sha256: hash,
        row_count: table.len(),
        bad_rows: table.bad_rows,
        columns: table.columns,
        missing_columns,
        generated_at_epoch: now_ts,
    })
}

pub fn file_sha256(path: &Path) -> Result<String, LoadError> {
    let mut file = File::open(path).map_err(|e| LoadError::from_io(path.to_path_buf(), e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| LoadError::from_io(path.to_path_buf(), e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn default_manifest_path(dataset_path: &Path) -> PathBuf {
    let mut p = dataset_path.to_path_buf();
    let fname = dataset_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset.csv");
    p.set_file_name(format!("{}.manifest.json", fname));
    p
}
