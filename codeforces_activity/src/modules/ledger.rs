use crate::{
    modules::clock,
    types::ledger::{LedgerRow, HEADER},
};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use thiserror::Error;

type Result<T> = std::result::Result<T, LedgerError>;

pub const OUTPUT_BASENAME: &str = "codeforces_activity";

static LEDGER_FILE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^codeforces_activity_(\d{8}T\d{6})\.csv$").unwrap());

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger {} doesn't start with the expected header", .0.display())]
    MalformedLedgerHeader(PathBuf),
    #[error("no codeforces_activity_*.csv file found in {}", .0.display())]
    NoLedgerFound(PathBuf),
    #[error("file name doesn't end with _YYYYMMDDTHHMMSS.csv: {0}")]
    InvalidFileName(String),
    #[error("failed to read or write CSV data")]
    Csv(#[from] csv::Error),
    #[error("failed to access ledger file")]
    Io(#[from] std::io::Error),
}

/// A ledger file together with the stamp embedded in its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerFile {
    pub path: PathBuf,
    pub stamp: String,
}

impl LedgerFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        let stamp = LEDGER_FILE_NAME
            .captures(name)
            .and_then(|captures| captures.get(1))
            .map(|stamp| stamp.as_str().to_string())
            .filter(|stamp| clock::stamp_to_epoch(stamp).is_some())
            .ok_or_else(|| LedgerError::InvalidFileName(path.display().to_string()))?;

        Ok(Self {
            path: path.to_path_buf(),
            stamp,
        })
    }

    pub fn name_for(stamp: &str) -> String {
        format!("{}_{}.csv", OUTPUT_BASENAME, stamp)
    }

    /// Submissions created at or before this epoch second are already recorded.
    pub fn watermark(&self) -> i64 {
        clock::stamp_to_epoch(&self.stamp).unwrap_or(0)
    }

    pub fn cutoff_label(&self) -> String {
        clock::stamp_label(&self.stamp).unwrap_or_else(|| self.stamp.clone())
    }
}

/// Finds the ledger with the latest stamp in `dir`.
pub fn find_latest(dir: &Path) -> Result<Option<LedgerFile>> {
    let mut latest: Option<LedgerFile> = None;

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Ok(file) = LedgerFile::from_path(&path) else {
            continue;
        };
        if latest.as_ref().map_or(true, |latest| file.stamp > latest.stamp) {
            latest = Some(file);
        }
    }

    Ok(latest)
}

/// Reads the raw rows of a ledger, rejecting files whose header isn't the expected one.
pub fn read_records(path: &Path) -> Result<Vec<StringRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = reader.records();
    let header = match records.next() {
        Some(header) => header?,
        None => return Ok(Vec::new()),
    };
    if header.iter().ne(HEADER.iter().copied()) {
        return Err(LedgerError::MalformedLedgerHeader(path.to_path_buf()));
    }

    records
        .map(|record| record.map_err(LedgerError::from))
        .collect()
}

/// Rows of the previous ledger to carry forward verbatim.
///
/// A ledger with an unexpected header is treated as if there were no previous ledger.
pub fn load_existing(file: Option<&LedgerFile>) -> Result<Vec<StringRecord>> {
    let Some(file) = file else {
        tracing::info!("No previous ledger found, all accepted submissions are new");
        return Ok(Vec::new());
    };

    match read_records(&file.path) {
        Ok(records) => {
            tracing::info!(
                "{} rows carried over from {}",
                records.len(),
                file.path.display()
            );
            Ok(records)
        }
        Err(LedgerError::MalformedLedgerHeader(path)) => {
            tracing::warn!(
                "{} has an unexpected header, its rows will not be carried over",
                path.display()
            );
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Reads a ledger into typed rows, in file order.
pub fn read_rows(path: &Path) -> Result<Vec<LedgerRow>> {
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<LedgerRow>, csv::Error>>()?;

    tracing::info!("{} rows read from {}", rows.len(), path.display());
    Ok(rows)
}

/// Writes header, carried over rows and new rows to `<dir>/codeforces_activity_<stamp>.csv`.
///
/// The content goes to a temporary file first, so the ledger appears complete or not at all.
pub fn write(
    dir: &Path,
    stamp: &str,
    existing: &[StringRecord],
    rows: &[LedgerRow],
) -> Result<PathBuf> {
    let path = dir.join(LedgerFile::name_for(stamp));

    // Removed on drop unless persisted.
    let mut temporary = NamedTempFile::new_in(dir)?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(&mut temporary);
    writer.write_record(HEADER)?;
    for record in existing {
        writer.write_record(record)?;
    }
    for row in rows {
        writer.write_record(row.fields())?;
    }
    writer.flush()?;
    drop(writer);

    temporary.persist(&path).map_err(|e| e.error)?;
    tracing::info!(
        "{} rows ({} new) written to {}",
        existing.len() + rows.len(),
        rows.len(),
        path.display()
    );

    Ok(path)
}
