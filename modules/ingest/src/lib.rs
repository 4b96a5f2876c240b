//! Import coordinator: resolve the input, probe it, stream it into one scan
//! transaction, then decide what happens to the source file.

mod persist;

use importer_core::{fs, ImportError};
use scan_db::{Db, ScanId, ScanMeta, ScanWriter};
use scan_records::RecordSource;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub use persist::{persist_record, Written};

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| String::new())
}

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Leave the source file in place even after a successful import.
    pub keep_source: bool,
    pub scanner_version: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ImportOutcome {
    /// Nothing readable at the input path.
    NoInput { path: PathBuf },
    /// The file holds no records; it was left alone and no scan was created.
    NoRecords { file: PathBuf },
    Imported(ImportReport),
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub file: PathBuf,
    pub scan_id: ScanId,
    /// Stream records imported without error.
    pub records: usize,
    pub hosts: usize,
    pub ports: usize,
    pub vulnerabilities: usize,
    pub failures: Vec<RecordFailure>,
    pub source: SourceDisposition,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordFailure {
    /// Zero-based position in the record stream.
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceDisposition {
    Removed,
    Kept,
    RemoveFailed(String),
}

/// Run one import of `input` (a file, or a directory whose newest file is
/// used) into the SQLite database at `db_path`.
///
/// The database is only opened once the input is known to hold at least one
/// record, so an empty or malformed file leaves no trace anywhere.
pub fn import(input: &Path, db_path: &Path, opts: &ImportOptions) -> Result<ImportOutcome, ImportError> {
    let Some(file) = fs::resolve_input(input) else {
        tracing::info!(path = %input.display(), "no input file found");
        return Ok(ImportOutcome::NoInput { path: input.to_path_buf() });
    };

    let source = RecordSource::open(&file);
    if !source.has_records() {
        tracing::info!(file = %file.display(), "file contains no records");
        return Ok(ImportOutcome::NoRecords { file });
    }

    let mut db = Db::open_or_create(db_path).map_err(|cause| ImportError::OpenStore {
        path: db_path.to_path_buf(),
        cause,
    })?;
    let mut report = import_source(&mut db, &source, opts)?;
    report.source = dispose_source(&report, opts);
    Ok(ImportOutcome::Imported(report))
}

/// Create the scan row and stream every record of `source` into `db` inside a
/// single transaction. Per-record failures are collected, not returned.
/// The source file is not touched.
pub fn import_source(db: &mut Db, source: &RecordSource, opts: &ImportOptions) -> Result<ImportReport, ImportError> {
    let raw_file = fs::absolute(source.path());
    let mut tx = db.begin_import()?;
    let scan_id = tx.insert_scan(&ScanMeta {
        scan_time: now_rfc3339(),
        scanner_version: opts.scanner_version.clone(),
        raw_file: raw_file.display().to_string(),
    })?;
    tracing::debug!(scan_id, file = %raw_file.display(), "scan opened");

    let mut report = ImportReport {
        file: raw_file,
        scan_id,
        records: 0,
        hosts: 0,
        ports: 0,
        vulnerabilities: 0,
        failures: Vec::new(),
        source: SourceDisposition::Kept,
    };

    for (index, record) in source.records()?.enumerate() {
        match persist_record(&mut tx, scan_id, &record) {
            Ok(written) => {
                report.records += 1;
                report.hosts += written.hosts;
                report.ports += written.ports;
                report.vulnerabilities += written.vulnerabilities;
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                tracing::warn!(index, error = %reason, "failed to import record");
                report.failures.push(RecordFailure { index, reason });
            }
        }
    }

    tx.commit().map_err(anyhow::Error::from)?;
    tracing::info!(
        scan_id,
        records = report.records,
        hosts = report.hosts,
        failed = report.failures.len(),
        "import committed"
    );
    Ok(report)
}

/// Consume the source only when something was actually imported.
fn dispose_source(report: &ImportReport, opts: &ImportOptions) -> SourceDisposition {
    if report.records == 0 {
        tracing::info!(file = %report.file.display(), "no records imported, leaving source for inspection");
        return SourceDisposition::Kept;
    }
    if opts.keep_source {
        return SourceDisposition::Kept;
    }
    match fs::remove_source(&report.file) {
        Ok(()) => {
            tracing::debug!(file = %report.file.display(), "source file deleted");
            SourceDisposition::Removed
        }
        Err(e) => {
            tracing::warn!(file = %report.file.display(), error = %e, "could not delete source file");
            SourceDisposition::RemoveFailed(e.to_string())
        }
    }
}

impl fmt::Display for ImportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportOutcome::NoInput { path } => {
                write!(f, "No file found at {} (no action).", path.display())
            }
            ImportOutcome::NoRecords { file } => {
                write!(f, "File {} contains no records (no action).", file.display())
            }
            ImportOutcome::Imported(r) => {
                write!(
                    f,
                    "Imported {} records ({} hosts, {} ports, {} vulnerabilities) as scan_id={}",
                    r.records, r.hosts, r.ports, r.vulnerabilities, r.scan_id
                )?;
                if !r.failures.is_empty() {
                    write!(f, ", {} failed", r.failures.len())?;
                }
                match &r.source {
                    SourceDisposition::Removed => write!(f, "; deleted {}", r.file.display()),
                    SourceDisposition::Kept => write!(f, "; kept {}", r.file.display()),
                    SourceDisposition::RemoveFailed(e) => {
                        write!(f, "; could not delete {}: {}", r.file.display(), e)
                    }
                }
            }
        }
    }
}
