use crate::config::Config;
use crate::error::{ExportError, ExportErrorKind};
use crate::exporter::ExportOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Everything that happened during one directory conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub converted: Vec<ExportOutcome>,
    pub failures: Vec<FailedFile>,
    /// Directories below the root that could not be listed.
    pub scan_errors: Vec<String>,
    /// Output files written more than once in this run; the last writer wins.
    pub overwritten: Vec<PathBuf>,
    pub config_used: ConfigSnapshot,
    #[serde(skip)]
    start_time: Instant,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub kind: ExportErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigSnapshot {
    pub sheet_index: usize,
    pub delimiter: char,
    pub max_depth: Option<usize>,
}

impl From<&Config> for ConfigSnapshot {
    fn from(config: &Config) -> Self {
        Self {
            sheet_index: config.export.sheet_index,
            delimiter: config.export.delimiter,
            max_depth: config.scan.max_depth,
        }
    }
}

impl ConversionReport {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
            converted: Vec::new(),
            failures: Vec::new(),
            scan_errors: Vec::new(),
            overwritten: Vec::new(),
            config_used: ConfigSnapshot::from(config),
            start_time: Instant::now(),
        }
    }

    pub fn record_success(&mut self, outcome: ExportOutcome) {
        self.converted.push(outcome);
    }

    pub fn record_failure(&mut self, path: &Path, error: &ExportError) {
        self.failures.push(FailedFile {
            path: path.to_path_buf(),
            kind: error.kind(),
            message: error.to_string(),
        });
    }

    pub fn add_scan_error<S: Into<String>>(&mut self, error: S) {
        self.scan_errors.push(error.into());
    }

    pub fn add_overwritten(&mut self, path: PathBuf) {
        self.overwritten.push(path);
    }

    pub fn finish(&mut self) {
        self.elapsed = self.start_time.elapsed();
    }

    pub fn files_seen(&self) -> usize {
        self.converted.len() + self.failures.len()
    }

    pub fn total_records(&self) -> usize {
        self.converted.iter().map(|o| o.records).sum()
    }
}

impl Default for ConversionReport {
    fn default() -> Self {
        Self::new()
    }
}
