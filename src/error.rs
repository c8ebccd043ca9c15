use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Failure converting a single workbook. The driver logs these and moves on.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to open workbook {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    #[error("This XLSX file contains no sheets: {path}")]
    NoSheets { path: PathBuf },

    #[error("No sheet {index} available, please select a sheet between 0 and {max}")]
    InvalidSheetIndex { index: usize, max: usize },

    #[error("Failed to read sheet '{sheet}': {source}")]
    SheetRead {
        sheet: String,
        #[source]
        source: calamine::XlsxError,
    },

    #[error("Failed to create output file {path}: {source}")]
    OutputCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot format cell at row {row}, column {column}: {message}")]
    CellFormat {
        row: usize,
        column: usize,
        message: String,
    },

    #[error("Failed to write record {record}: {source}")]
    Write {
        record: usize,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to flush delimited output: {source}")]
    Flush {
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportErrorKind {
    Open,
    NoSheets,
    InvalidSheetIndex,
    SheetRead,
    OutputCreate,
    CellFormat,
    Write,
    Flush,
}

impl ExportError {
    pub fn kind(&self) -> ExportErrorKind {
        match self {
            ExportError::Open { .. } => ExportErrorKind::Open,
            ExportError::NoSheets { .. } => ExportErrorKind::NoSheets,
            ExportError::InvalidSheetIndex { .. } => ExportErrorKind::InvalidSheetIndex,
            ExportError::SheetRead { .. } => ExportErrorKind::SheetRead,
            ExportError::OutputCreate { .. } => ExportErrorKind::OutputCreate,
            ExportError::CellFormat { .. } => ExportErrorKind::CellFormat,
            ExportError::Write { .. } => ExportErrorKind::Write,
            ExportError::Flush { .. } => ExportErrorKind::Flush,
        }
    }

    /// Valid sheet indices as an inclusive range, for index errors only.
    pub fn valid_range(&self) -> Option<(usize, usize)> {
        match self {
            ExportError::InvalidSheetIndex { max, .. } => Some((0, *max)),
            _ => None,
        }
    }
}

/// A directory listing failure surfaced by the walker.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to list {}: {source}", display_path(.path))]
    Walk {
        path: Option<PathBuf>,
        depth: usize,
        #[source]
        source: walkdir::Error,
    },
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<unknown>".to_string())
}

impl ScanError {
    /// True when the walk root itself could not be read.
    pub fn is_root(&self) -> bool {
        match self {
            ScanError::Walk { depth, .. } => *depth == 0,
        }
    }
}

impl From<walkdir::Error> for ScanError {
    fn from(error: walkdir::Error) -> Self {
        ScanError::Walk {
            path: error.path().map(|p| p.to_path_buf()),
            depth: error.depth(),
            source: error,
        }
    }
}

#[derive(Error, Debug)]
pub enum Xlsx2CsvError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid delimiter {delimiter:?}: {reason}")]
    InvalidDelimiter { delimiter: String, reason: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Xlsx2CsvError {
    fn user_message(&self) -> String {
        match self {
            Xlsx2CsvError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            Xlsx2CsvError::InvalidDelimiter { delimiter, reason } => {
                format!("Invalid delimiter {:?}: {}", delimiter, reason)
            }
            Xlsx2CsvError::InvalidPath { path } => {
                format!("Invalid path: {}", path)
            }
            Xlsx2CsvError::Scan(e) => format!("Directory walk failed: {}", e),
            Xlsx2CsvError::Export(e) => e.user_message(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Xlsx2CsvError::Config { .. } => Some(
                "Check your configuration file syntax, or regenerate one with --generate-config.".to_string()
            ),
            Xlsx2CsvError::InvalidDelimiter { .. } => Some(
                "Use a single ASCII character such as ',' ';' '|' or a tab.".to_string()
            ),
            Xlsx2CsvError::Scan(_) => Some(
                "Ensure the input directory exists and is readable.".to_string()
            ),
            Xlsx2CsvError::Export(e) => e.suggestion(),
            _ => None,
        }
    }
}

impl UserFriendlyError for ExportError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            ExportError::Open { .. } => Some(
                "The file may be corrupt, password protected, or not an .xlsx workbook.".to_string()
            ),
            ExportError::InvalidSheetIndex { .. } => Some(
                "Pick a sheet that exists in every workbook with -i.".to_string()
            ),
            ExportError::OutputCreate { .. } => Some(
                "Ensure you have write permission for the output directory.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for Xlsx2CsvError {
    fn from(error: toml::de::Error) -> Self {
        Xlsx2CsvError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Xlsx2CsvError>;
