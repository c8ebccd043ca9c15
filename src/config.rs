use crate::error::{Result, Xlsx2CsvError};
use crate::exporter::CsvOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    pub sheet_index: usize,
    pub delimiter: char,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScanConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_index: 0,
            delimiter: '\t',
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Xlsx2CsvError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| Xlsx2CsvError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| Xlsx2CsvError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["xlsx2csv.toml", ".xlsx2csv.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(sheet_index) = cli_args.sheet_index {
            self.export.sheet_index = sheet_index;
        }

        if let Some(delimiter) = cli_args.delimiter {
            self.export.delimiter = delimiter;
        }

        if let Some(max_depth) = cli_args.max_depth {
            self.scan.max_depth = Some(max_depth);
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| Xlsx2CsvError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| Xlsx2CsvError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_delimiter(self.export.delimiter)?;

        if self.scan.max_depth == Some(0) {
            return Err(Xlsx2CsvError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn csv_options(&self) -> Result<CsvOptions> {
        CsvOptions::new().with_delimiter(self.export.delimiter)
    }
}

/// The writer needs a one-byte separator that cannot be confused with quoting
/// or record boundaries.
pub fn validate_delimiter(delimiter: char) -> Result<()> {
    let reason = if !delimiter.is_ascii() {
        Some("must be a single ASCII character")
    } else if matches!(delimiter, '"' | '\r' | '\n') {
        Some("cannot be a quote or line break character")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Xlsx2CsvError::InvalidDelimiter {
            delimiter: delimiter.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Only the first character of the flag value is used.
pub fn parse_delimiter(value: &str) -> Result<char> {
    value
        .chars()
        .next()
        .ok_or_else(|| Xlsx2CsvError::InvalidDelimiter {
            delimiter: value.to_string(),
            reason: "cannot be empty".to_string(),
        })
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub sheet_index: Option<usize>,
    pub delimiter: Option<char>,
    pub max_depth: Option<usize>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet_index(mut self, sheet_index: Option<usize>) -> Self {
        self.sheet_index = sheet_index;
        self
    }

    pub fn with_delimiter(mut self, delimiter: Option<char>) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }
}
