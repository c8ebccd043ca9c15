pub mod cli;
pub mod config;
pub mod error;
pub mod exporter;
pub mod report;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ExportConfig, ScanConfig};
pub use error::{ExportError, ExportErrorKind, Result, ScanError, UserFriendlyError, Xlsx2CsvError};

// Core functionality re-exports
pub use exporter::{export, CsvOptions, ExportOutcome, SheetExporter};
pub use report::{ConfigSnapshot, ConversionReport, FailedFile};
pub use scanner::{ScanStatistics, WorkbookFilter, WorkbookScanner};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use std::collections::HashSet;
use std::fs::DirBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Drives a directory conversion: walk, export each workbook, report.
pub struct Xlsx2Csv {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl Xlsx2Csv {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        // spinner output would corrupt machine-readable stdout
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Ok(Self::new(
            config,
            cli_args.output_mode(),
            cli_args.verbose,
            cli_args.quiet,
        ))
    }

    /// Converts every workbook under `input_dir` into `output_dir`.
    ///
    /// Per-file failures are reported and recorded, never returned. Only an
    /// unusable output directory or an unreadable walk root fails the run.
    pub fn convert_directory(&self, input_dir: &Path, output_dir: &Path) -> Result<ConversionReport> {
        let mut report = ConversionReport::with_config(&self.config);

        ensure_output_dir(output_dir)?;
        self.output_formatter.start_operation(&format!(
            "Converting workbooks in {} to {}",
            input_dir.display(),
            output_dir.display()
        ));

        let exporter = SheetExporter::new(self.config.csv_options()?);
        let scanner = WorkbookScanner::new().with_max_depth(self.config.scan.max_depth);
        let spinner = self.progress_manager.create_spinner("Scanning for workbooks");
        let mut written: HashSet<PathBuf> = HashSet::new();

        for entry in scanner.walk(input_dir) {
            let path = match entry {
                Ok(path) => path,
                Err(e) if e.is_root() => {
                    spinner.finish_and_clear();
                    return Err(e.into());
                }
                Err(e) => {
                    debug!(error = %e, "skipping unreadable directory");
                    self.progress_manager
                        .suspend(|| self.output_formatter.warning(&e.to_string()));
                    report.add_scan_error(e.to_string());
                    continue;
                }
            };

            ui::progress::update_conversion_progress(&spinner, &report, &path);

            match exporter.export(output_dir, &path, self.config.export.sheet_index) {
                Ok(outcome) => {
                    if let Some(ref output) = outcome.output_path {
                        if !written.insert(output.clone()) {
                            let message = format!(
                                "{} overwrites {} written earlier in this run",
                                path.display(),
                                output.display()
                            );
                            self.progress_manager
                                .suspend(|| self.output_formatter.warning(&message));
                            report.add_overwritten(output.clone());
                        }
                    }
                    self.progress_manager.suspend(|| {
                        self.output_formatter.info(&format!(
                            "{} -> {} ({} records)",
                            path.display(),
                            outcome.sheet_name,
                            outcome.records
                        ))
                    });
                    report.record_success(outcome);
                }
                Err(e) => {
                    debug!(path = %path.display(), kind = ?e.kind(), "export failed");
                    self.progress_manager.suspend(|| {
                        self.output_formatter
                            .error(&format!("{}: {}", path.display(), e))
                    });
                    report.record_failure(&path, &e);
                }
            }
        }

        report.finish();
        ui::progress::finish_progress_with_summary(
            &spinner,
            &format!(
                "Converted {} of {} workbooks",
                report.converted.len(),
                report.files_seen()
            ),
            report.elapsed,
        );
        self.progress_manager.clear();

        Ok(report)
    }

    /// Workbooks a conversion would touch, in walk order. Unreadable
    /// subdirectories are warned about and skipped.
    pub fn find_workbooks(&self, input_dir: &Path) -> Result<Vec<PathBuf>> {
        let scanner = WorkbookScanner::new().with_max_depth(self.config.scan.max_depth);
        let mut workbooks = Vec::new();

        for entry in scanner.walk(input_dir) {
            match entry {
                Ok(path) => workbooks.push(path),
                Err(e) if e.is_root() => return Err(e.into()),
                Err(e) => self.output_formatter.warning(&e.to_string()),
            }
        }

        Ok(workbooks)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        Config::default().save_to_file(output_path)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &Xlsx2CsvError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Creates `path` and any missing parents with mode 0755. An existing
/// directory is fine; an existing non-directory is not.
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }

    builder.create(path).map_err(|e| Xlsx2CsvError::InvalidPath {
        path: format!("cannot create output directory {}: {}", path.display(), e),
    })
}
