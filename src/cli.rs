use crate::config::{parse_delimiter, CliOverrides, Config};
use crate::error::Result;
use crate::ui::OutputMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "xlsx2csv")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convert every .xlsx workbook under a directory into delimited text")]
#[command(
    long_about = "xlsx2csv walks INPUT_DIR recursively, and for each .xlsx workbook it finds \
                  writes the selected sheet to OUTPUT_DIR/<SheetName>.csv."
)]
#[command(after_help = "EXAMPLES:\n  \
    xlsx2csv reports/ csv/\n  \
    xlsx2csv -i 1 -d ';' reports/ csv/\n  \
    xlsx2csv --dry-run reports/ csv/\n  \
    xlsx2csv --generate-config --config xlsx2csv.toml")]
pub struct Cli {
    /// Directory searched recursively for .xlsx workbooks
    #[arg(required_unless_present = "generate_config")]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving one <SheetName>.csv per workbook
    #[arg(required_unless_present = "generate_config")]
    pub output_dir: Option<PathBuf>,

    /// Zero-based index of the sheet to export from each workbook
    #[arg(short = 'i', long, value_name = "N")]
    pub sheet_index: Option<usize>,

    /// Field delimiter; only the first character is used (default: tab)
    #[arg(short, long, value_name = "DELIM", allow_hyphen_values = true)]
    pub delimiter: Option<String>,

    /// Maximum directory depth to descend into
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors are printed)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// List the workbooks that would be converted without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Write a sample configuration file and exit
    #[arg(long)]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

impl Cli {
    /// Config file values first, then flags on top, then validation.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides()?;
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> Result<CliOverrides> {
        let delimiter = self
            .delimiter
            .as_deref()
            .map(parse_delimiter)
            .transpose()?;

        Ok(CliOverrides::new()
            .with_sheet_index(self.sheet_index)
            .with_delimiter(delimiter)
            .with_max_depth(self.max_depth))
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_format.into()
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Xlsx2CsvError;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("xlsx2csv").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_positional_directories() {
        let cli = parse(&["in", "out"]);
        assert_eq!(cli.input_dir, Some(PathBuf::from("in")));
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.sheet_index, None);
        assert_eq!(cli.delimiter, None);
    }

    #[test]
    fn test_wrong_positional_count_is_rejected() {
        assert!(Cli::try_parse_from(["xlsx2csv"]).is_err());
        assert!(Cli::try_parse_from(["xlsx2csv", "in"]).is_err());
        assert!(Cli::try_parse_from(["xlsx2csv", "in", "out", "extra"]).is_err());
    }

    #[test]
    fn test_generate_config_needs_no_directories() {
        let cli = parse(&["--generate-config"]);
        assert!(cli.generate_config);
        assert!(cli.input_dir.is_none());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["xlsx2csv", "-q", "-v", "in", "out"]).is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&["-i", "2", "-d", ";;", "in", "out"]);
        let overrides = cli.create_cli_overrides().unwrap();
        assert_eq!(overrides.sheet_index, Some(2));
        assert_eq!(overrides.delimiter, Some(';'));

        let mut config = Config::default();
        config.merge_with_cli_args(&overrides);
        assert_eq!(config.export.sheet_index, 2);
        assert_eq!(config.export.delimiter, ';');
    }

    #[test]
    fn test_empty_delimiter_is_rejected() {
        let cli = parse(&["-d", "", "in", "out"]);
        assert!(matches!(
            cli.create_cli_overrides(),
            Err(Xlsx2CsvError::InvalidDelimiter { .. })
        ));
    }

    #[test]
    fn test_hyphen_delimiter() {
        let cli = parse(&["-d", "-", "in", "out"]);
        assert_eq!(cli.delimiter.as_deref(), Some("-"));
    }

    #[test]
    fn test_output_mode_mapping() {
        let cli = parse(&["--output-format", "json", "in", "out"]);
        assert_eq!(cli.output_mode(), OutputMode::Json);
    }

    #[test]
    fn test_verbosity_level() {
        assert_eq!(parse(&["-vv", "in", "out"]).verbosity_level(), 2);
        assert_eq!(parse(&["-q", "in", "out"]).verbosity_level(), 0);
    }
}
