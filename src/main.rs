use clap::{CommandFactory, Parser};
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;
use xlsx2csv::{
    Cli, OutputFormatter, OutputMode, ScanStatistics, UserFriendlyError, Xlsx2Csv, Xlsx2CsvError,
};

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    // Usage errors exit with 1, help and version with 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            return 1;
        }
    };

    setup_logging(cli.verbosity_level(), cli.quiet);

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let (input_dir, output_dir) = match (cli.input_dir.as_deref(), cli.output_dir.as_deref()) {
        (Some(input), Some(output)) => (input, output),
        _ => {
            eprintln!("{}", Cli::command().render_usage());
            return 1;
        }
    };

    let converter = match Xlsx2Csv::from_cli(&cli) {
        Ok(converter) => converter,
        Err(e) => {
            print_startup_error(&e, cli.output_mode());
            return 1;
        }
    };

    if cli.dry_run {
        return handle_dry_run(&converter, input_dir, output_dir);
    }

    match converter.convert_directory(input_dir, output_dir) {
        Ok(report) => {
            converter.output_formatter().print_conversion_report(&report);
            // per-file failures were already reported on stderr
            0
        }
        Err(e) => {
            converter.handle_error(&e);
            1
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "xlsx2csv.toml".to_string());

    match Xlsx2Csv::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  xlsx2csv --config {} <INPUT_DIR> <OUTPUT_DIR>", config_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(converter: &Xlsx2Csv, input_dir: &Path, output_dir: &Path) -> i32 {
    let formatter = converter.output_formatter();

    formatter.info("DRY RUN MODE - No files will be written");
    formatter.print_separator();

    let config = converter.config();
    formatter.info("Configuration that would be used:");
    formatter.info(&format!("  Sheet index: {}", config.export.sheet_index));
    formatter.info(&format!("  Delimiter: {:?}", config.export.delimiter));
    if let Some(max_depth) = config.scan.max_depth {
        formatter.info(&format!("  Max depth: {}", max_depth));
    }
    formatter.info(&format!("  Output directory: {}", output_dir.display()));

    let workbooks = match converter.find_workbooks(input_dir) {
        Ok(workbooks) => workbooks,
        Err(e) => {
            converter.handle_error(&e);
            return 1;
        }
    };

    formatter.print_header("Workbooks that would be converted");
    formatter.print_workbook_list(&workbooks);
    formatter.debug(&ScanStatistics::from_paths(&workbooks).display_summary());

    formatter.print_separator();
    formatter.success(&format!("Dry run found {} workbooks", workbooks.len()));

    0
}

fn print_startup_error(error: &Xlsx2CsvError, mode: OutputMode) {
    let formatter = OutputFormatter::new(mode, 0, false);
    formatter.print_user_friendly_error(error);
}

/// Diagnostics go to stderr. `RUST_LOG` wins over the verbosity flags.
fn setup_logging(verbosity: u8, quiet: bool) {
    let default_filter = match (quiet, verbosity) {
        (true, _) => "xlsx2csv=error",
        (false, 0) => "xlsx2csv=warn",
        (false, 1) => "xlsx2csv=info",
        (false, _) => "xlsx2csv=debug",
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
