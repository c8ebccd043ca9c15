use crate::error::{UserFriendlyError, Xlsx2CsvError};
use crate::report::ConversionReport;
use console::{style, Emoji, Term};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

/// Terminal rendering of progress messages and the final report.
///
/// Errors always go to stderr so that per-file failures stay visible when
/// stdout is redirected. In JSON mode stdout carries only the final document
/// (report or workbook list); every message line goes to stderr.
pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Success, message),
                OutputMode::Json => self.print_json_message("success", message),
                OutputMode::Plain => println!("SUCCESS: {}", message),
            }
        }
    }

    /// Shown even in quiet mode.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => eprintln!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &Xlsx2CsvError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    eprintln!(
                        "{}",
                        serde_json::json!({
                            "type": "suggestion",
                            "message": suggestion
                        })
                    );
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    pub fn print_conversion_report(&self, report: &ConversionReport) {
        match self.mode {
            OutputMode::Human => {
                if !self.quiet {
                    self.print_human_report(report);
                }
            }
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => {
                if !self.quiet {
                    self.print_plain_report(report);
                }
            }
        }
    }

    pub fn print_workbook_list(&self, workbooks: &[PathBuf]) {
        match self.mode {
            OutputMode::Json => {
                let paths: Vec<String> = workbooks
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                self.print_json_object(&serde_json::json!({
                    "type": "workbooks",
                    "paths": paths
                }));
            }
            _ => {
                for workbook in workbooks {
                    println!("  {}", workbook.display());
                }
            }
        }
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "type": "header",
                        "title": title
                    })
                );
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        let to_stderr = matches!(msg_type, MessageType::Error | MessageType::Warning);

        let line = if self.use_colors {
            let (emoji, styled) = match msg_type {
                MessageType::Success => (&CHECKMARK, style(message).green().bold()),
                MessageType::Error => (&CROSS, style(message).red().bold()),
                MessageType::Warning => (&WARNING, style(message).yellow().bold()),
                MessageType::Info => (&INFO, style(message).cyan()),
            };
            format!("{}{}", emoji, styled)
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };
            format!("{} {}", prefix, message)
        };

        if to_stderr {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        let object = serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        eprintln!("{}", object);
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_report(&self, report: &ConversionReport) {
        println!();
        self.print_separator();

        if self.use_colors {
            println!(
                "{} {}",
                style("Conversion completed!").green().bold(),
                CHECKMARK
            );
        } else {
            println!("✓ Conversion completed!");
        }

        println!();
        println!("  Sheets written:  {}", self.highlight(report.converted.len()));
        println!("  Records written: {}", self.highlight(report.total_records()));
        println!(
            "  Time taken:      {}",
            self.highlight(format_duration(report.elapsed))
        );

        if !report.failures.is_empty() {
            println!("  Failed files:    {}", report.failures.len());
        }

        if self.verbose_level > 0 && !report.converted.is_empty() {
            println!();
            for outcome in &report.converted {
                if let Some(ref output) = outcome.output_path {
                    println!("  {} -> {}", outcome.source.display(), output.display());
                }
            }
        }

        self.print_separator();
    }

    fn print_plain_report(&self, report: &ConversionReport) {
        println!("COMPLETED: Conversion");
        println!("Sheets written: {}", report.converted.len());
        println!("Records written: {}", report.total_records());
        println!("Duration: {:?}", report.elapsed);
        if !report.failures.is_empty() {
            println!("Failed files: {}", report.failures.len());
        }
    }

    fn highlight<T: std::fmt::Display>(&self, value: T) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

pub(crate) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
