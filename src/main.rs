/// cppcheck report converter
///
/// The main entry point of the command line tool. It parses command-line
/// arguments, merges them with an optional config file, and writes the CSV
/// tables and/or the HTML report.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use colored::Colorize;
use log::{error, warn, LevelFilter};

use cppcheck_report::app::{run_conversion, ConversionOptions, ConversionOutcome};
use cppcheck_report::config::{load_config, ReportConfig};
use cppcheck_report::utils::output_formatter::create_summary;
use cppcheck_report::FilterCriteria;

/// Command line argument structure
#[derive(Parser, Debug)]
#[command(
    name = "cppcheck_report",
    version,
    about = "Parse cppcheck XML output and generate CSV or HTML reports",
    long_about = "Parse cppcheck XML output and generate:
- <stem>_all_errors.csv: every error ID with its count
- <stem>_severities.csv: every severity with its count
- <stem>_error_severity_only.csv: error IDs of 'error' severity findings
- <stem>_report.html: findings grouped by file, with optional filters

CSV output is the default when neither --csv nor --html is given."
)]
struct Args {
    /// Path to the cppcheck XML output file
    input_file: PathBuf,

    /// Output directory for files (default: current directory)
    #[arg(long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Generate CSV files (default behavior)
    #[arg(long = "csv", action = ArgAction::SetTrue)]
    csv: bool,

    /// Generate HTML report
    #[arg(long = "html", action = ArgAction::SetTrue)]
    html: bool,

    /// Comma-separated list of severities to include (for HTML output)
    #[arg(long = "severity")]
    severity: Option<String>,

    /// Comma-separated list of error IDs to include (for HTML output)
    #[arg(long = "error-id")]
    error_id: Option<String>,

    /// Comma-separated list of error IDs to exclude (for HTML output)
    #[arg(long = "not-error-id")]
    not_error_id: Option<String>,

    /// Wildcard expression to match file names (for HTML output)
    #[arg(long = "file")]
    file: Option<String>,

    /// GitHub repository URL (e.g. https://github.com/user/repo/blob/main) for file links
    #[arg(long = "github")]
    github: Option<String>,

    /// Path to a JSON configuration file
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Suppress terminal output
    #[arg(long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,

    /// Set logging level (default: WARN)
    #[arg(long = "log-level", default_value = "warn")]
    log_level: LevelFilter,

    /// Write log messages to this file instead of stderr
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

/// Main entry point function
fn main() {
    let args = Args::parse();

    // Set up logging
    setup_logging(&args);

    if let Err(e) = run(&args) {
        // stderr already gets the message below; only mirror it into a log file
        if args.log_file.is_some() {
            error!("{:#}", e);
        }
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

/// Set up logging with timestamped output to stderr or a log file
fn setup_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();

    // Set log level from arguments
    builder.filter_level(args.log_level);

    builder.format(|buf, record| {
        use chrono::Local;
        use std::io::Write;
        writeln!(
            buf,
            "{} - {} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Some(log_file) = &args.log_file {
        match File::create(log_file) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!(
                "{} cannot open log file {}: {}",
                "Warning:".yellow(),
                log_file.display(),
                e
            ),
        }
    }

    builder.init();
}

/// Merge command line flags over config file values
fn resolve_options(args: &Args, config: ReportConfig) -> Result<ConversionOptions> {
    let severity = args.severity.clone().or(config.severity);
    let error_id = args.error_id.clone().or(config.error_id);
    let not_error_id = args.not_error_id.clone().or(config.not_error_id);
    let file = args.file.clone().or(config.file);

    let criteria = FilterCriteria::from_options(
        severity.as_deref(),
        error_id.as_deref(),
        not_error_id.as_deref(),
        file.as_deref(),
    )?;

    let mut csv = args.csv || config.csv.unwrap_or(false);
    let html = args.html || config.html.unwrap_or(false);
    // CSV is the default mode
    if !csv && !html {
        csv = true;
    }

    if !html && !criteria.is_unrestricted() {
        warn!("Filter options only apply to the HTML report; pass --html to use them");
    }

    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| config.output_dir.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(ConversionOptions {
        input: args.input_file.clone(),
        output_dir,
        csv,
        html,
        criteria,
        github_url: args.github.clone().or(config.github),
    })
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let options = resolve_options(args, config)?;

    if !args.quiet {
        println!("Parsing cppcheck XML file: {}", options.input.display());
    }

    let outcome = run_conversion(&options)
        .with_context(|| format!("failed to convert {}", options.input.display()))?;

    if !args.quiet {
        print_outcome(&outcome, &options.output_dir);
    }

    Ok(())
}

fn print_outcome(outcome: &ConversionOutcome, output_dir: &Path) {
    let ok = "[OK]".green();

    if let Some(csv) = &outcome.csv {
        println!("Generating CSV files in: {}", output_dir.display());
        println!("{} All errors CSV: {}", ok, csv.all_errors.display());
        println!("{} Severities CSV: {}", ok, csv.severities.display());
        println!("{} Error severity only CSV: {}", ok, csv.error_only.display());
    }

    if let Some(html) = &outcome.html {
        println!("{} HTML report: {}", ok, html.display());
    }

    print!("{}", create_summary(&outcome.aggregates));
}
