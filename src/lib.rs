/// cppcheck report converter
///
/// This library reads cppcheck XML output and turns it into CSV count tables
/// and a filterable HTML report grouped by source file.

pub mod core;
pub mod utils;

// Re-export the main entry points for convenience
pub use crate::core::aggregate::{Aggregates, Tally};
pub use crate::core::defect::{DefectRecord, Location, Severity};
pub use crate::core::error::ReportError;
pub use crate::core::filter::FilterCriteria;
pub use crate::core::parser::{parse_report, parse_report_str};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse a report and count its findings
///
/// This is a convenience function for simple use cases.
///
/// # Arguments
///
/// * `report_path` - Path to the cppcheck XML file
///
/// # Returns
///
/// Counts by error id, by severity, and by id for `error` findings
pub fn summarize_report<P: AsRef<std::path::Path>>(
    report_path: P,
) -> Result<Aggregates, ReportError> {
    let records = parse_report(report_path.as_ref())?;
    Ok(Aggregates::from_records(&records))
}

/// Configuration file support
pub mod config {
    use std::fs;
    use std::path::Path;

    use log::{error, info};
    use serde::Deserialize;

    use crate::core::error::{ReportError, Result};

    /// Options that may be preset in a JSON config file.
    ///
    /// Every field is optional; command line flags take precedence.
    #[derive(Debug, Clone, Default, Deserialize, PartialEq)]
    #[serde(default, deny_unknown_fields)]
    pub struct ReportConfig {
        pub severity: Option<String>,
        #[serde(alias = "error-id")]
        pub error_id: Option<String>,
        #[serde(alias = "not-error-id")]
        pub not_error_id: Option<String>,
        pub file: Option<String>,
        pub github: Option<String>,
        #[serde(alias = "output-dir")]
        pub output_dir: Option<String>,
        pub csv: Option<bool>,
        pub html: Option<bool>,
    }

    /// Load configuration from file if provided
    ///
    /// A missing file is logged and ignored; a file that does not parse is
    /// a configuration error.
    pub fn load_config(config_path: Option<&Path>) -> Result<ReportConfig> {
        let path = match config_path {
            Some(path) => path,
            None => return Ok(ReportConfig::default()),
        };

        if !path.exists() {
            error!("Configuration file not found: {}", path.display());
            return Ok(ReportConfig::default());
        }

        let config_str = fs::read_to_string(path)
            .map_err(|e| ReportError::file("cannot read config file", path, e))?;
        let config = serde_json::from_str(&config_str).map_err(|e| {
            ReportError::Config(format!("{}: {}", path.display(), e))
        })?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

}

/// Command-line application functionality
pub mod app {
    use std::path::PathBuf;

    use log::{info, warn};

    use crate::core::aggregate::Aggregates;
    use crate::core::error::Result;
    use crate::core::filter::FilterCriteria;
    use crate::core::parser::parse_report;
    use crate::utils::file_utils::{ensure_output_dir, report_stem};
    use crate::utils::output_formatter::{write_csv_reports, write_html_report, CsvOutputs};

    /// Everything needed for one conversion run
    #[derive(Debug, Clone)]
    pub struct ConversionOptions {
        pub input: PathBuf,
        pub output_dir: PathBuf,
        pub csv: bool,
        pub html: bool,
        pub criteria: FilterCriteria,
        pub github_url: Option<String>,
    }

    /// What a conversion run produced
    #[derive(Debug)]
    pub struct ConversionOutcome {
        pub aggregates: Aggregates,
        pub csv: Option<CsvOutputs>,
        pub html: Option<PathBuf>,
    }

    /// Parse the input report and write the requested outputs
    ///
    /// # Arguments
    ///
    /// * `options` - Input, output directory, modes and filters
    ///
    /// # Returns
    ///
    /// Counts for the whole report and the paths that were written
    pub fn run_conversion(options: &ConversionOptions) -> Result<ConversionOutcome> {
        let records = parse_report(&options.input)?;
        if records.is_empty() {
            warn!("No errors found in {}", options.input.display());
        }

        let aggregates = Aggregates::from_records(&records);
        let stem = report_stem(&options.input);

        ensure_output_dir(&options.output_dir)?;

        let csv = if options.csv {
            Some(write_csv_reports(&aggregates, &options.output_dir, &stem)?)
        } else {
            None
        };

        let html = if options.html {
            Some(write_html_report(
                &records,
                &options.criteria,
                &options.input,
                options.github_url.as_deref(),
                &options.output_dir,
                &stem,
            )?)
        } else {
            None
        };

        info!(
            "Converted {} records from {}",
            aggregates.total(),
            options.input.display()
        );

        Ok(ConversionOutcome {
            aggregates,
            csv,
            html,
        })
    }
}
