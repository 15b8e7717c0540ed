/// Output formatter for parsed reports
///
/// This module renders the count tables as CSV, the filtered findings as a
/// self-contained HTML report, and the run summary for the console.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use colored::Colorize;
use handlebars::Handlebars;
use log::info;
use serde::Serialize;

use crate::core::aggregate::{Aggregates, Tally};
use crate::core::defect::{DefectRecord, Location};
use crate::core::error::{ReportError, Result};
use crate::core::filter::FilterCriteria;
use crate::utils::file_utils::{
    output_path, write_atomically, ALL_ERRORS_SUFFIX, ERROR_ONLY_SUFFIX, HTML_REPORT_SUFFIX,
    SEVERITIES_SUFFIX,
};

/// Header of the two error id tables
pub const ERROR_ID_HEADER: [&str; 2] = ["Count", "Error ID"];
/// Header of the severities table
pub const SEVERITY_HEADER: [&str; 2] = ["Count", "Severity"];

/// Label used for findings that carry no location
pub const UNKNOWN_FILE: &str = "(unknown file)";

/// Render a two-column count table with a header row
fn render_table<'a>(
    header: [&str; 2],
    rows: impl IntoIterator<Item = (&'a str, usize)>,
) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(header)
        .map_err(|e| ReportError::render("CSV header", e))?;
    for (key, count) in rows {
        writer
            .write_record([count.to_string().as_str(), key])
            .map_err(|e| ReportError::render("CSV record", e))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::render("CSV table", e))?;
    String::from_utf8(bytes).map_err(|e| ReportError::render("CSV table", e))
}

/// Every error id with its count, smallest count first
pub fn render_all_errors_csv(aggregates: &Aggregates) -> Result<String> {
    render_table(ERROR_ID_HEADER, aggregates.by_id.sorted_by_count())
}

/// Every severity with its count, alphabetically
pub fn render_severities_csv(aggregates: &Aggregates) -> Result<String> {
    render_table(SEVERITY_HEADER, aggregates.by_severity.sorted_by_key())
}

/// Ids of `error` severity findings with their count, smallest count first
pub fn render_error_only_csv(aggregates: &Aggregates) -> Result<String> {
    render_table(ERROR_ID_HEADER, aggregates.error_only.sorted_by_count())
}

/// Paths of the three CSV files written for one report
#[derive(Debug, Clone)]
pub struct CsvOutputs {
    pub all_errors: PathBuf,
    pub severities: PathBuf,
    pub error_only: PathBuf,
}

/// Write the three CSV tables for a report.
///
/// All tables are rendered before the first file is written.
///
/// # Arguments
///
/// * `aggregates` - Counts computed from the report
/// * `output_dir` - Existing directory receiving the files
/// * `stem` - Input file stem used to name the files
///
/// # Returns
///
/// The paths that were written
pub fn write_csv_reports(aggregates: &Aggregates, output_dir: &Path, stem: &str) -> Result<CsvOutputs> {
    let all_errors = render_all_errors_csv(aggregates)?;
    let severities = render_severities_csv(aggregates)?;
    let error_only = render_error_only_csv(aggregates)?;

    let outputs = CsvOutputs {
        all_errors: output_path(output_dir, stem, ALL_ERRORS_SUFFIX),
        severities: output_path(output_dir, stem, SEVERITIES_SUFFIX),
        error_only: output_path(output_dir, stem, ERROR_ONLY_SUFFIX),
    };

    write_atomically(&outputs.all_errors, all_errors.as_bytes())?;
    write_atomically(&outputs.severities, severities.as_bytes())?;
    write_atomically(&outputs.error_only, error_only.as_bytes())?;

    info!("Wrote CSV tables to {}", output_dir.display());
    Ok(outputs)
}

/// Findings that point into one file
#[derive(Debug)]
pub struct FileEntries<'a> {
    /// `None` for findings without any location
    pub file: Option<&'a str>,
    pub entries: Vec<(&'a DefectRecord, Option<&'a Location>)>,
}

/// Group records by the file of each of their locations.
///
/// A record with N locations lands in N entries; records without locations
/// are collected in a trailing group with no file. Files are sorted by name
/// and entries keep the order of `records`.
pub fn group_by_file<'a>(records: &[&'a DefectRecord]) -> Vec<FileEntries<'a>> {
    let mut by_file: BTreeMap<&'a str, Vec<(&'a DefectRecord, Option<&'a Location>)>> =
        BTreeMap::new();
    let mut unlocated = Vec::new();

    for &record in records {
        if record.locations.is_empty() {
            unlocated.push((record, None));
        }
        for location in &record.locations {
            by_file
                .entry(location.file.as_str())
                .or_default()
                .push((record, Some(location)));
        }
    }

    let mut groups: Vec<FileEntries<'a>> = by_file
        .into_iter()
        .map(|(file, entries)| FileEntries {
            file: Some(file),
            entries,
        })
        .collect();

    if !unlocated.is_empty() {
        groups.push(FileEntries {
            file: None,
            entries: unlocated,
        });
    }

    groups
}

/// Create a GitHub link for a file and optionally a specific line.
///
/// # Arguments
///
/// * `base_url` - Repository browse URL, e.g. `https://github.com/user/repo/blob/main`
/// * `file_path` - Path of the file inside the repository
/// * `line` - Line to anchor to
pub fn github_link(base_url: &str, file_path: &str, line: Option<u32>) -> String {
    let mut link = format!("{}/{}", base_url.trim_end_matches('/'), file_path);
    if let Some(line) = line {
        link.push_str(&format!("#L{}", line));
    }
    link
}

#[derive(Serialize)]
struct ReportView<'a> {
    title: String,
    source: String,
    timestamp: String,
    file_count: usize,
    error_count: usize,
    entry_count: usize,
    filters: Vec<String>,
    /// A file pattern picks whole findings, so other locations still show
    file_pattern_note: bool,
    groups: Vec<GroupView<'a>>,
}

#[derive(Serialize)]
struct GroupView<'a> {
    file: &'a str,
    link: Option<String>,
    count: usize,
    entries: Vec<EntryView<'a>>,
}

#[derive(Serialize)]
struct EntryView<'a> {
    id: &'a str,
    severity: &'a str,
    severity_label: String,
    color: &'static str,
    message: &'a str,
    verbose: Option<&'a str>,
    has_location: bool,
    line: u32,
    column: u32,
    info: Option<&'a str>,
    link: Option<String>,
}

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{title}}</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 20px; color: #333; }
        .summary { background-color: #f0f0f0; padding: 15px; margin-bottom: 20px; border-radius: 5px; }
        .timestamp { color: #7f8c8d; font-size: 0.9em; }
        .file-section { margin-bottom: 20px; border: 1px solid #ddd; border-radius: 5px; }
        .file-header { background-color: #f5f5f5; padding: 10px; font-weight: bold; font-size: 18px; cursor: pointer; }
        .file-header a { color: inherit; }
        .error { margin: 10px; padding: 10px; border-left: 4px solid #888888; background-color: #fafafa; }
        .error-header { font-weight: bold; margin-bottom: 5px; }
        .severity { text-transform: uppercase; margin-right: 8px; }
        .error-id { color: #666; font-size: 12px; }
        .error-msg { margin: 5px 0; }
        .error-verbose { color: #666; font-size: 14px; margin: 5px 0; }
        .error-location { color: #888; font-size: 12px; }
        .error-info { color: #666; font-style: italic; }
        .note { color: #666; font-size: 0.9em; }
        a { color: #0366d6; text-decoration: none; }
        a:hover { text-decoration: underline; }
    </style>
</head>
<body>
    <h1>{{title}}</h1>
    <div class="summary">
        <h2>Summary</h2>
        <p class="timestamp">Generated on: {{timestamp}}</p>
        <p><strong>Source:</strong> {{source}}</p>
        <p><strong>Files with errors:</strong> {{file_count}}</p>
        <p><strong>Total errors:</strong> {{error_count}}</p>
        <p><strong>Locations listed:</strong> {{entry_count}}</p>
        {{#if filters}}
        {{#each filters}}
        <p><strong>Filter:</strong> {{this}}</p>
        {{/each}}
        {{else}}
        <p><strong>Filter:</strong> none</p>
        {{/if}}
        {{#if file_pattern_note}}
        <p class="note">The file pattern selects findings; a selected finding is listed under all of its locations.</p>
        {{/if}}
    </div>
    {{#each groups}}
    <details class="file-section" open>
        <summary class="file-header">{{#if link}}<a href="{{link}}" target="_blank">{{file}}</a>{{else}}{{file}}{{/if}} ({{count}} errors)</summary>
        {{#each entries}}
        <div class="error {{severity}}" style="border-left-color: {{color}}">
            <div class="error-header">
                <span class="severity" style="color: {{color}}">{{severity_label}}</span>
                <span class="error-id">{{id}}</span>
            </div>
            <div class="error-msg">{{message}}</div>
            {{#if verbose}}
            <div class="error-verbose">{{verbose}}</div>
            {{/if}}
            {{#if has_location}}
            <div class="error-location">{{#if link}}<a href="{{link}}" target="_blank">Line {{line}}</a>{{else}}Line {{line}}{{/if}}, Column {{column}}</div>
            {{/if}}
            {{#if info}}
            <div class="error-info">{{info}}</div>
            {{/if}}
        </div>
        {{/each}}
    </details>
    {{/each}}
</body>
</html>
"#;

fn entry_view<'a>(
    record: &'a DefectRecord,
    location: Option<&'a Location>,
    github_url: Option<&str>,
) -> EntryView<'a> {
    let verbose = Some(record.verbose_message.as_str())
        .filter(|verbose| !verbose.is_empty() && *verbose != record.message);

    EntryView {
        id: &record.id,
        severity: record.severity.as_str(),
        severity_label: record.severity.as_str().to_uppercase(),
        color: record.severity.color(),
        message: &record.message,
        verbose,
        has_location: location.is_some(),
        line: location.map(|l| l.line).unwrap_or(0),
        column: location.map(|l| l.column).unwrap_or(0),
        info: location.and_then(|l| l.info.as_deref()),
        link: match (github_url, location) {
            (Some(base), Some(l)) => Some(github_link(base, &l.file, Some(l.line))),
            _ => None,
        },
    }
}

/// Render the filtered findings as a self-contained HTML document.
///
/// # Arguments
///
/// * `records` - All records of the report, in document order
/// * `criteria` - Filters selecting which records are shown
/// * `source` - Path of the input report, shown in the summary
/// * `github_url` - Optional repository URL used to link files and lines
///
/// # Returns
///
/// The HTML document
pub fn render_html_report(
    records: &[DefectRecord],
    criteria: &FilterCriteria,
    source: &Path,
    github_url: Option<&str>,
) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars
        .register_template_string("report", HTML_TEMPLATE)
        .map_err(|e| ReportError::render("HTML template", e))?;

    let matched = criteria.apply(records);
    let groups = group_by_file(&matched);

    let file_count = groups.iter().filter(|group| group.file.is_some()).count();
    let entry_count = groups.iter().map(|group| group.entries.len()).sum();

    let group_views = groups
        .iter()
        .map(|group| GroupView {
            file: group.file.unwrap_or(UNKNOWN_FILE),
            link: match (github_url, group.file) {
                (Some(base), Some(file)) => Some(github_link(base, file, None)),
                _ => None,
            },
            count: group.entries.len(),
            entries: group
                .entries
                .iter()
                .map(|(record, location)| entry_view(record, *location, github_url))
                .collect(),
        })
        .collect();

    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();

    let view = ReportView {
        title: format!("Cppcheck Report - {}", stem),
        source: source.display().to_string(),
        timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        file_count,
        error_count: matched.len(),
        entry_count,
        filters: criteria.describe(),
        file_pattern_note: criteria.file_glob.is_some(),
        groups: group_views,
    };

    handlebars
        .render("report", &view)
        .map_err(|e| ReportError::render("HTML report", e))
}

/// Render and write `<stem>_report.html` into `output_dir`.
///
/// # Returns
///
/// The path that was written
pub fn write_html_report(
    records: &[DefectRecord],
    criteria: &FilterCriteria,
    source: &Path,
    github_url: Option<&str>,
    output_dir: &Path,
    stem: &str,
) -> Result<PathBuf> {
    let html = render_html_report(records, criteria, source, github_url)?;
    let path = output_path(output_dir, stem, HTML_REPORT_SUFFIX);

    write_atomically(&path, html.as_bytes())?;

    info!("Wrote HTML report to {}", path.display());
    Ok(path)
}

fn severity_lines(by_severity: &Tally) -> String {
    by_severity
        .sorted_by_key()
        .into_iter()
        .map(|(severity, count)| format!("  {}: {} occurrences\n", severity.cyan(), count))
        .collect()
}

/// Create the console summary printed after a run
pub fn create_summary(aggregates: &Aggregates) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{}\n", "Summary:".yellow().bold()));
    output.push_str(&format!(
        "  {} {}\n",
        "Total unique error IDs:".green(),
        aggregates.by_id.len()
    ));
    output.push_str(&format!(
        "  {} {}\n",
        "Total unique severities:".green(),
        aggregates.by_severity.len()
    ));
    output.push_str(&format!(
        "  {} {}\n",
        "Total error occurrences:".green(),
        aggregates.total()
    ));
    output.push_str(&severity_lines(&aggregates.by_severity));

    output
}
