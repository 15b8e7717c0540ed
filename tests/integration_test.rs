/// Integration tests for the report converter
///
/// These tests run the library and the command line binary against a
/// sample cppcheck report and check the generated files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use cppcheck_report::app::{run_conversion, ConversionOptions};
use cppcheck_report::{parse_report, summarize_report, FilterCriteria, ReportError};

const SAMPLE: &str = "tests/data/sample.xml";

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cppcheck_report"))
}

fn options(output_dir: &Path, csv: bool, html: bool) -> ConversionOptions {
    ConversionOptions {
        input: PathBuf::from(SAMPLE),
        output_dir: output_dir.to_path_buf(),
        csv,
        html,
        criteria: FilterCriteria::default(),
        github_url: None,
    }
}

#[test]
fn test_sample_report_counts() {
    let records = parse_report(Path::new(SAMPLE)).expect("Failed to parse sample report");
    assert_eq!(records.len(), 7);

    let aggregates = summarize_report(SAMPLE).expect("Failed to summarize sample report");
    assert_eq!(aggregates.total(), 7);
    assert_eq!(aggregates.by_id.total(), aggregates.by_severity.total());
    assert_eq!(aggregates.by_id.get("nullPointer"), 2);
    assert_eq!(aggregates.error_only.get("uninitvar"), 1);
}

#[test]
fn test_csv_outputs() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let outcome = run_conversion(&options(temp_dir.path(), true, false)).expect("Conversion failed");

    let csv = outcome.csv.expect("CSV outputs should be written");
    assert!(outcome.html.is_none());
    assert_eq!(csv.all_errors, temp_dir.path().join("sample_all_errors.csv"));

    assert_eq!(
        fs::read_to_string(&csv.all_errors).unwrap(),
        "Count,Error ID\n\
         1,unusedFunction\n\
         1,passedByValue\n\
         1,missingIncludeSystem\n\
         2,nullPointer\n\
         2,uninitvar\n"
    );
    assert_eq!(
        fs::read_to_string(&csv.severities).unwrap(),
        "Count,Severity\n\
         3,error\n\
         1,information\n\
         1,performance\n\
         1,style\n\
         1,warning\n"
    );
    assert_eq!(
        fs::read_to_string(&csv.error_only).unwrap(),
        "Count,Error ID\n1,uninitvar\n2,nullPointer\n"
    );
}

#[test]
fn test_empty_report_writes_header_only_tables() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = temp_dir.path().join("clean.xml");
    fs::write(&input, "<results version=\"2\"><cppcheck version=\"2.13\"/><errors/></results>")
        .expect("Failed to write input");

    let mut opts = options(&temp_dir.path().join("out"), true, false);
    opts.input = input;
    run_conversion(&opts).expect("Conversion failed");

    let out = temp_dir.path().join("out");
    assert_eq!(fs::read_to_string(out.join("clean_all_errors.csv")).unwrap(), "Count,Error ID\n");
    assert_eq!(fs::read_to_string(out.join("clean_severities.csv")).unwrap(), "Count,Severity\n");
    assert_eq!(
        fs::read_to_string(out.join("clean_error_severity_only.csv")).unwrap(),
        "Count,Error ID\n"
    );
}

#[test]
fn test_html_report_with_filters() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut opts = options(temp_dir.path(), false, true);
    opts.criteria =
        FilterCriteria::from_options(Some("error,warning"), None, Some("uninitvar"), Some("*.cpp"))
            .unwrap();
    opts.github_url = Some("https://github.com/example/engine/blob/main/".to_string());

    let outcome = run_conversion(&opts).expect("Conversion failed");
    assert!(outcome.csv.is_none());

    let html_path = outcome.html.expect("HTML report should be written");
    assert_eq!(html_path, temp_dir.path().join("sample_report.html"));
    let html = fs::read_to_string(html_path).unwrap();

    assert!(html.contains("nullPointer"));
    // Excluded id still shows up in the filter description, not as a finding
    assert!(html.contains("Error IDs excluded: uninitvar"));
    assert!(!html.contains("Uninitialized variable"));
    assert!(!html.contains("unusedFunction"));
    assert!(!html.contains("passedByValue"));
    assert!(html.contains("href=\"https://github.com/example/engine/blob/main/src/engine.cpp#L42\""));
    assert!(html.contains("href=\"https://github.com/example/engine/blob/main/src/tree.cpp\""));
    assert!(html.contains("<strong>Files with errors:</strong> 2"));
    assert!(html.contains("<strong>Total errors:</strong> 2"));
    assert!(html.contains("File pattern: *.cpp"));
}

#[test]
fn test_missing_input_is_file_error() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut opts = options(temp_dir.path(), true, false);
    opts.input = temp_dir.path().join("missing.xml");

    let err = run_conversion(&opts).unwrap_err();
    assert!(matches!(err, ReportError::File { .. }));
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_cli_defaults_to_csv() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = binary()
        .arg(SAMPLE)
        .arg("--output-dir")
        .arg(temp_dir.path())
        .output()
        .expect("Failed to run binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total error occurrences:"));
    assert!(temp_dir.path().join("sample_all_errors.csv").is_file());
    assert!(temp_dir.path().join("sample_severities.csv").is_file());
    assert!(temp_dir.path().join("sample_error_severity_only.csv").is_file());
    assert!(!temp_dir.path().join("sample_report.html").exists());
}

#[test]
fn test_cli_both_modes() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let status = binary()
        .args([SAMPLE, "--csv", "--html", "--quiet", "--severity", "error"])
        .arg("--output-dir")
        .arg(temp_dir.path())
        .status()
        .expect("Failed to run binary");

    assert!(status.success());
    assert!(temp_dir.path().join("sample_all_errors.csv").is_file());
    assert!(temp_dir.path().join("sample_report.html").is_file());
}

#[test]
fn test_cli_config_file() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let out = temp_dir.path().join("reports");
    let config = temp_dir.path().join("config.json");
    fs::write(
        &config,
        format!(
            "{{\"html\": true, \"csv\": false, \"severity\": \"style\", \"output_dir\": {:?}}}",
            out.to_string_lossy()
        ),
    )
    .expect("Failed to write config");

    let status = binary()
        .args([SAMPLE, "--quiet", "--config"])
        .arg(&config)
        .status()
        .expect("Failed to run binary");

    assert!(status.success());
    let html = fs::read_to_string(out.join("sample_report.html")).unwrap();
    assert!(html.contains("unusedFunction"));
    assert!(!html.contains("nullPointer"));
    assert!(!out.join("sample_all_errors.csv").exists());
}

#[test]
fn test_cli_reports_failures() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let missing = binary()
        .arg(temp_dir.path().join("nope.xml"))
        .arg("--output-dir")
        .arg(temp_dir.path())
        .output()
        .expect("Failed to run binary");
    assert!(!missing.status.success());
    let stderr = String::from_utf8_lossy(&missing.stderr);
    assert!(stderr.contains("nope.xml"));
    assert_eq!(stderr.matches("cannot read input file").count(), 1);

    let broken = temp_dir.path().join("broken.xml");
    fs::write(&broken, "<results><errors><error id=\"x\"></results>").unwrap();
    let malformed = binary()
        .arg(&broken)
        .arg("--output-dir")
        .arg(temp_dir.path())
        .output()
        .expect("Failed to run binary");
    assert!(!malformed.status.success());
    assert!(String::from_utf8_lossy(&malformed.stderr).contains("invalid cppcheck XML"));
    assert!(!temp_dir.path().join("broken_all_errors.csv").exists());

    let bad_glob = binary()
        .args([SAMPLE, "--html", "--file", "src/[a"])
        .arg("--output-dir")
        .arg(temp_dir.path())
        .output()
        .expect("Failed to run binary");
    assert!(!bad_glob.status.success());
    assert!(String::from_utf8_lossy(&bad_glob.stderr).contains("invalid configuration"));
}

#[test]
fn test_cli_failure_goes_to_log_file() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let log = temp_dir.path().join("run.log");

    let output = binary()
        .arg(temp_dir.path().join("nope.xml"))
        .arg("--output-dir")
        .arg(temp_dir.path())
        .arg("--log-file")
        .arg(&log)
        .output()
        .expect("Failed to run binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("cannot read input file").count(), 1);

    let logged = fs::read_to_string(&log).expect("Failed to read log file");
    assert!(logged.contains("ERROR"));
    assert!(logged.contains("cannot read input file"));
}
