/// File handling utilities
///
/// This module provides helpers for preparing the output directory, naming
/// output files after the input report, and writing them atomically.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use log::debug;
use tempfile::NamedTempFile;

use crate::core::error::{ReportError, Result};

/// Suffix of the CSV file listing every error id
pub const ALL_ERRORS_SUFFIX: &str = "_all_errors.csv";
/// Suffix of the CSV file listing severities
pub const SEVERITIES_SUFFIX: &str = "_severities.csv";
/// Suffix of the CSV file listing ids of `error` severity findings
pub const ERROR_ONLY_SUFFIX: &str = "_error_severity_only.csv";
/// Suffix of the HTML report
pub const HTML_REPORT_SUFFIX: &str = "_report.html";

/// Mode given to every written report; temporary files start out as 0600
#[cfg(unix)]
pub const OUTPUT_MODE: u32 = 0o644;

/// Create the output directory (and parents) if it does not exist yet.
///
/// # Arguments
///
/// * `dir` - Directory that will receive the generated files
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .map_err(|e| ReportError::file("cannot create output directory", dir, e))
}

/// File stem of the input report, used to name every output file
pub fn report_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "cppcheck".to_string())
}

/// Build `<output_dir>/<stem><suffix>`
pub fn output_path(output_dir: &Path, stem: &str, suffix: &str) -> PathBuf {
    output_dir.join(format!("{}{}", stem, suffix))
}

/// Write `contents` to `path` so that the file is either complete or absent.
///
/// The data goes to a temporary file in the same directory first and is then
/// renamed over `path`.
///
/// # Arguments
///
/// * `path` - Final location of the file
/// * `contents` - Bytes to write
pub fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)
        .map_err(|e| ReportError::file("cannot create temporary file in", dir, e))?;
    temp.write_all(contents)
        .and_then(|_| temp.flush())
        .map_err(|e| ReportError::file("cannot write", path, e))?;
    #[cfg(unix)]
    temp.as_file()
        .set_permissions(fs::Permissions::from_mode(OUTPUT_MODE))
        .map_err(|e| ReportError::file("cannot set permissions on", path, e))?;
    temp.persist(path)
        .map_err(|e| ReportError::file("cannot write", path, e.error))?;

    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_names_follow_input_stem() {
        let stem = report_stem(Path::new("reports/cppcheck-2024.xml"));
        assert_eq!(stem, "cppcheck-2024");
        assert_eq!(
            output_path(Path::new("out"), &stem, ALL_ERRORS_SUFFIX),
            PathBuf::from("out/cppcheck-2024_all_errors.csv")
        );
    }

    #[test]
    fn test_write_atomically_replaces_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("table.csv");

        write_atomically(&path, b"first").unwrap();
        write_atomically(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        // Only the final file remains, no stray temporaries
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_written_files_are_world_readable() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("report.html");

        write_atomically(&path, b"<html></html>").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, OUTPUT_MODE);
    }

    #[test]
    fn test_ensure_output_dir_is_idempotent() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let nested = dir.path().join("a").join("b");
        ensure_output_dir(&nested).unwrap();
        ensure_output_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("missing").join("table.csv");
        assert!(matches!(
            write_atomically(&path, b"x"),
            Err(ReportError::File { .. })
        ));
    }
}
