/// Utility modules for the report converter
///
/// This module contains helpers for output files and the CSV/HTML/console
/// formatters.

pub mod file_utils;
pub mod output_formatter;
