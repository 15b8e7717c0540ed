/// Defect record types
///
/// Plain value types produced by the report parser. Nothing here is mutated
/// once a report has been read.

use std::fmt;

/// Severity label attached to a cppcheck finding
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Style,
    Performance,
    Portability,
    Information,
    Debug,
    None,
    /// Any label cppcheck may add later; kept verbatim
    Other(String),
}

impl Severity {
    /// Parse a severity attribute value. Never fails: unknown labels become `Other`.
    pub fn parse(value: &str) -> Self {
        match value {
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            "style" => Severity::Style,
            "performance" => Severity::Performance,
            "portability" => Severity::Portability,
            "information" => Severity::Information,
            "debug" => Severity::Debug,
            "none" => Severity::None,
            other => Severity::Other(other.to_string()),
        }
    }

    /// The label as it appears in the XML report
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Style => "style",
            Severity::Performance => "performance",
            Severity::Portability => "portability",
            Severity::Information => "information",
            Severity::Debug => "debug",
            Severity::None => "none",
            Severity::Other(label) => label,
        }
    }

    /// Accent color used for this severity in the HTML report
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Error => "#ff4444",
            Severity::Warning => "#ffaa00",
            Severity::Style => "#4444ff",
            Severity::Performance => "#aa44ff",
            Severity::Portability => "#44aaaa",
            Severity::Information => "#44bb44",
            _ => "#888888",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One source position a finding points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Source file as written by cppcheck (usually relative to the scan root)
    pub file: String,
    pub line: u32,
    pub column: u32,
    /// Optional note attached to this particular location
    pub info: Option<String>,
}

/// A single `<error>` entry of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefectRecord {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    /// Empty when the report carries no `verbose` attribute
    pub verbose_message: String,
    /// Document order; may be empty
    pub locations: Vec<Location>,
}

impl DefectRecord {
    /// True when the record has severity `error`
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
