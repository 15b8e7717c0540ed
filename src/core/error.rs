/// Error types shared by the parser, filters and writers

use std::io;
use std::path::PathBuf;

/// Failure while reading a report, resolving options or writing output
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Input missing or unreadable, or an output path that cannot be written
    #[error("{action} '{}': {source}", path.display())]
    File {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed XML or a document that is not a cppcheck report
    #[error("invalid cppcheck XML at byte {position}: {message}")]
    Parse { position: u64, message: String },

    /// Bad option value (invalid glob, unreadable config file)
    #[error("invalid configuration: {0}")]
    Config(String),

    /// CSV or HTML generation failed before anything was written
    #[error("cannot render {what}: {message}")]
    Render { what: &'static str, message: String },
}

impl ReportError {
    pub(crate) fn file(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        ReportError::File {
            action,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(position: u64, message: impl Into<String>) -> Self {
        ReportError::Parse {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn render(what: &'static str, message: impl ToString) -> Self {
        ReportError::Render {
            what,
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
