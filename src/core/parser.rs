/// cppcheck XML report parser
///
/// Reads the `--xml` output of cppcheck into [`DefectRecord`]s. Both the
/// version 2 layout (`<results><cppcheck/><errors>...</errors></results>`)
/// and a bare `<errors>` root are accepted. Everything the converter does
/// not use (`<cppcheck>`, `<symbol>`, `cwe`, `hash`, ...) is skipped.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, info};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::defect::{DefectRecord, Location, Severity};
use crate::core::error::{ReportError, Result};

/// Read and parse a cppcheck XML report from disk.
///
/// # Arguments
///
/// * `path` - Path to the XML file
///
/// # Returns
///
/// The `<error>` entries in document order
pub fn parse_report(path: &Path) -> Result<Vec<DefectRecord>> {
    let content = fs::read_to_string(path)
        .map_err(|e| ReportError::file("cannot read input file", path, e))?;

    let records = parse_report_str(&content)?;
    info!("Parsed {} defect records from {}", records.len(), path.display());

    Ok(records)
}

/// Parse a cppcheck XML report held in memory.
///
/// # Arguments
///
/// * `xml` - The full document text
///
/// # Returns
///
/// The `<error>` entries in document order, or a parse error when the
/// document is not well-formed or does not have the expected structure
pub fn parse_report_str(xml: &str) -> Result<Vec<DefectRecord>> {
    let mut reader = Reader::from_str(xml.trim_start_matches('\u{feff}'));
    let mut builder = ReportBuilder::default();

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|e| ReportError::parse(position, e.to_string()))?;

        match event {
            Event::Start(start) => builder.open(&start, position)?,
            Event::Empty(start) => {
                builder.open(&start, position)?;
                builder.close();
            }
            Event::End(_) => builder.close(),
            Event::Text(text) => {
                if builder.stack.is_empty() && !text.iter().all(|b| b.is_ascii_whitespace()) {
                    return Err(ReportError::parse(position, "text outside of the root element"));
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, CDATA
            _ => {}
        }
    }

    let position = reader.buffer_position() as u64;
    builder.finish(position)
}

/// Tracks where the reader is in the element tree while records are built
#[derive(Default)]
struct ReportBuilder {
    /// Names of the currently open elements, outermost first
    stack: Vec<String>,
    root_seen: bool,
    errors_seen: bool,
    /// The `<error>` currently open, collecting its locations
    pending: Option<DefectRecord>,
    records: Vec<DefectRecord>,
}

impl ReportBuilder {
    /// True when the innermost open element is the report's `<errors>` list
    fn at_errors_list(&self) -> bool {
        match self.stack.as_slice() {
            [errors] => errors == "errors",
            [results, errors] => results == "results" && errors == "errors",
            _ => false,
        }
    }

    fn open(&mut self, start: &BytesStart<'_>, position: u64) -> Result<()> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

        if self.stack.is_empty() {
            if self.root_seen {
                return Err(ReportError::parse(position, "more than one root element"));
            }
            self.root_seen = true;
            match name.as_str() {
                "errors" => self.errors_seen = true,
                "results" => {}
                other => {
                    return Err(ReportError::parse(
                        position,
                        format!("unexpected root element <{}>, expected <results> or <errors>", other),
                    ))
                }
            }
        } else if name == "errors" && self.stack.len() == 1 && self.stack[0] == "results" {
            self.errors_seen = true;
        } else if name == "error" && self.pending.is_none() && self.at_errors_list() {
            self.pending = Some(read_error(start, position)?);
        } else if name == "location" && self.stack.last().map(String::as_str) == Some("error") {
            if let Some(record) = self.pending.as_mut() {
                record.locations.push(read_location(start, position)?);
            }
        }

        self.stack.push(name);
        Ok(())
    }

    fn close(&mut self) {
        let closed = self.stack.pop();
        if closed.as_deref() == Some("error") && self.at_errors_list() {
            if let Some(record) = self.pending.take() {
                debug!("Read {} record '{}'", record.severity, record.id);
                self.records.push(record);
            }
        }
    }

    fn finish(self, position: u64) -> Result<Vec<DefectRecord>> {
        if let Some(open) = self.stack.last() {
            return Err(ReportError::parse(position, format!("unclosed element <{}>", open)));
        }
        if !self.root_seen {
            return Err(ReportError::parse(position, "document has no root element"));
        }
        if !self.errors_seen {
            return Err(ReportError::parse(position, "report has no <errors> element"));
        }
        Ok(self.records)
    }
}

/// Collect an element's attributes with XML entities resolved
fn attributes(start: &BytesStart<'_>, position: u64) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ReportError::parse(position, e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ReportError::parse(position, e.to_string()))?;
        map.insert(key, value.into_owned());
    }
    Ok(map)
}

fn required(
    attrs: &mut HashMap<String, String>,
    key: &str,
    element: &str,
    position: u64,
) -> Result<String> {
    attrs.remove(key).ok_or_else(|| {
        ReportError::parse(
            position,
            format!("<{}> is missing required attribute '{}'", element, key),
        )
    })
}

fn number(value: &str, key: &str, position: u64) -> Result<u32> {
    value.trim().parse::<u32>().map_err(|_| {
        ReportError::parse(
            position,
            format!(
                "attribute '{}' of <location> is not a non-negative integer: '{}'",
                key, value
            ),
        )
    })
}

fn read_error(start: &BytesStart<'_>, position: u64) -> Result<DefectRecord> {
    let mut attrs = attributes(start, position)?;

    Ok(DefectRecord {
        id: required(&mut attrs, "id", "error", position)?,
        severity: Severity::parse(&required(&mut attrs, "severity", "error", position)?),
        message: required(&mut attrs, "msg", "error", position)?,
        verbose_message: attrs.remove("verbose").unwrap_or_default(),
        locations: Vec::new(),
    })
}

fn read_location(start: &BytesStart<'_>, position: u64) -> Result<Location> {
    let mut attrs = attributes(start, position)?;

    let file = required(&mut attrs, "file", "location", position)?;
    let line = number(&required(&mut attrs, "line", "location", position)?, "line", position)?;
    // Reports from cppcheck 1.x carry no column
    let column = match attrs.remove("column") {
        Some(value) => number(&value, "column", position)?,
        None => 0,
    };

    Ok(Location {
        file,
        line,
        column,
        info: attrs.remove("info").filter(|info| !info.is_empty()),
    })
}
