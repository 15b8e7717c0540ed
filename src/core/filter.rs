/// Record filtering for the HTML report
///
/// A [`FilterCriteria`] is a set of optional restrictions; a record is kept
/// when it satisfies every restriction that is set.

use std::collections::BTreeSet;

use glob::Pattern;
use log::warn;

use crate::core::defect::DefectRecord;
use crate::core::error::{ReportError, Result};

/// Restrictions applied to records before they are rendered
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub severities: Option<BTreeSet<String>>,
    pub include_ids: Option<BTreeSet<String>>,
    pub exclude_ids: Option<BTreeSet<String>>,
    /// Matched against each location's file; `*` also crosses `/`
    pub file_glob: Option<Pattern>,
}

/// Collapse runs of `*` into one. `*` already crosses `/` here, and
/// `glob::Pattern` rejects `**` unless it is a whole path component.
fn collapse_stars(pattern: &str) -> String {
    let mut collapsed = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '*' && collapsed.ends_with('*') {
            continue;
        }
        collapsed.push(c);
    }
    collapsed
}

/// Split a comma-separated option value. Blank entries are dropped and a
/// list with nothing left counts as unset.
fn split_list(value: Option<&str>) -> Option<BTreeSet<String>> {
    let items: BTreeSet<String> = value?
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

impl FilterCriteria {
    /// Build criteria from raw option strings.
    ///
    /// # Arguments
    ///
    /// * `severity` - Comma-separated severities to keep
    /// * `error_id` - Comma-separated error ids to keep
    /// * `not_error_id` - Comma-separated error ids to drop
    /// * `file` - Shell-style pattern the location file must match
    ///
    /// # Returns
    ///
    /// The criteria, or a configuration error for an invalid pattern
    pub fn from_options(
        severity: Option<&str>,
        error_id: Option<&str>,
        not_error_id: Option<&str>,
        file: Option<&str>,
    ) -> Result<Self> {
        let file_glob = match file.map(str::trim).filter(|p| !p.is_empty()) {
            Some(pattern) => Some(Pattern::new(&collapse_stars(pattern)).map_err(|e| {
                ReportError::Config(format!("invalid file pattern '{}': {}", pattern, e))
            })?),
            None => None,
        };

        let criteria = Self {
            severities: split_list(severity),
            include_ids: split_list(error_id),
            exclude_ids: split_list(not_error_id),
            file_glob,
        };

        let conflicts = criteria.conflicting_ids();
        if !conflicts.is_empty() {
            warn!(
                "Error IDs both included and excluded, exclusion wins: {}",
                conflicts.join(", ")
            );
        }

        Ok(criteria)
    }

    /// Ids named in both the include and the exclude list
    pub fn conflicting_ids(&self) -> Vec<String> {
        match (&self.include_ids, &self.exclude_ids) {
            (Some(include), Some(exclude)) => include.intersection(exclude).cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// True when no restriction is set
    pub fn is_unrestricted(&self) -> bool {
        self.severities.is_none()
            && self.include_ids.is_none()
            && self.exclude_ids.is_none()
            && self.file_glob.is_none()
    }

    /// Whether `record` passes every restriction that is set
    pub fn matches(&self, record: &DefectRecord) -> bool {
        if let Some(severities) = &self.severities {
            if !severities.contains(record.severity.as_str()) {
                return false;
            }
        }
        if let Some(include) = &self.include_ids {
            if !include.contains(&record.id) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude_ids {
            if exclude.contains(&record.id) {
                return false;
            }
        }
        if let Some(pattern) = &self.file_glob {
            // No locations means nothing can match
            if !record
                .locations
                .iter()
                .any(|location| pattern.matches(&location.file))
            {
                return false;
            }
        }
        true
    }

    /// Keep the records that pass, preserving their order
    pub fn apply<'a>(&self, records: &'a [DefectRecord]) -> Vec<&'a DefectRecord> {
        records.iter().filter(|record| self.matches(record)).collect()
    }

    /// One human-readable line per active restriction
    pub fn describe(&self) -> Vec<String> {
        let join = |set: &BTreeSet<String>| set.iter().cloned().collect::<Vec<_>>().join(", ");
        let mut lines = Vec::new();

        if let Some(severities) = &self.severities {
            lines.push(format!("Severities included: {}", join(severities)));
        }
        if let Some(include) = &self.include_ids {
            lines.push(format!("Error IDs included: {}", join(include)));
        }
        if let Some(exclude) = &self.exclude_ids {
            lines.push(format!("Error IDs excluded: {}", join(exclude)));
        }
        if let Some(pattern) = &self.file_glob {
            lines.push(format!("File pattern: {}", pattern.as_str()));
        }

        lines
    }
}
