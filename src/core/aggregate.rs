/// Occurrence counting over parsed defect records

use std::collections::HashMap;

use crate::core::defect::DefectRecord;

/// Occurrence counter that remembers the order keys were first seen
#[derive(Debug, Clone, Default)]
pub struct Tally {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `key`
    pub fn increment(&mut self, key: &str) {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.order.push(key.to_string());
                self.counts.insert(key.to_string(), 1);
            }
        }
    }

    pub fn get(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Entries in first-observed order
    pub fn entries(&self) -> Vec<(&str, usize)> {
        self.order
            .iter()
            .map(|key| (key.as_str(), self.counts[key]))
            .collect()
    }

    /// Entries by ascending count; equal counts keep first-observed order
    pub fn sorted_by_count(&self) -> Vec<(&str, usize)> {
        let mut entries = self.entries();
        entries.sort_by_key(|(_, count)| *count);
        entries
    }

    /// Entries sorted by key name
    pub fn sorted_by_key(&self) -> Vec<(&str, usize)> {
        let mut entries = self.entries();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// The three counts the CSV tables are built from
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    /// Every record, keyed by error id
    pub by_id: Tally,
    /// Every record, keyed by severity name
    pub by_severity: Tally,
    /// Only `error` severity records, keyed by error id
    pub error_only: Tally,
}

impl Aggregates {
    /// Count a record set in one pass. Each record adds exactly one
    /// occurrence to `by_id` and `by_severity`.
    pub fn from_records(records: &[DefectRecord]) -> Self {
        let mut aggregates = Self::default();

        for record in records {
            aggregates.by_id.increment(&record.id);
            aggregates.by_severity.increment(record.severity.as_str());
            if record.is_error() {
                aggregates.error_only.increment(&record.id);
            }
        }

        aggregates
    }

    /// Number of records counted
    pub fn total(&self) -> usize {
        self.by_id.total()
    }
}
