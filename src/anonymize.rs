//! Replacement of student names with stable generated IDs.

use std::collections::HashMap;

use crate::records::GradeRecord;

/// Name-to-ID mapping for one run.
///
/// IDs are `STUDENT_001`, `STUDENT_002`, ... in order of first appearance.
#[derive(Debug, Default)]
pub struct Anonymizer {
    mapping: HashMap<String, String>,
}

impl Anonymizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ID for `name`, allocating the next one on first sight.
    pub fn id_for(&mut self, name: &str) -> String {
        let next = self.mapping.len() + 1;
        self.mapping
            .entry(name.to_string())
            .or_insert_with(|| format!("STUDENT_{next:03}"))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

/// Rewrites every record's name to its generated ID.
pub fn anonymize(records: &[GradeRecord]) -> (Vec<GradeRecord>, Anonymizer) {
    let mut anonymizer = Anonymizer::new();
    let records = records
        .iter()
        .map(|r| GradeRecord {
            name: anonymizer.id_for(&r.name),
            ..r.clone()
        })
        .collect();
    (records, anonymizer)
}
