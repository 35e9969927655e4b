//! Substring scoring of a single record

use crate::config::SearchSettings;
use crate::table::Record;

/// Lower-case and trim a raw query
pub fn normalize_query(query: &str) -> String {
    query.to_lowercase().trim().to_string()
}

/// Score and deciding field of a matching record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordMatch<'a> {
    pub score: u32,
    pub field: &'a str,
}

/// Scores records against one normalized query.
///
/// Comparison is a plain lower-cased substring test; no accent folding or
/// Unicode normalization is applied.
#[derive(Debug, Clone)]
pub struct Matcher<'q> {
    needle: &'q str,
    exact_weight: u32,
    partial_weight: u32,
}

impl<'q> Matcher<'q> {
    /// `needle` must already be normalized
    pub fn new(needle: &'q str, settings: &SearchSettings) -> Self {
        Self {
            needle,
            exact_weight: settings.exact_match_weight,
            partial_weight: settings.partial_match_weight,
        }
    }

    /// Score `record` over `fields`. Every field containing the query adds
    /// the exact or partial weight; the last such field is reported.
    pub fn score<'f>(&self, record: &Record, fields: &'f [String]) -> Option<RecordMatch<'f>> {
        let mut score = 0;
        let mut matched = None;

        for field in fields {
            let value = record.get(field).to_lowercase();
            if value.contains(self.needle) {
                score += if value == self.needle {
                    self.exact_weight
                } else {
                    self.partial_weight
                };
                matched = Some(field.as_str());
            }
        }

        match matched {
            Some(field) if score > 0 => Some(RecordMatch { score, field }),
            _ => None,
        }
    }
}
