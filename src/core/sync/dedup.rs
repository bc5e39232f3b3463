//! First-occurrence order number index

use std::collections::HashSet;

/// Tracks which order numbers have been seen during a run
///
/// Blank order numbers are never recorded.
#[derive(Debug, Default)]
pub struct DedupIndex {
    seen: HashSet<String>,
}

impl DedupIndex {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `order_number`
    ///
    /// Returns `true` the first time a non-blank value is observed and
    /// `false` for repeats and blank values.
    pub fn observe(&mut self, order_number: Option<&str>) -> bool {
        match order_number.map(str::trim) {
            Some(number) if !number.is_empty() => self.seen.insert(number.to_string()),
            _ => false,
        }
    }

    /// Number of distinct order numbers seen
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// True if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
