use std::collections::HashMap;

/// A change in a source's fetched row count relative to the previous cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCountDrift {
    pub previous: usize,
    pub current: usize,
}

/// Per-source row counts observed on the most recent cycle.
///
/// Owned exclusively by one running loop and created empty at loop start,
/// so the first cycle after a restart never reports drift. The memory is
/// updated unconditionally after every observation: drift is only ever
/// relative to the immediately previous cycle, not an older baseline.
#[derive(Debug, Default)]
pub struct RowCountMemory {
    counts: HashMap<String, usize>,
}

impl RowCountMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `count` for `url` and reports a drift if the count differs
    /// from the previous cycle's. First observations never drift.
    pub fn observe(&mut self, url: &str, count: usize) -> Option<RowCountDrift> {
        let previous = self.counts.insert(url.to_string(), count);
        match previous {
            Some(previous) if previous != count => Some(RowCountDrift {
                previous,
                current: count,
            }),
            _ => None,
        }
    }
}
