//! In-memory record collection for one survey side.
//!
//! Records are append-only. The only other mutation is a confirmed wholesale
//! clear, which cannot be undone.

/// Result of a clear request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// Caller did not confirm; nothing removed.
    NotConfirmed,
    /// Collection was already empty.
    AlreadyEmpty,
    /// Number of records removed.
    Cleared(usize),
}

#[derive(Debug, Clone)]
pub struct RecordStore<T> {
    records: Vec<T>,
}

impl<T> RecordStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    /// Append a finished record and return a reference to it.
    pub fn append(&mut self, record: T) -> &T {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Student ID handed out when the operator leaves it blank.
    #[must_use]
    pub fn next_sequential_id(&self) -> usize {
        self.records.len() + 1
    }

    #[must_use]
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Drop every record. Requires `confirmed`; a no-op on an empty store.
    pub fn clear(&mut self, confirmed: bool) -> ClearOutcome {
        if !confirmed {
            return ClearOutcome::NotConfirmed;
        }
        if self.records.is_empty() {
            return ClearOutcome::AlreadyEmpty;
        }
        let removed = self.records.len();
        self.records.clear();
        ClearOutcome::Cleared(removed)
    }
}

impl<T> Default for RecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "records_test.rs"]
mod tests;
