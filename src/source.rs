//! Row sources the engine searches
use std::fmt::Debug;
use std::hash::Hash;

/// A row with a stable identity that survives content edits.
pub trait SearchRow {
    type Key: Clone + Eq + Hash + Debug;

    fn row_key(&self) -> Self::Key;
}

impl SearchRow for String {
    type Key = String;

    fn row_key(&self) -> String {
        self.clone()
    }
}

impl<'s> SearchRow for &'s str {
    type Key = &'s str;

    fn row_key(&self) -> &'s str {
        self
    }
}

/// Where a row key currently sits in a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLocation {
    Unique(usize),
    Missing,
    Ambiguous,
}

/// An ordered, indexable view of rows in their current iteration order.
pub trait RowSource {
    type Row: SearchRow;

    fn row_count(&self) -> usize;

    fn row_at(&self, index: usize) -> Option<&Self::Row>;

    /// Current index of the row identified by `key`.
    ///
    /// The default implementation scans every row and reports duplicates
    /// as ambiguous; sources with a key index should override it.
    fn locate(&self, key: &<Self::Row as SearchRow>::Key) -> RowLocation {
        let mut found = None;
        for index in 0..self.row_count() {
            let Some(row) = self.row_at(index) else {
                continue;
            };
            if &row.row_key() == key {
                if found.is_some() {
                    return RowLocation::Ambiguous;
                }
                found = Some(index);
            }
        }
        found.map_or(RowLocation::Missing, RowLocation::Unique)
    }
}

impl<R: SearchRow> RowSource for [R] {
    type Row = R;

    fn row_count(&self) -> usize {
        self.len()
    }

    fn row_at(&self, index: usize) -> Option<&R> {
        self.get(index)
    }
}

impl<R: SearchRow> RowSource for Vec<R> {
    type Row = R;

    fn row_count(&self) -> usize {
        self.len()
    }

    fn row_at(&self, index: usize) -> Option<&R> {
        self.get(index)
    }
}
