//! Search results and the row-ordered result collection
use crate::search::SearchMatch;
use serde::Serialize;

/// All matches of the applied descriptors inside one (row, column) cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult<K> {
    pub key: K,
    pub row: usize,
    pub column: String,
    pub column_index: usize,
    pub text: String,
    pub matches: Vec<SearchMatch>,
}

impl<K> SearchResult<K> {
    pub fn first_match(&self) -> Option<SearchMatch> {
        self.matches.first().copied()
    }

    /// Text covered by match `i`.
    pub fn matched_text(&self, i: usize) -> Option<&str> {
        self.matches.get(i).and_then(|m| self.text.get(m.range()))
    }

    pub fn contains_offset(&self, offset: usize) -> bool {
        self.matches.iter().any(|m| m.contains(offset))
    }

    fn sort_key(&self) -> (usize, usize, usize) {
        (
            self.row,
            self.column_index,
            self.first_match().map_or(0, |m| m.start),
        )
    }
}

/// Row-index ordered results with the structural edits the delta engine
/// needs. Lookups by row are binary searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet<K> {
    items: Vec<SearchResult<K>>,
}

impl<K> Default for ResultSet<K> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<K> ResultSet<K> {
    pub fn from_sorted(items: Vec<SearchResult<K>>) -> Self {
        debug_assert!(items.windows(2).all(|w| w[0].sort_key() <= w[1].sort_key()));
        Self { items }
    }

    pub fn as_slice(&self) -> &[SearchResult<K>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Index of the first result whose row is `>= row`.
    pub fn lower_bound(&self, row: usize) -> usize {
        self.items.partition_point(|r| r.row < row)
    }

    /// Drop the results of rows `[start, start + count)` and close the gap.
    pub fn remove_rows(&mut self, start: usize, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        let lo = self.lower_bound(start);
        let hi = self.lower_bound(start + count);
        self.items.drain(lo..hi);
        for r in &mut self.items[lo..] {
            r.row -= count;
        }
        hi - lo
    }

    /// Open a gap of `count` rows at `start`.
    pub fn insert_rows(&mut self, start: usize, count: usize) {
        if count == 0 {
            return;
        }
        let lo = self.lower_bound(start);
        for r in &mut self.items[lo..] {
            r.row += count;
        }
    }

    /// Replace the results of rows `[start, end)` with `fresh`, which must
    /// be sorted and lie inside the same rows.
    pub fn splice_rows(&mut self, start: usize, end: usize, fresh: Vec<SearchResult<K>>) {
        debug_assert!(fresh.iter().all(|r| r.row >= start && r.row < end));
        let lo = self.lower_bound(start);
        let hi = self.lower_bound(end);
        self.items.splice(lo..hi, fresh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(row: usize) -> SearchResult<usize> {
        SearchResult {
            key: row,
            row,
            column: "c".into(),
            column_index: 0,
            text: "abc".into(),
            matches: vec![SearchMatch::new(1, 1)],
        }
    }

    fn rows(set: &ResultSet<usize>) -> Vec<usize> {
        set.as_slice().iter().map(|r| r.row).collect()
    }

    #[test]
    fn test_remove_rows_shifts_tail() {
        let mut set = ResultSet::from_sorted(vec![result(0), result(2), result(3), result(7)]);
        assert_eq!(set.remove_rows(2, 2), 2);
        assert_eq!(rows(&set), vec![0, 5]);
    }

    #[test]
    fn test_insert_rows_shifts_tail() {
        let mut set = ResultSet::from_sorted(vec![result(0), result(2)]);
        set.insert_rows(1, 3);
        assert_eq!(rows(&set), vec![0, 5]);
        set.insert_rows(0, 1);
        assert_eq!(rows(&set), vec![1, 6]);
    }

    #[test]
    fn test_splice_rows() {
        let mut set = ResultSet::from_sorted(vec![result(0), result(2), result(4)]);
        set.splice_rows(1, 3, vec![result(1)]);
        assert_eq!(rows(&set), vec![0, 1, 4]);
    }

    #[test]
    fn test_matched_text() {
        let r = result(0);
        assert_eq!(r.matched_text(0), Some("b"));
        assert_eq!(r.matched_text(1), None);
        assert!(r.contains_offset(1));
        assert!(!r.contains_offset(2));
    }
}
