//! "Current match" navigation over a result snapshot
use crate::engine::SearchResult;
use crate::search::SearchMatch;

/// Position of the cursor: a result and a span inside it, plus the cell
/// it pointed at when it got there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub result: usize,
    pub span: usize,
    pub row: usize,
    pub column_index: usize,
}

/// Tracks the current match. The row key of the current cell is kept so
/// the cursor can follow that cell after edits shift row indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCursor<K> {
    position: Option<CursorPosition>,
    key: Option<K>,
}

impl<K> Default for MatchCursor<K> {
    fn default() -> Self {
        Self {
            position: None,
            key: None,
        }
    }
}

impl<K: Clone + PartialEq> MatchCursor<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Option<CursorPosition> {
        self.position
    }

    /// Row key of the current cell.
    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn reset(&mut self) {
        self.position = None;
        self.key = None;
    }

    pub fn current<'a>(
        &self,
        results: &'a [SearchResult<K>],
    ) -> Option<(&'a SearchResult<K>, SearchMatch)> {
        let pos = self.position?;
        let result = results.get(pos.result)?;
        let span = result.matches.get(pos.span)?;
        Some((result, *span))
    }

    /// Step to the next match. At the end the cursor stays put unless
    /// `wrap` is set, in which case it moves to the first match.
    pub fn next(&mut self, results: &[SearchResult<K>], wrap: bool) -> Option<CursorPosition> {
        let next = match self.position {
            None => first(results),
            Some(pos) => {
                let spans = results.get(pos.result).map_or(0, |r| r.matches.len());
                if pos.span + 1 < spans {
                    Some(at(results, pos.result, pos.span + 1))
                } else if pos.result + 1 < results.len() {
                    Some(at(results, pos.result + 1, 0))
                } else if wrap {
                    first(results)
                } else {
                    None
                }
            }
        };
        self.move_to(results, next);
        next
    }

    /// Step to the previous match, wrapping to the last one when `wrap`
    /// is set.
    pub fn previous(&mut self, results: &[SearchResult<K>], wrap: bool) -> Option<CursorPosition> {
        let prev = match self.position {
            None => last(results),
            Some(pos) => {
                if pos.span > 0 && pos.result < results.len() {
                    Some(at(results, pos.result, pos.span - 1))
                } else if pos.result > 0 && pos.result <= results.len() {
                    let idx = pos.result - 1;
                    Some(at(results, idx, results[idx].matches.len().saturating_sub(1)))
                } else if wrap {
                    last(results)
                } else {
                    None
                }
            }
        };
        self.move_to(results, prev);
        prev
    }

    /// Re-anchor the cursor after the results changed. It stays on the
    /// same cell (same row key and column) if that cell still matches,
    /// otherwise it moves to the first match at or after the old row
    /// index, otherwise to the last match.
    pub fn revalidate(&mut self, results: &[SearchResult<K>]) {
        let Some(pos) = self.position else {
            return;
        };
        if results.is_empty() {
            self.reset();
            return;
        }

        let same_cell = self.key.as_ref().and_then(|key| {
            results
                .iter()
                .position(|r| &r.key == key && r.column_index == pos.column_index)
        });
        let next = match same_cell {
            Some(idx) => {
                let span = pos.span.min(results[idx].matches.len().saturating_sub(1));
                Some(at(results, idx, span))
            }
            None => {
                let idx = results
                    .partition_point(|r| (r.row, r.column_index) < (pos.row, pos.column_index));
                if idx == results.len() {
                    last(results)
                } else {
                    Some(at(results, idx, 0))
                }
            }
        };
        self.move_to(results, next);
    }

    fn move_to(&mut self, results: &[SearchResult<K>], next: Option<CursorPosition>) {
        if let Some(pos) = next {
            self.position = Some(pos);
            self.key = Some(results[pos.result].key.clone());
        }
    }
}

fn at<K>(results: &[SearchResult<K>], result: usize, span: usize) -> CursorPosition {
    CursorPosition {
        result,
        span,
        row: results[result].row,
        column_index: results[result].column_index,
    }
}

fn first<K>(results: &[SearchResult<K>]) -> Option<CursorPosition> {
    (!results.is_empty()).then(|| at(results, 0, 0))
}

fn last<K>(results: &[SearchResult<K>]) -> Option<CursorPosition> {
    let idx = results.len().checked_sub(1)?;
    Some(at(results, idx, results[idx].matches.len().saturating_sub(1)))
}
