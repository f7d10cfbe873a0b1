//! Pending edits and their incremental application to a result set
use crate::columns::{ColumnSet, ScopePlan};
use crate::engine::evaluator::evaluate_range;
use crate::engine::result::ResultSet;
use crate::source::{RowLocation, RowSource, SearchRow};
use log::debug;
use std::fmt;
use std::ops::Range;

/// A structural change to the row collection, in the coordinates the
/// collection had when the change happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionChange {
    Add { start: usize, count: usize },
    Remove { start: usize, count: usize },
    Replace { start: usize, removed: usize, added: usize },
    Move { from: usize, to: usize, count: usize },
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingEdit<K> {
    Collection(CollectionChange),
    ItemChanged(K),
    /// Stands in for a backlog that grew past `max_pending_edits`.
    Overflow,
}

/// Why a flush could not be applied incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    NoBaseline,
    DescriptorsChanged,
    ColumnsChanged,
    Reset,
    Move,
    OutOfRange { start: usize, count: usize, rows: usize },
    RowCountMismatch { expected: usize, actual: usize },
    AmbiguousItem,
    BacklogOverflow,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoBaseline => write!(f, "no baseline result set"),
            FallbackReason::DescriptorsChanged => write!(f, "descriptor set changed"),
            FallbackReason::ColumnsChanged => write!(f, "column layout changed"),
            FallbackReason::Reset => write!(f, "collection reset"),
            FallbackReason::Move => write!(f, "move edits are not tracked"),
            FallbackReason::OutOfRange { start, count, rows } => {
                write!(f, "edit [{start}, {start}+{count}) outside {rows} rows")
            }
            FallbackReason::RowCountMismatch { expected, actual } => {
                write!(f, "edits imply {expected} rows but source has {actual}")
            }
            FallbackReason::AmbiguousItem => write!(f, "changed item occurs more than once"),
            FallbackReason::BacklogOverflow => write!(f, "too many pending edits"),
        }
    }
}

/// An edit that survived validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowEdit {
    Insert { start: usize, count: usize },
    Delete { start: usize, count: usize },
}

/// Work done by [`DeltaPlan::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedDelta {
    pub rows_evaluated: usize,
    pub results_emitted: usize,
}

/// Validated edits, ready to apply without any further failure path.
#[derive(Debug, Default)]
pub struct DeltaPlan {
    ops: Vec<RowEdit>,
    changed_rows: Vec<usize>,
}

impl DeltaPlan {
    /// Check every pending edit against the row count the current results
    /// were computed for and against the live source. Nothing is mutated,
    /// so a rejected queue leaves the results untouched.
    pub fn validate<S>(
        pending: &[PendingEdit<<S::Row as SearchRow>::Key>],
        baseline_rows: usize,
        source: &S,
    ) -> Result<Self, FallbackReason>
    where
        S: RowSource + ?Sized,
    {
        let mut plan = DeltaPlan::default();
        let mut rows = baseline_rows;

        for edit in pending {
            match edit {
                PendingEdit::Collection(change) => {
                    rows = simulate(*change, rows)?;
                    plan.push(*change);
                }
                PendingEdit::ItemChanged(key) => match source.locate(key) {
                    RowLocation::Unique(row) => plan.changed_rows.push(row),
                    RowLocation::Ambiguous => return Err(FallbackReason::AmbiguousItem),
                    RowLocation::Missing => {
                        debug!("Changed item {key:?} is no longer in the source");
                    }
                },
                PendingEdit::Overflow => return Err(FallbackReason::BacklogOverflow),
            }
        }

        let actual = source.row_count();
        if rows != actual {
            return Err(FallbackReason::RowCountMismatch {
                expected: rows,
                actual,
            });
        }
        Ok(plan)
    }

    fn push(&mut self, change: CollectionChange) {
        match change {
            CollectionChange::Add { start, count } => {
                self.ops.push(RowEdit::Insert { start, count });
            }
            CollectionChange::Remove { start, count } => {
                self.ops.push(RowEdit::Delete { start, count });
            }
            CollectionChange::Replace {
                start,
                removed,
                added,
            } => {
                self.ops.push(RowEdit::Delete {
                    start,
                    count: removed,
                });
                self.ops.push(RowEdit::Insert {
                    start,
                    count: added,
                });
            }
            CollectionChange::Move { .. } | CollectionChange::Reset => {}
        }
    }

    pub fn len(&self) -> usize {
        self.ops.len() + self.changed_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Patch `results` in place and re-match only the rows that are new or
    /// changed.
    pub fn apply<S>(
        self,
        results: &mut ResultSet<<S::Row as SearchRow>::Key>,
        source: &S,
        columns: &ColumnSet<S::Row>,
        scope: &ScopePlan,
    ) -> AppliedDelta
    where
        S: RowSource + ?Sized,
    {
        let mut dirty = DirtyRows::default();

        for op in self.ops {
            match op {
                RowEdit::Insert { start, count } => {
                    results.insert_rows(start, count);
                    dirty.insert(start, count);
                }
                RowEdit::Delete { start, count } => {
                    results.remove_rows(start, count);
                    dirty.remove(start, count);
                }
            }
        }
        for row in self.changed_rows {
            dirty.mark(row..row + 1);
        }

        let mut applied = AppliedDelta::default();
        for range in dirty.into_ranges() {
            let (fresh, n) = evaluate_range(source, range.clone(), columns, scope);
            applied.rows_evaluated += n;
            applied.results_emitted += fresh.len();
            results.splice_rows(range.start, range.end, fresh);
        }
        applied
    }
}

fn simulate(change: CollectionChange, rows: usize) -> Result<usize, FallbackReason> {
    let out_of_range = |start, count| FallbackReason::OutOfRange { start, count, rows };
    match change {
        CollectionChange::Add { start, count } => {
            if start > rows {
                return Err(out_of_range(start, count));
            }
            Ok(rows + count)
        }
        CollectionChange::Remove { start, count } => {
            if start.checked_add(count).map_or(true, |end| end > rows) {
                return Err(out_of_range(start, count));
            }
            Ok(rows - count)
        }
        CollectionChange::Replace {
            start,
            removed,
            added,
        } => {
            if start.checked_add(removed).map_or(true, |end| end > rows) {
                return Err(out_of_range(start, removed));
            }
            Ok(rows - removed + added)
        }
        CollectionChange::Move { .. } => Err(FallbackReason::Move),
        CollectionChange::Reset => Err(FallbackReason::Reset),
    }
}

/// Sorted, disjoint row ranges that need re-matching, kept in step with
/// the same structural edits as the result set.
#[derive(Debug, Default, PartialEq, Eq)]
struct DirtyRows {
    ranges: Vec<Range<usize>>,
}

impl DirtyRows {
    fn insert(&mut self, start: usize, count: usize) {
        if count == 0 {
            return;
        }
        let mut out = Vec::with_capacity(self.ranges.len() + 2);
        for r in self.ranges.drain(..) {
            if r.end <= start {
                out.push(r);
            } else if r.start >= start {
                out.push(r.start + count..r.end + count);
            } else {
                out.push(r.start..start);
                out.push(start + count..r.end + count);
            }
        }
        out.push(start..start + count);
        self.ranges = out;
        self.normalize();
    }

    fn remove(&mut self, start: usize, count: usize) {
        if count == 0 {
            return;
        }
        let end = start + count;
        let mut out = Vec::with_capacity(self.ranges.len());
        for r in self.ranges.drain(..) {
            if r.start < start {
                out.push(r.start..r.end.min(start));
            }
            if r.end > end {
                out.push(r.start.max(end) - count..r.end - count);
            }
        }
        self.ranges = out;
        self.normalize();
    }

    fn mark(&mut self, range: Range<usize>) {
        self.ranges.push(range);
        self.normalize();
    }

    fn normalize(&mut self) {
        self.ranges.retain(|r| r.start < r.end);
        self.ranges.sort_unstable_by_key(|r| r.start);
        let mut merged: Vec<Range<usize>> = Vec::with_capacity(self.ranges.len());
        for r in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if r.start <= last.end => last.end = last.end.max(r.end),
                _ => merged.push(r),
            }
        }
        self.ranges = merged;
    }

    fn into_ranges(self) -> Vec<Range<usize>> {
        self.ranges
    }
}
