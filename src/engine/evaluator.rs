//! Row evaluation shared by full scans and incremental flushes
use crate::columns::{ColumnSet, ScopePlan};
use crate::engine::result::{ResultSet, SearchResult};
use crate::search::{match_text, merge_spans, SearchMatch};
use crate::source::{RowSource, SearchRow};
use std::ops::Range;

type KeyOf<S> = <<S as RowSource>::Row as SearchRow>::Key;

/// Match one row against every column in the plan, appending one result
/// per matching column in column order.
pub fn evaluate_row<R: SearchRow>(
    row_index: usize,
    row: &R,
    columns: &ColumnSet<R>,
    plan: &ScopePlan,
    out: &mut Vec<SearchResult<R::Key>>,
) {
    let mut key: Option<R::Key> = None;

    for (pos, prepared) in plan.entries() {
        let column = &columns.columns()[*pos];
        let Some(text) = column.extract(row) else {
            continue;
        };

        let mut matches: Vec<SearchMatch> = Vec::new();
        for p in prepared {
            matches.extend(match_text(&text, p));
        }
        if matches.is_empty() {
            continue;
        }
        if prepared.len() > 1 {
            merge_spans(&mut matches);
        }

        let key = key.get_or_insert_with(|| row.row_key()).clone();
        out.push(SearchResult {
            key,
            row: row_index,
            column: column.id.clone(),
            column_index: column.index,
            text: text.into_owned(),
            matches,
        });
    }
}

/// Evaluate the rows in `range`, which must lie inside the source.
pub fn evaluate_range<S>(
    source: &S,
    range: Range<usize>,
    columns: &ColumnSet<S::Row>,
    plan: &ScopePlan,
) -> (Vec<SearchResult<KeyOf<S>>>, usize)
where
    S: RowSource + ?Sized,
{
    let mut out = Vec::new();
    let mut evaluated = 0;
    if plan.is_empty() {
        return (out, evaluated);
    }
    for index in range {
        if let Some(row) = source.row_at(index) {
            evaluate_row(index, row, columns, plan, &mut out);
            evaluated += 1;
        }
    }
    (out, evaluated)
}

/// Evaluate every row of the source in iteration order.
pub fn full_scan<S>(
    source: &S,
    columns: &ColumnSet<S::Row>,
    plan: &ScopePlan,
) -> (ResultSet<KeyOf<S>>, usize)
where
    S: RowSource + ?Sized,
{
    let (results, evaluated) = evaluate_range(source, 0..source.row_count(), columns, plan);
    (ResultSet::from_sorted(results), evaluated)
}
