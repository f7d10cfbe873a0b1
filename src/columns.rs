//! Columns, text accessors and per-descriptor column scopes
use crate::config::MissingAccessorPolicy;
use crate::error::{GridfindError, Result};
use crate::search::descriptor::ColumnScope;
use crate::search::query::PreparedDescriptor;
use log::{debug, warn};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Extracts the searchable text of one column from a row.
pub type TextAccessor<R> = Arc<dyn for<'a> Fn(&'a R) -> Option<Cow<'a, str>> + Send + Sync>;

/// Host-side description of a column.
pub struct Column<R> {
    pub id: String,
    pub visible: bool,
    pub searchable: bool,
    accessor: Option<TextAccessor<R>>,
}

impl<R> Column<R> {
    pub fn new<F>(id: impl Into<String>, accessor: F) -> Self
    where
        F: for<'a> Fn(&'a R) -> Option<Cow<'a, str>> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            visible: true,
            searchable: true,
            accessor: Some(Arc::new(accessor)),
        }
    }

    /// Column whose text is a borrowed string field of the row.
    pub fn with_str<F>(id: impl Into<String>, field: F) -> Self
    where
        F: for<'a> Fn(&'a R) -> &'a str + Send + Sync + 'static,
    {
        Self::new(id, move |row: &R| Some(Cow::Borrowed(field(row))))
    }

    /// Column with no text accessor; it is never searched.
    pub fn unbound(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            visible: true,
            searchable: true,
            accessor: None,
        }
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn has_accessor(&self) -> bool {
        self.accessor.is_some()
    }
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            visible: self.visible,
            searchable: self.searchable,
            accessor: self.accessor.clone(),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("visible", &self.visible)
            .field("searchable", &self.searchable)
            .field("accessor", &self.accessor.is_some())
            .finish()
    }
}

/// A searchable column bound to its accessor and its position in the
/// live column list.
pub struct BoundColumn<R> {
    pub id: String,
    pub index: usize,
    pub visible: bool,
    accessor: TextAccessor<R>,
}

impl<R> BoundColumn<R> {
    pub fn extract<'a>(&self, row: &'a R) -> Option<Cow<'a, str>> {
        (self.accessor)(row)
    }
}

impl<R> fmt::Debug for BoundColumn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundColumn")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("visible", &self.visible)
            .finish()
    }
}

/// Reported for a searchable column that cannot produce text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDiagnostic {
    pub column: String,
    pub index: usize,
}

impl fmt::Display for ColumnDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column '{}' (#{}) has no text accessor and is excluded from search",
            self.column, self.index
        )
    }
}

pub type DiagnosticHandler = Box<dyn FnMut(&ColumnDiagnostic)>;

/// Outcome of binding one host column.
pub enum ColumnBinding<R> {
    Bound(BoundColumn<R>),
    Missing(ColumnDiagnostic),
}

impl<R> ColumnBinding<R> {
    fn from_column(index: usize, column: Column<R>) -> Self {
        match column.accessor {
            Some(accessor) => ColumnBinding::Bound(BoundColumn {
                id: column.id,
                index,
                visible: column.visible,
                accessor,
            }),
            None => ColumnBinding::Missing(ColumnDiagnostic {
                column: column.id,
                index,
            }),
        }
    }
}

/// The bound, searchable columns for the current column layout.
pub struct ColumnSet<R> {
    columns: Vec<BoundColumn<R>>,
    diagnostics: Vec<ColumnDiagnostic>,
}

impl<R> ColumnSet<R> {
    /// Bind the live column list, applying `policy` to columns that have
    /// no accessor.
    pub fn bind(
        columns: Vec<Column<R>>,
        policy: MissingAccessorPolicy,
        mut handler: Option<&mut dyn FnMut(&ColumnDiagnostic)>,
    ) -> Result<Self> {
        let mut bound = Vec::with_capacity(columns.len());
        let mut diagnostics = Vec::new();

        for (index, column) in columns.into_iter().enumerate() {
            if !column.searchable {
                continue;
            }
            match ColumnBinding::from_column(index, column) {
                ColumnBinding::Bound(b) => bound.push(b),
                ColumnBinding::Missing(diag) => {
                    match policy {
                        MissingAccessorPolicy::Ignore => {
                            debug!("Skipping {diag}");
                        }
                        MissingAccessorPolicy::Notify => {
                            warn!("{diag}");
                            if let Some(h) = handler.as_deref_mut() {
                                h(&diag);
                            }
                        }
                        MissingAccessorPolicy::FailFast => {
                            return Err(GridfindError::MissingAccessor {
                                column: diag.column,
                            });
                        }
                    }
                    diagnostics.push(diag);
                }
            }
        }

        Ok(Self {
            columns: bound,
            diagnostics,
        })
    }

    pub fn columns(&self) -> &[BoundColumn<R>] {
        &self.columns
    }

    pub fn diagnostics(&self) -> &[ColumnDiagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Positions in `columns()` that fall inside `scope`, in column order.
    pub fn resolve_scope(&self, scope: &ColumnScope) -> Vec<usize> {
        match scope {
            ColumnScope::AllColumns => (0..self.columns.len()).collect(),
            ColumnScope::VisibleColumns => self
                .columns
                .iter()
                .enumerate()
                .filter(|(_, c)| c.visible)
                .map(|(pos, _)| pos)
                .collect(),
            ColumnScope::ExplicitColumns(ids) => {
                let mut positions: Vec<usize> = ids
                    .iter()
                    .filter_map(|id| {
                        let pos = self.columns.iter().position(|c| &c.id == id);
                        if pos.is_none() {
                            debug!("Explicit column '{id}' is not searchable here");
                        }
                        pos
                    })
                    .collect();
                positions.sort_unstable();
                positions.dedup();
                positions
            }
        }
    }
}

/// Which prepared descriptors apply to each bound column.
pub struct ScopePlan {
    entries: Vec<(usize, Vec<Arc<PreparedDescriptor>>)>,
}

impl ScopePlan {
    pub fn build<R>(columns: &ColumnSet<R>, prepared: &[Arc<PreparedDescriptor>]) -> Self {
        let mut per_column: Vec<Vec<Arc<PreparedDescriptor>>> = vec![Vec::new(); columns.len()];
        for p in prepared {
            for pos in columns.resolve_scope(&p.descriptor().scope) {
                per_column[pos].push(Arc::clone(p));
            }
        }
        let entries = per_column
            .into_iter()
            .enumerate()
            .filter(|(_, plans)| !plans.is_empty())
            .collect();
        Self { entries }
    }

    /// `(position in ColumnSet, descriptors)` pairs in column order.
    pub fn entries(&self) -> &[(usize, Vec<Arc<PreparedDescriptor>>)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
