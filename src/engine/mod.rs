//! Search engine: full scans, the pending-edit queue and incremental flushes
pub mod delta;
pub mod evaluator;
pub mod result;

use crate::columns::{Column, ColumnDiagnostic, ColumnSet, DiagnosticHandler, ScopePlan};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::metrics::Metrics;
use crate::search::{PreparedCache, PreparedDescriptor, SearchDescriptor};
use crate::source::{RowSource, SearchRow};
use log::{debug, info};
use std::sync::Arc;

pub use delta::{AppliedDelta, CollectionChange, DeltaPlan, FallbackReason, PendingEdit};
pub use result::{ResultSet, SearchResult};

/// Returns the host's live column list.
pub type ColumnProvider<R> = Box<dyn Fn() -> Vec<Column<R>>>;

/// What a flush did to the result collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was pending.
    UpToDate,
    /// Pending edits were patched into the existing results.
    Applied { edits: usize, rows_evaluated: usize },
    /// The results were rebuilt by a full scan.
    Rescanned(FallbackReason),
}

/// Incremental search over a row source.
///
/// The engine does not own the rows. The host passes the source to every
/// call that reads rows and reports structural edits through
/// [`notify_collection_change`](Self::notify_collection_change) in the
/// order they happened; edits are queued and replayed on the next flush.
pub struct SearchEngine<R: SearchRow> {
    config: EngineConfig,
    column_provider: ColumnProvider<R>,
    diagnostics: Option<DiagnosticHandler>,
    cache: PreparedCache,
    columns: Option<ColumnSet<R>>,
    applied: Option<Vec<SearchDescriptor>>,
    plan: Option<ScopePlan>,
    results: ResultSet<R::Key>,
    baseline_rows: usize,
    pending: Vec<PendingEdit<R::Key>>,
    metrics: Metrics,
}

impl<R: SearchRow> SearchEngine<R> {
    pub fn new<F>(config: EngineConfig, column_provider: F) -> Result<Self>
    where
        F: Fn() -> Vec<Column<R>> + 'static,
    {
        Ok(Self {
            cache: PreparedCache::new(config.prepared_cache_size),
            config,
            column_provider: Box::new(column_provider),
            diagnostics: None,
            columns: None,
            applied: None,
            plan: None,
            results: ResultSet::default(),
            baseline_rows: 0,
            pending: Vec::new(),
            metrics: Metrics::new()?,
        })
    }

    /// Receive a diagnostic for every column without a text accessor when
    /// the missing-accessor policy is `Notify`.
    pub fn with_diagnostics<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&ColumnDiagnostic) + 'static,
    {
        self.diagnostics = Some(Box::new(handler));
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn results(&self) -> &[SearchResult<R::Key>] {
        self.results.as_slice()
    }

    pub fn applied_descriptors(&self) -> Option<&[SearchDescriptor]> {
        self.applied.as_deref()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Diagnostics from the last column binding.
    pub fn column_diagnostics(&self) -> &[ColumnDiagnostic] {
        self.columns
            .as_ref()
            .map(|c| c.diagnostics())
            .unwrap_or(&[])
    }

    /// Apply a descriptor set and return the up-to-date results.
    ///
    /// Re-applying a structurally equal set flushes pending edits
    /// incrementally; any other set discards cached state and rescans.
    pub fn apply_descriptors<S>(
        &mut self,
        descriptors: Vec<SearchDescriptor>,
        source: &S,
    ) -> Result<&[SearchResult<R::Key>]>
    where
        S: RowSource<Row = R> + ?Sized,
    {
        if self.applied.as_deref() == Some(descriptors.as_slice()) {
            self.refresh(source)?;
            return Ok(self.results.as_slice());
        }

        debug!("Applying {} new descriptor(s)", descriptors.len());
        self.pending.clear();
        self.plan = None;
        self.applied = Some(descriptors);
        self.rescan(source, FallbackReason::DescriptorsChanged)?;
        Ok(self.results.as_slice())
    }

    /// Queue a structural edit of the row collection.
    pub fn notify_collection_change(&mut self, change: CollectionChange) {
        if self.applied.is_none() || self.queue_is_terminal() {
            return;
        }
        if matches!(change, CollectionChange::Reset) {
            self.pending.clear();
            self.pending.push(PendingEdit::Collection(change));
            return;
        }
        self.queue(PendingEdit::Collection(change));
    }

    /// Queue a "row content may have changed" marker. Ignored unless
    /// `track_item_changes` is enabled.
    pub fn notify_item_change(&mut self, key: R::Key) {
        if !self.config.track_item_changes || self.applied.is_none() || self.queue_is_terminal() {
            return;
        }
        self.queue(PendingEdit::ItemChanged(key));
    }

    /// The queue already forces a rescan; later edits add nothing.
    fn queue_is_terminal(&self) -> bool {
        matches!(
            self.pending.last(),
            Some(PendingEdit::Overflow | PendingEdit::Collection(CollectionChange::Reset))
        )
    }

    fn queue(&mut self, edit: PendingEdit<R::Key>) {
        if self.pending.len() >= self.config.max_pending_edits {
            debug!(
                "Pending queue reached {} edits; dropping it for a rescan",
                self.pending.len()
            );
            self.pending.clear();
            self.pending.push(PendingEdit::Overflow);
            return;
        }
        self.pending.push(edit);
    }

    /// Columns or their visibility changed; they are re-read from the
    /// column provider on the next flush.
    pub fn invalidate_columns(&mut self) {
        self.columns = None;
        self.plan = None;
    }

    /// Flush pending edits, incrementally when possible.
    pub fn refresh<S>(&mut self, source: &S) -> Result<FlushOutcome>
    where
        S: RowSource<Row = R> + ?Sized,
    {
        if self.applied.is_none() {
            self.pending.clear();
            return Ok(FlushOutcome::UpToDate);
        }
        if self.columns.is_none() || self.plan.is_none() {
            self.rescan(source, FallbackReason::ColumnsChanged)?;
            return Ok(FlushOutcome::Rescanned(FallbackReason::ColumnsChanged));
        }
        if self.pending.is_empty() {
            return Ok(FlushOutcome::UpToDate);
        }

        match self.apply_pending(source) {
            Ok(outcome) => Ok(outcome),
            Err(reason) => {
                self.metrics.fallbacks.inc();
                self.rescan(source, reason)?;
                Ok(FlushOutcome::Rescanned(reason))
            }
        }
    }

    /// Drain the pending queue into the cached results. On failure
    /// nothing is modified except that the queue is dropped; the caller
    /// must rescan.
    fn apply_pending<S>(&mut self, source: &S) -> std::result::Result<FlushOutcome, FallbackReason>
    where
        S: RowSource<Row = R> + ?Sized,
    {
        let pending = std::mem::take(&mut self.pending);
        let (Some(columns), Some(plan)) = (self.columns.as_ref(), self.plan.as_ref()) else {
            return Err(FallbackReason::NoBaseline);
        };

        let delta = DeltaPlan::validate(&pending, self.baseline_rows, source).inspect_err(|reason| {
            debug!("Incremental flush of {} edit(s) rejected: {reason}", pending.len());
        })?;

        let edits = delta.len();
        let applied = delta.apply(&mut self.results, source, columns, plan);
        let rows_evaluated = applied.rows_evaluated;
        self.baseline_rows = source.row_count();

        self.metrics.incremental_flushes.inc();
        self.metrics.rows_matched.inc_by(rows_evaluated as u64);
        self.metrics
            .results_emitted
            .inc_by(applied.results_emitted as u64);
        debug!(
            "Applied {edits} edit(s) incrementally, re-matched {rows_evaluated} row(s), {} result(s)",
            self.results.len()
        );
        Ok(FlushOutcome::Applied {
            edits,
            rows_evaluated,
        })
    }

    fn rescan<S>(&mut self, source: &S, reason: FallbackReason) -> Result<()>
    where
        S: RowSource<Row = R> + ?Sized,
    {
        self.pending.clear();
        self.results.clear();
        self.baseline_rows = 0;

        if self.columns.is_none() {
            self.plan = None;
            let handler = self
                .diagnostics
                .as_mut()
                .map(|h| h.as_mut() as &mut dyn FnMut(&ColumnDiagnostic));
            let set = ColumnSet::bind(
                (self.column_provider)(),
                self.config.missing_accessor,
                handler,
            )?;
            self.columns = Some(set);
        }
        let Some(columns) = self.columns.as_ref() else {
            return Ok(());
        };

        if self.plan.is_none() {
            let descriptors = self.applied.as_deref().unwrap_or(&[]);
            let prepared: Vec<Arc<PreparedDescriptor>> = descriptors
                .iter()
                .map(|d| self.cache.get_or_prepare(d))
                .collect();
            self.plan = Some(ScopePlan::build(columns, &prepared));
        }
        let Some(plan) = self.plan.as_ref() else {
            return Ok(());
        };

        let (results, evaluated) = evaluator::full_scan(source, columns, plan);
        self.results = results;
        self.baseline_rows = source.row_count();

        self.metrics.full_scans.inc();
        self.metrics.rows_matched.inc_by(evaluated as u64);
        self.metrics.results_emitted.inc_by(self.results.len() as u64);
        info!(
            "Full scan ({reason}): {} row(s), {} column(s), {} result(s)",
            self.baseline_rows,
            columns.len(),
            self.results.len()
        );
        Ok(())
    }
}
