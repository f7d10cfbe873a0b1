//! Incremental full-text search over mutable row/column tables.
//!
//! A [`SearchEngine`] evaluates a set of [`SearchDescriptor`]s over every
//! bound column of a [`RowSource`] once, then keeps the row-ordered
//! results current by replaying queued collection edits instead of
//! rescanning the whole table.
pub mod cli;
pub mod columns;
pub mod config;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod output;
pub mod search;
pub mod source;
pub mod table;

pub use crate::error::{GridfindError, Result};
pub use clap::Parser;
pub use cli::{Cli, OutputFormat};
pub use columns::{BoundColumn, Column, ColumnBinding, ColumnDiagnostic, ColumnSet};
pub use config::{DescriptorDefaults, EngineConfig, MissingAccessorPolicy};
pub use cursor::{CursorPosition, MatchCursor};
pub use engine::{
    CollectionChange, FallbackReason, FlushOutcome, SearchEngine, SearchResult,
};
pub use normalize::{normalize, NormalizeOptions, NormalizedText};
pub use search::{
    CaseSensitivity, ColumnScope, MatchMode, PreparedDescriptor, SearchDescriptor, SearchMatch,
    TermMode,
};
pub use source::{RowLocation, RowSource, SearchRow};
pub use table::{Table, TableRow};
