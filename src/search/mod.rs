//! Query preparation and per-cell matching
pub mod cache;
pub mod descriptor;
pub mod matcher;
pub mod query;

pub use cache::{CacheStats, PreparedCache};
pub use descriptor::{CaseSensitivity, ColumnScope, MatchMode, SearchDescriptor, TermMode};
pub use matcher::{match_text, merge_spans, SearchMatch};
pub use query::{wildcard_to_regex, CompiledMatcher, PreparedDescriptor, Term};
