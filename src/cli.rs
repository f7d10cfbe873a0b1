use crate::config::DescriptorDefaults;
use crate::error::{GridfindError, Result};
use crate::search::{ColumnScope, MatchMode, SearchDescriptor, TermMode};
use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Delimited text file whose first line holds the column names
    pub file: PathBuf,

    #[clap(default_value = "")]
    pub query: String,

    #[clap(long, value_parser)]
    pub mode: Option<MatchMode>,

    /// Require every term of a multi-term query to match
    #[clap(long, value_parser, default_value_t = false)]
    pub all_terms: bool,

    #[clap(long, value_parser)]
    pub scope: Option<ScopeArg>,

    #[clap(long, value_parser, use_value_delimiter = true)]
    pub columns: Option<Vec<String>>,

    /// Columns treated as hidden for `--scope visible`
    #[clap(long, value_parser, use_value_delimiter = true)]
    pub hidden: Option<Vec<String>>,

    #[clap(long, value_parser, default_value_t = false)]
    pub case_sensitive: bool,

    #[clap(long, value_parser, default_value_t = false)]
    pub whole_word: bool,

    #[clap(long, value_parser, default_value_t = false)]
    pub normalize_whitespace: bool,

    #[clap(long, value_parser, default_value_t = false)]
    pub ignore_diacritics: bool,

    #[clap(long, value_parser, default_value_t = false)]
    pub allow_empty: bool,

    #[clap(long, value_parser, default_value = ",")]
    pub delimiter: String,

    #[clap(long, value_parser, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[clap(long, value_parser, default_value_t = false)]
    pub verbose: bool,

    #[clap(long, value_parser)]
    pub log: Option<PathBuf>,

    #[clap(long, value_parser, default_value_t = false)]
    pub metrics: bool,

    #[clap(long, value_parser)]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeArg {
    All,
    Visible,
    Explicit,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl Cli {
    pub fn delimiter_char(&self) -> Result<char> {
        match self.delimiter.as_str() {
            "\\t" | "tab" => Ok('\t'),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(GridfindError::Other(format!(
                        "Delimiter must be a single character, got {other:?}"
                    ))),
                }
            }
        }
    }

    /// Build the descriptor from the flags, filling gaps from `defaults`.
    pub fn descriptor(&self, defaults: &DescriptorDefaults) -> Result<SearchDescriptor> {
        let mut d = defaults.descriptor(self.query.clone());
        if let Some(mode) = self.mode {
            d.mode = mode;
        }
        if self.all_terms {
            d.term_mode = TermMode::All;
        }
        if self.case_sensitive {
            d = d.case_sensitive(true);
        }
        d.whole_word |= self.whole_word;
        d.normalize_whitespace |= self.normalize_whitespace;
        d.ignore_diacritics |= self.ignore_diacritics;
        d.allow_empty |= self.allow_empty;

        d.scope = match (self.scope, &self.columns) {
            (Some(ScopeArg::All), _) => ColumnScope::AllColumns,
            (Some(ScopeArg::Visible), _) => ColumnScope::VisibleColumns,
            (Some(ScopeArg::Explicit) | None, Some(columns)) => {
                ColumnScope::ExplicitColumns(columns.clone())
            }
            (Some(ScopeArg::Explicit), None) => {
                return Err(GridfindError::Other(
                    "--scope explicit needs --columns".to_string(),
                ));
            }
            (None, None) => ColumnScope::AllColumns,
        };
        Ok(d)
    }
}
