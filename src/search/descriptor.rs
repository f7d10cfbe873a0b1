//! User-facing search descriptors
use crate::normalize::NormalizeOptions;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the query text is compared against a cell.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    #[default]
    Contains,
    StartsWith,
    EndsWith,
    Equals,
    Wildcard,
    Regex,
}

impl MatchMode {
    /// Modes that compile to a regular expression instead of a term list.
    pub fn is_pattern(&self) -> bool {
        matches!(self, MatchMode::Wildcard | MatchMode::Regex)
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Contains => write!(f, "contains"),
            MatchMode::StartsWith => write!(f, "starts-with"),
            MatchMode::EndsWith => write!(f, "ends-with"),
            MatchMode::Equals => write!(f, "equals"),
            MatchMode::Wildcard => write!(f, "wildcard"),
            MatchMode::Regex => write!(f, "regex"),
        }
    }
}

/// How the terms of a multi-term literal query combine.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermMode {
    #[default]
    Any,
    All,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseSensitivity {
    Sensitive,
    #[default]
    Insensitive,
}

/// Which columns a descriptor searches.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnScope {
    #[default]
    AllColumns,
    VisibleColumns,
    ExplicitColumns(Vec<String>),
}

/// An immutable search request. Equality is structural, so two
/// descriptors built from the same inputs are interchangeable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDescriptor {
    pub query: String,
    pub mode: MatchMode,
    pub term_mode: TermMode,
    pub scope: ColumnScope,
    pub case: CaseSensitivity,
    /// Culture tag carried for descriptor identity; matching uses
    /// culture-invariant Unicode case rules.
    pub culture: Option<String>,
    pub whole_word: bool,
    pub normalize_whitespace: bool,
    pub ignore_diacritics: bool,
    pub allow_empty: bool,
}

impl SearchDescriptor {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn term_mode(mut self, term_mode: TermMode) -> Self {
        self.term_mode = term_mode;
        self
    }

    pub fn scope(mut self, scope: ColumnScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn columns<I, S>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope(ColumnScope::ExplicitColumns(
            columns.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case = if yes {
            CaseSensitivity::Sensitive
        } else {
            CaseSensitivity::Insensitive
        };
        self
    }

    pub fn culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = Some(culture.into());
        self
    }

    pub fn whole_word(mut self, yes: bool) -> Self {
        self.whole_word = yes;
        self
    }

    pub fn normalize_whitespace(mut self, yes: bool) -> Self {
        self.normalize_whitespace = yes;
        self
    }

    pub fn ignore_diacritics(mut self, yes: bool) -> Self {
        self.ignore_diacritics = yes;
        self
    }

    pub fn allow_empty(mut self, yes: bool) -> Self {
        self.allow_empty = yes;
        self
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case == CaseSensitivity::Sensitive
    }

    /// Normalization applied to both the query and each cell.
    ///
    /// Pattern modes leave case to the regex engine.
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            collapse_whitespace: self.normalize_whitespace,
            strip_diacritics: self.ignore_diacritics,
            fold_case: !self.is_case_sensitive() && !self.mode.is_pattern(),
        }
    }
}
