//! Compilation of search descriptors into reusable matchers
use crate::normalize::{normalize, NormalizeOptions};
use crate::search::descriptor::{MatchMode, SearchDescriptor, TermMode};
use log::debug;
use memchr::memmem::Finder;
use regex::{Regex, RegexBuilder};
use std::fmt;

/// One literal term of a multi-term query, already normalized.
#[derive(Clone)]
pub struct Term {
    text: String,
    finder: Finder<'static>,
}

impl Term {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            finder: Finder::new(text.as_bytes()).into_owned(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub(crate) fn find_in(&self, haystack: &str, from: usize) -> Option<usize> {
        self.finder
            .find(&haystack.as_bytes()[from..])
            .map(|pos| from + pos)
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Term").field(&self.text).finish()
    }
}

/// The compiled form of a query.
#[derive(Debug, Clone)]
pub enum CompiledMatcher {
    /// No query text; only `allow_empty` decides whether cells match.
    Empty,
    Terms(Vec<Term>),
    Pattern(Regex),
    /// The pattern failed to compile and never matches.
    Invalid(String),
}

/// A descriptor prepared for matching. Immutable once built.
#[derive(Debug, Clone)]
pub struct PreparedDescriptor {
    descriptor: SearchDescriptor,
    normalized_query: String,
    options: NormalizeOptions,
    matcher: CompiledMatcher,
}

impl PreparedDescriptor {
    /// Compile `descriptor`.
    ///
    /// Literal modes split the query on whitespace and test each term on
    /// its own, so `Equals` with "creme brulee" looks for a cell equal to
    /// "creme" or to "brulee", never to the whole phrase. Use `Regex` mode
    /// to match a phrase exactly.
    pub fn prepare(descriptor: &SearchDescriptor) -> Self {
        let options = descriptor.normalize_options();
        let normalized_query = normalize(&descriptor.query, options).as_str().to_string();

        let matcher = if normalized_query.trim().is_empty() {
            CompiledMatcher::Empty
        } else if descriptor.mode.is_pattern() {
            compile_pattern(descriptor, &normalized_query)
        } else {
            CompiledMatcher::Terms(normalized_query.split_whitespace().map(Term::new).collect())
        };

        Self {
            descriptor: descriptor.clone(),
            normalized_query,
            options,
            matcher,
        }
    }

    pub fn descriptor(&self) -> &SearchDescriptor {
        &self.descriptor
    }

    pub fn normalized_query(&self) -> &str {
        &self.normalized_query
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        self.options
    }

    pub fn matcher(&self) -> &CompiledMatcher {
        &self.matcher
    }

    pub fn mode(&self) -> MatchMode {
        self.descriptor.mode
    }

    pub fn term_mode(&self) -> TermMode {
        self.descriptor.term_mode
    }

    pub fn has_query(&self) -> bool {
        !matches!(self.matcher, CompiledMatcher::Empty)
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self.matcher, CompiledMatcher::Invalid(_))
    }

    pub fn compile_error(&self) -> Option<&str> {
        match &self.matcher {
            CompiledMatcher::Invalid(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn whole_word(&self) -> bool {
        self.descriptor.whole_word
    }

    pub fn allow_empty(&self) -> bool {
        self.descriptor.allow_empty
    }
}

/// Translate a wildcard query into regex syntax: `*` matches any run,
/// `?` any single character, everything else is literal.
pub fn wildcard_to_regex(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() * 2);
    let mut buf = [0u8; 4];
    for c in query.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            other => pattern.push_str(&regex::escape(other.encode_utf8(&mut buf))),
        }
    }
    pattern
}

fn compile_pattern(descriptor: &SearchDescriptor, normalized_query: &str) -> CompiledMatcher {
    let mut pattern = match descriptor.mode {
        MatchMode::Wildcard => wildcard_to_regex(normalized_query),
        _ => normalized_query.to_string(),
    };
    if descriptor.whole_word {
        pattern = format!(r"\b(?:{pattern})\b");
    }

    match RegexBuilder::new(&pattern)
        .case_insensitive(!descriptor.is_case_sensitive())
        .build()
    {
        Ok(regex) => CompiledMatcher::Pattern(regex),
        Err(e) => {
            debug!("Query {:?} does not compile: {}", descriptor.query, e);
            CompiledMatcher::Invalid(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_has_no_matcher() {
        let p = PreparedDescriptor::prepare(&SearchDescriptor::new("   "));
        assert!(!p.has_query());
        assert!(p.is_valid());
    }

    #[test]
    fn test_literal_terms_are_split_and_folded() {
        let p = PreparedDescriptor::prepare(&SearchDescriptor::new("Creme  BRULEE"));
        match p.matcher() {
            CompiledMatcher::Terms(terms) => {
                let texts: Vec<_> = terms.iter().map(Term::as_str).collect();
                assert_eq!(texts, vec!["creme", "brulee"]);
            }
            other => panic!("unexpected matcher {other:?}"),
        }
    }

    #[test]
    fn test_wildcard_translation() {
        assert_eq!(wildcard_to_regex("a*b?c"), "a.*b.c");
        assert_eq!(wildcard_to_regex("1+1.0"), r"1\+1\.0");
    }

    #[test]
    fn test_whole_word_wraps_pattern() {
        let d = SearchDescriptor::new("alpha")
            .mode(MatchMode::Wildcard)
            .whole_word(true);
        let p = PreparedDescriptor::prepare(&d);
        match p.matcher() {
            CompiledMatcher::Pattern(re) => {
                assert_eq!(re.as_str(), r"\b(?:alpha)\b");
                assert!(re.is_match("beta alpha"));
                assert!(!re.is_match("alphabet"));
            }
            other => panic!("unexpected matcher {other:?}"),
        }
    }

    #[test]
    fn test_invalid_regex_is_flagged_not_raised() {
        let d = SearchDescriptor::new("[unclosed").mode(MatchMode::Regex);
        let p = PreparedDescriptor::prepare(&d);
        assert!(p.has_query());
        assert!(!p.is_valid());
        assert!(p.compile_error().is_some());
    }

    #[test]
    fn test_regex_case_insensitivity() {
        let d = SearchDescriptor::new("ab+").mode(MatchMode::Regex);
        let p = PreparedDescriptor::prepare(&d);
        match p.matcher() {
            CompiledMatcher::Pattern(re) => assert!(re.is_match("xABBy")),
            other => panic!("unexpected matcher {other:?}"),
        }

        let p = PreparedDescriptor::prepare(&d.case_sensitive(true));
        match p.matcher() {
            CompiledMatcher::Pattern(re) => assert!(!re.is_match("xABBy")),
            other => panic!("unexpected matcher {other:?}"),
        }
    }
}
