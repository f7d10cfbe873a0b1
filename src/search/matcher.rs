//! Matching of a single cell against a prepared descriptor
use crate::normalize::{is_word_char, normalize, NormalizedText};
use crate::search::descriptor::{MatchMode, TermMode};
use crate::search::query::{CompiledMatcher, PreparedDescriptor, Term};
use serde::Serialize;
use std::ops::Range;

/// A half-open byte span `[start, start + len)` in the original cell text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SearchMatch {
    pub start: usize,
    pub len: usize,
}

impl SearchMatch {
    pub fn new(start: usize, len: usize) -> Self {
        debug_assert!(len > 0, "empty span");
        Self { start, len }
    }

    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self::new(start, end - start)
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.range().contains(&offset)
    }
}

/// Sort spans and fold every overlapping or touching pair together.
pub fn merge_spans(spans: &mut Vec<SearchMatch>) {
    if spans.len() < 2 {
        return;
    }
    spans.sort_unstable_by_key(|m| (m.start, m.end()));

    let mut merged: Vec<SearchMatch> = Vec::with_capacity(spans.len());
    for span in spans.drain(..) {
        match merged.last_mut() {
            Some(last) if span.start <= last.end() => {
                let end = last.end().max(span.end());
                last.len = end - last.start;
            }
            _ => merged.push(span),
        }
    }
    *spans = merged;
}

/// Match one cell's text, returning merged spans in original coordinates.
pub fn match_text(text: &str, prepared: &PreparedDescriptor) -> Vec<SearchMatch> {
    if !prepared.has_query() {
        return if prepared.allow_empty() && !text.is_empty() {
            vec![SearchMatch::new(0, text.len())]
        } else {
            Vec::new()
        };
    }
    if text.is_empty() {
        return Vec::new();
    }

    let normalized = normalize(text, prepared.normalize_options());
    let mut spans = match prepared.matcher() {
        CompiledMatcher::Pattern(regex) => regex
            .find_iter(normalized.as_str())
            .filter(|m| !m.is_empty())
            .map(|m| SearchMatch::from_bounds(m.start(), m.end()))
            .collect(),
        CompiledMatcher::Terms(terms) => match match_terms(normalized.as_str(), terms, prepared) {
            Some(spans) => spans,
            None => return Vec::new(),
        },
        CompiledMatcher::Empty | CompiledMatcher::Invalid(_) => return Vec::new(),
    };

    merge_spans(&mut spans);
    to_original(&normalized, spans)
}

/// Spans for every term, or `None` when an `All` query misses a term.
fn match_terms(
    text: &str,
    terms: &[Term],
    prepared: &PreparedDescriptor,
) -> Option<Vec<SearchMatch>> {
    let mut spans = Vec::new();
    for term in terms {
        let before = spans.len();
        find_term(text, term, prepared.mode(), prepared.whole_word(), &mut spans);
        if spans.len() == before && prepared.term_mode() == TermMode::All {
            return None;
        }
    }
    Some(spans)
}

fn find_term(
    text: &str,
    term: &Term,
    mode: MatchMode,
    whole_word: bool,
    out: &mut Vec<SearchMatch>,
) {
    let len = term.len();
    if len == 0 || len > text.len() {
        return;
    }
    let mut push_if_bounded = |start: usize| {
        if !whole_word || at_word_boundary(text, start, start + len) {
            out.push(SearchMatch::new(start, len));
        }
    };

    match mode {
        MatchMode::Contains => {
            let mut from = 0;
            while from < text.len() {
                let Some(pos) = term.find_in(text, from) else {
                    break;
                };
                push_if_bounded(pos);
                from = pos + len;
            }
        }
        MatchMode::StartsWith => {
            if text.starts_with(term.as_str()) {
                push_if_bounded(0);
            }
        }
        MatchMode::EndsWith => {
            if text.ends_with(term.as_str()) {
                push_if_bounded(text.len() - len);
            }
        }
        MatchMode::Equals => {
            if text == term.as_str() {
                push_if_bounded(0);
            }
        }
        MatchMode::Wildcard | MatchMode::Regex => {}
    }
}

fn at_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

fn to_original(normalized: &NormalizedText<'_>, spans: Vec<SearchMatch>) -> Vec<SearchMatch> {
    if normalized.is_identity() {
        return spans;
    }
    let mut translated: Vec<SearchMatch> = spans
        .into_iter()
        .map(|m| {
            let (start, end) = normalized.to_original(m.start, m.end());
            SearchMatch::from_bounds(start, end)
        })
        .collect();
    // several normalized bytes can share one source character
    merge_spans(&mut translated);
    translated
}
