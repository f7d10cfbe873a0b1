//! Text normalization with a byte map back to the original cell text
use std::borrow::Cow;
use unicode_normalization::char::{decompose_canonical, is_combining_mark};

/// Which normalization stages to run over a piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NormalizeOptions {
    pub collapse_whitespace: bool,
    pub strip_diacritics: bool,
    pub fold_case: bool,
}

impl NormalizeOptions {
    pub fn is_noop(&self) -> bool {
        !self.collapse_whitespace && !self.strip_diacritics && !self.fold_case
    }
}

/// Normalized form of a string plus the offsets needed to report
/// matches in the original text.
///
/// `map[i]` is the byte offset in the original text of the source
/// character that produced normalized byte `i`. When `map` is `None`
/// the two strings share their byte layout and translation is the
/// identity.
#[derive(Debug, Clone)]
pub struct NormalizedText<'a> {
    original: &'a str,
    text: Cow<'a, str>,
    map: Option<Vec<usize>>,
}

impl<'a> NormalizedText<'a> {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn original(&self) -> &'a str {
        self.original
    }

    pub fn map(&self) -> Option<&[usize]> {
        self.map.as_deref()
    }

    pub fn is_identity(&self) -> bool {
        self.map.is_none()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Translate the normalized byte range `[start, end)` into a range of
    /// the original text. `end` must be greater than `start`.
    pub fn to_original(&self, start: usize, end: usize) -> (usize, usize) {
        debug_assert!(end > start);
        match &self.map {
            None => (start, end),
            Some(map) => {
                let last = map[end - 1];
                let last_len = self.original[last..]
                    .chars()
                    .next()
                    .map_or(0, char::len_utf8);
                (map[start], last + last_len)
            }
        }
    }
}

/// Normalize `text` according to `options`.
///
/// ASCII input that needs no whitespace rewriting takes a fast path: it
/// is returned borrowed (or ASCII-lowercased when folding case) and no
/// map is allocated.
pub fn normalize(text: &str, options: NormalizeOptions) -> NormalizedText<'_> {
    if options.is_noop() {
        return NormalizedText {
            original: text,
            text: Cow::Borrowed(text),
            map: None,
        };
    }

    if text.is_ascii() && (!options.collapse_whitespace || has_canonical_whitespace(text)) {
        let text_cow = if options.fold_case && text.bytes().any(|b| b.is_ascii_uppercase()) {
            Cow::Owned(text.to_ascii_lowercase())
        } else {
            Cow::Borrowed(text)
        };
        return NormalizedText {
            original: text,
            text: text_cow,
            map: None,
        };
    }

    let mut out = String::with_capacity(text.len());
    let mut map = Vec::with_capacity(text.len());
    let mut in_whitespace_run = false;

    for (offset, c) in text.char_indices() {
        if options.collapse_whitespace && c.is_whitespace() {
            if !in_whitespace_run {
                out.push(' ');
                map.push(offset);
            }
            in_whitespace_run = true;
            continue;
        }
        in_whitespace_run = false;

        if options.strip_diacritics && !c.is_ascii() {
            decompose_canonical(c, |d| {
                if !is_combining_mark(d) {
                    emit(&mut out, &mut map, d, offset, options.fold_case);
                }
            });
        } else {
            emit(&mut out, &mut map, c, offset, options.fold_case);
        }
    }

    NormalizedText {
        original: text,
        text: Cow::Owned(out),
        map: Some(map),
    }
}

fn emit(out: &mut String, map: &mut Vec<usize>, c: char, offset: usize, fold_case: bool) {
    if fold_case {
        for lower in c.to_lowercase() {
            out.push(lower);
            map.extend(std::iter::repeat(offset).take(lower.len_utf8()));
        }
    } else {
        out.push(c);
        map.extend(std::iter::repeat(offset).take(c.len_utf8()));
    }
}

/// True when every whitespace byte is a lone U+0020.
fn has_canonical_whitespace(text: &str) -> bool {
    let mut prev_space = false;
    for b in text.bytes() {
        if b == b' ' {
            if prev_space {
                return false;
            }
            prev_space = true;
        } else if b.is_ascii_whitespace() || b == 0x0B {
            return false;
        } else {
            prev_space = false;
        }
    }
    true
}

/// Characters that extend a word for whole-word matching.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
