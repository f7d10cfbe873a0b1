//! Property tests: an incremental flush must leave exactly the results a
//! fresh full scan would produce, and every reported span must cover
//! original text that normalizes back to something the query matches.

use gridfind::search::CompiledMatcher;
use gridfind::{
    normalize, CollectionChange, Column, EngineConfig, FlushOutcome, MatchMode,
    PreparedDescriptor, SearchDescriptor, SearchEngine, TermMode,
};
use proptest::prelude::*;

const WORDS: &[&str] = &[
    "alpha", "Beta", "gamma", "Crème", "brûlée", "delta", "ALPHABET", "be ta", "",
];

#[derive(Debug, Clone)]
enum Edit {
    Add(usize, Vec<String>),
    Remove(usize, usize),
    Replace(usize, usize, Vec<String>),
}

fn cell() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 0..4).prop_map(|w| w.join(" "))
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (any::<prop::sample::Index>(), prop::collection::vec(cell(), 1..4))
            .prop_map(|(i, rows)| Edit::Add(i.index(usize::MAX), rows)),
        (any::<prop::sample::Index>(), 1usize..3)
            .prop_map(|(i, n)| Edit::Remove(i.index(usize::MAX), n)),
        (
            any::<prop::sample::Index>(),
            0usize..3,
            prop::collection::vec(cell(), 0..3)
        )
            .prop_map(|(i, n, rows)| Edit::Replace(i.index(usize::MAX), n, rows)),
    ]
}

fn descriptor() -> impl Strategy<Value = SearchDescriptor> {
    (
        prop::sample::select(vec![
            "al", "beta", "creme", "a*", "be ta", "ta al", "b?ta", "(al|ga)m*", "e[a-z]",
        ]),
        prop::sample::select(vec![
            MatchMode::Contains,
            MatchMode::StartsWith,
            MatchMode::EndsWith,
            MatchMode::Equals,
            MatchMode::Wildcard,
            MatchMode::Regex,
        ]),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(query, mode, all, word, fold)| {
            SearchDescriptor::new(query)
                .mode(mode)
                .term_mode(if all { TermMode::All } else { TermMode::Any })
                .whole_word(word)
                .ignore_diacritics(fold)
                .normalize_whitespace(fold)
        })
}

/// Apply `edit` to `rows`, clamped to the current length, and return the
/// notification describing it.
fn perform(rows: &mut Vec<String>, edit: &Edit) -> Option<CollectionChange> {
    match edit {
        Edit::Add(i, new) => {
            let start = i % (rows.len() + 1);
            rows.splice(start..start, new.iter().cloned());
            Some(CollectionChange::Add {
                start,
                count: new.len(),
            })
        }
        Edit::Remove(i, n) => {
            if rows.is_empty() {
                return None;
            }
            let start = i % rows.len();
            let count = (*n).min(rows.len() - start);
            rows.drain(start..start + count);
            Some(CollectionChange::Remove { start, count })
        }
        Edit::Replace(i, n, new) => {
            let start = i % (rows.len() + 1);
            let removed = (*n).min(rows.len() - start);
            rows.splice(start..start + removed, new.iter().cloned());
            Some(CollectionChange::Replace {
                start,
                removed,
                added: new.len(),
            })
        }
    }
}

fn engine() -> SearchEngine<String> {
    SearchEngine::new(EngineConfig::default(), || {
        vec![Column::with_str("value", |s: &String| s.as_str())]
    })
    .unwrap()
}

proptest! {
    #[test]
    fn incremental_flush_matches_full_scan(
        initial in prop::collection::vec(cell(), 0..12),
        edits in prop::collection::vec(edit(), 1..8),
        descriptors in prop::collection::vec(descriptor(), 1..3),
    ) {
        let mut rows = initial;
        let mut live = engine();
        live.apply_descriptors(descriptors.clone(), &rows).unwrap();

        for e in &edits {
            if let Some(change) = perform(&mut rows, e) {
                live.notify_collection_change(change);
            }
        }
        let outcome = live.refresh(&rows).unwrap();
        prop_assert!(
            !matches!(outcome, FlushOutcome::Rescanned(_)),
            "unexpected fallback: {:?}",
            outcome
        );

        let mut fresh = engine();
        let expected = fresh.apply_descriptors(descriptors, &rows).unwrap().to_vec();
        prop_assert_eq!(live.results(), expected.as_slice());
    }

    #[test]
    fn span_text_normalizes_back_to_a_match(
        rows in prop::collection::vec(cell(), 1..8),
        d in descriptor(),
    ) {
        // whole-word boundaries depend on text outside the span
        let unbounded = PreparedDescriptor::prepare(&d.clone().whole_word(false));
        let mut e = engine();
        for r in e.apply_descriptors(vec![d], &rows).unwrap() {
            for m in &r.matches {
                let piece = normalize(&r.text[m.range()], unbounded.normalize_options());
                let piece = piece.as_str();
                prop_assert!(!piece.is_empty());
                match unbounded.matcher() {
                    CompiledMatcher::Terms(terms) => prop_assert!(
                        terms.iter().any(|t| piece.contains(t.as_str())),
                        "{:?} holds no term of {:?}",
                        piece,
                        terms
                    ),
                    CompiledMatcher::Pattern(regex) => prop_assert!(
                        regex.is_match(piece),
                        "{:?} does not match {}",
                        piece,
                        regex
                    ),
                    other => prop_assert!(false, "unexpected match from {:?}", other),
                }
            }
        }
    }

    #[test]
    fn spans_are_sorted_and_on_char_boundaries(
        rows in prop::collection::vec(cell(), 1..8),
        d in descriptor(),
    ) {
        let mut e = engine();
        for r in e.apply_descriptors(vec![d], &rows).unwrap() {
            prop_assert!(!r.matches.is_empty());
            for pair in r.matches.windows(2) {
                prop_assert!(pair[0].end() < pair[1].start);
            }
            for m in &r.matches {
                prop_assert!(m.len > 0);
                prop_assert!(r.text.is_char_boundary(m.start));
                prop_assert!(r.text.is_char_boundary(m.end()));
            }
        }
    }
}
