// XCompose Table Property Tests
//
// Order, round-trip and traversal properties of compiled tables.

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;
use xcompose_core::{
    dump_to_string, keysym_from_name, BuiltinKeysyms, ComposeState, ComposeTable, Keysym, Rule,
    Status,
};

type Listing = Vec<(Vec<Keysym>, String, Option<Keysym>)>;

fn listing(table: &ComposeTable) -> Listing {
    table
        .iter()
        .map(|e| (e.sequence.to_vec(), e.text.to_string(), e.keysym))
        .collect()
}

// Small alphabet so that sequences share prefixes and collide often
fn keysym_strategy() -> impl Strategy<Value = Keysym> {
    prop::sample::select(vec!["a", "b", "c", "A", "dead_acute", "Multi_key", "U20AC"])
        .prop_map(|name| keysym_from_name(name).unwrap())
}

fn sequence_strategy() -> impl Strategy<Value = Vec<Keysym>> {
    prop::collection::vec(keysym_strategy(), 1..=4)
}

// Characters that need escaping mixed with plain and non-ASCII ones.
// NUL never reaches a table and must not break the round trip either.
fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            'a', 'b', 'f', '7', '"', '\\', '\0', '\u{1}', '\n', '\u{7f}', 'é', '€',
        ]),
        0..5,
    )
    .prop_map(String::from_iter)
}

/// Whether `text` still produces something once NUL bytes are dropped
fn has_text(text: &str) -> bool {
    text.chars().any(|c| c != '\0')
}

fn rule_strategy() -> impl Strategy<Value = Rule> {
    (
        sequence_strategy(),
        text_strategy(),
        prop::option::of(prop::sample::select(vec!["X", "Y", "dollar", "EuroSign"])),
    )
        .prop_map(|(sequence, text, keysym)| {
            let keysym = keysym.map(|name| keysym_from_name(name).unwrap());
            // A result needs a string or a keysym.
            let keysym = if !has_text(&text) && keysym.is_none() {
                keysym_from_name("X")
            } else {
                keysym
            };
            Rule::new(&sequence, text, keysym)
        })
}

fn rules_strategy() -> impl Strategy<Value = Vec<Rule>> {
    prop::collection::vec(rule_strategy(), 0..40)
}

/// Rules whose sequences are distinct and prefix-free, so no two conflict
fn conflict_free_rules_strategy() -> impl Strategy<Value = Vec<Rule>> {
    prop::collection::btree_map(sequence_strategy(), text_strategy(), 0..30).prop_map(
        |map: BTreeMap<Vec<Keysym>, String>| {
            let sequences: Vec<&Vec<Keysym>> = map.keys().collect();
            map.iter()
                .filter(|(seq, _)| {
                    !sequences
                        .iter()
                        .any(|other| other.len() > seq.len() && other.starts_with(seq))
                })
                .map(|(seq, text)| {
                    let keysym = if has_text(text) { None } else { keysym_from_name("Y") };
                    Rule::new(seq, text.clone(), keysym)
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn dump_and_reparse_gives_same_table(rules in rules_strategy()) {
        let table = ComposeTable::from_rules(&rules);
        let dumped = dump_to_string(&table, &BuiltinKeysyms).unwrap();
        let reparsed: ComposeTable = dumped.parse().unwrap();
        prop_assert_eq!(listing(&table), listing(&reparsed));
    }

    #[test]
    fn iter_and_for_each_agree(rules in rules_strategy()) {
        let table = ComposeTable::from_rules(&rules);
        let mut visited = Vec::new();
        table.for_each(|e| visited.push((e.sequence.to_vec(), e.text.to_string(), e.keysym)));
        prop_assert_eq!(listing(&table), visited);
    }

    #[test]
    fn entries_are_sorted_and_unique(rules in rules_strategy()) {
        let table = ComposeTable::from_rules(&rules);
        let sequences: Vec<Vec<Keysym>> = table.iter().map(|e| e.sequence.to_vec()).collect();
        prop_assert!(sequences.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(sequences.len(), table.len());
        // No entry is a prefix of another.
        for (i, a) in sequences.iter().enumerate() {
            for b in &sequences[i + 1..] {
                prop_assert!(!b.starts_with(a));
            }
        }
    }

    #[test]
    fn shuffled_rules_give_same_table(
        (rules, shuffled) in conflict_free_rules_strategy()
            .prop_flat_map(|rules| (Just(rules.clone()), Just(rules).prop_shuffle()))
    ) {
        let table = ComposeTable::from_rules(&rules);
        let other = ComposeTable::from_rules(&shuffled);
        prop_assert_eq!(table.len(), rules.len());
        prop_assert_eq!(listing(&table), listing(&other));
    }

    #[test]
    fn every_entry_composes(rules in rules_strategy()) {
        let table = Arc::new(ComposeTable::from_rules(&rules));
        for entry in table.iter() {
            let mut state = ComposeState::new(Arc::clone(&table));
            let (last, prefix) = entry.sequence.split_last().unwrap();
            for &keysym in prefix {
                state.feed(keysym);
                prop_assert_eq!(state.status(), Status::Composing);
            }
            state.feed(*last);
            prop_assert_eq!(state.status(), Status::Composed);
            prop_assert_eq!(state.utf8(), entry.text);
            prop_assert_eq!(state.keysym(), entry.keysym);
        }
    }

    #[test]
    fn tables_never_hold_nul(rules in rules_strategy()) {
        let table = ComposeTable::from_rules(&rules);
        prop_assert!(table.iter().all(|e| !e.text.contains('\0')));
        let dumped = dump_to_string(&table, &BuiltinKeysyms).unwrap();
        let reparsed: ComposeTable = dumped.parse().unwrap();
        prop_assert!(reparsed.iter().all(|e| !e.text.contains('\0')));
    }

    #[test]
    fn last_rule_wins_for_identical_sequences(
        sequence in sequence_strategy(),
        first in "[a-z]{1,3}",
        second in "[a-z]{1,3}",
    ) {
        let rules = [
            Rule::new(&sequence, first, None),
            Rule::new(&sequence, second.clone(), None),
        ];
        let table = ComposeTable::from_rules(&rules);
        prop_assert_eq!(table.len(), 1);
        prop_assert_eq!(table.lookup(&sequence).map(|e| e.text.to_string()), Some(second));
    }
}
