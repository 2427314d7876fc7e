//! Crate-level property tests for the universal invariants of §8: that the three regex
//! engines agree, that minimization preserves language, and that an NFA round-tripped
//! through `to_dfa`/`minimize` still recognizes what it started with.

use crate::regex::Regex;
use proptest::prelude::*;

fn init() {
    let _ = env_logger::try_init();
}

fn small_alphabet() -> impl Strategy<Value = char> {
    prop::sample::select(vec!['a', 'b', 'c'])
}

fn arb_regex() -> impl Strategy<Value = Regex> {
    let leaf = prop_oneof![
        Just(Regex::empty()),
        Just(Regex::epsilon()),
        small_alphabet().prop_map(Regex::literal),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.union(b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.concat(b)),
            inner.prop_map(Regex::star),
        ]
    })
}

fn arb_word() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!['a', 'b', 'c']), 0..6)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    /// §8 invariant 3 (restricted to the two internal engines): the derivative engine
    /// and the NFA-via-subset-construction engine agree on every generated regex/word
    /// pair.
    #[test]
    fn derivative_and_nfa_agree(re in arb_regex(), word in arb_word()) {
        init();
        let by_derivative = re.matches(&word).unwrap();

        let (nfa, accept, symbols) = re.to_nfa().unwrap();
        let mut states = nfa.epsilon_closure([0]);
        let mut stuck = false;
        for c in word.chars() {
            let Some(&symbol) = symbols.get(&c) else {
                stuck = true;
                break;
            };
            let mut next = std::collections::HashSet::new();
            for &s in &states {
                next.extend(nfa.process(s, symbol).iter().copied());
            }
            states = nfa.epsilon_closure(next);
        }
        let by_nfa = !stuck && states.iter().any(|s| accept.contains(s));
        prop_assert_eq!(by_derivative, by_nfa);
    }

    /// §8 invariant 4: round-tripping a regex through NFA compilation, subset
    /// construction, and minimization preserves its language on sampled words.
    #[test]
    fn round_trip_through_min_dfa_preserves_language(re in arb_regex(), word in arb_word()) {
        init();
        let by_derivative = re.matches(&word).unwrap();

        let (nfa, accept, symbols) = re.to_nfa().unwrap();
        let (dfa, categories) = nfa.to_dfa(&[accept]);
        let (min, categories) = dfa.minimize(&categories);

        let mut state = 0;
        let mut stuck = false;
        for c in word.chars() {
            let Some(&symbol) = symbols.get(&c) else {
                stuck = true;
                break;
            };
            state = min.process(state, symbol);
        }
        let by_min_dfa = !stuck && categories[0].contains(&state);
        prop_assert_eq!(by_derivative, by_min_dfa);
    }
}
