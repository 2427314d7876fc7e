//! Nondeterministic finite automata: construction, ε-closure, and subset construction
//! into a [`crate::dfa::Dfa`] (§3, §4.A, §4.B).
//!
//! Symbol 0 is always ε. States and symbols are dense `usize` ids; there is no notion of
//! a named alphabet or named states — that bookkeeping belongs to whichever caller built
//! the edge list (the regex compiler in [`crate::regex`], or a grammar-aware lexer
//! generator layered on top of this crate).

use std::collections::{HashMap, HashSet};

use crate::dfa::Dfa;
use crate::error::InvalidAutomaton;

/// A nondeterministic finite automaton over dense `usize` states and symbols.
///
/// ```rust
/// use chef::nfa::Nfa;
///
/// // states 0,1,2; symbol 0 is epsilon, symbol 1 is 'a'
/// let nfa = Nfa::new(3, 2, [(0, 1, 0), (1, 2, 1)]).unwrap();
/// assert_eq!(nfa.process(1, 1), &[2]);
/// ```
#[derive(Debug, Clone)]
pub struct Nfa {
    num_states: usize,
    num_symbols: usize,
    transitions: Vec<Vec<Vec<usize>>>,
}

impl Nfa {
    /// Builds an NFA from a state count, a symbol count (symbol 0 is ε), and an edge
    /// list `(from, to, symbol)`. Duplicate edges are silently deduplicated, as the
    /// destination set at each cell is logically a set (§4.A).
    pub fn new(
        num_states: usize,
        num_symbols: usize,
        edges: impl IntoIterator<Item = (usize, usize, usize)>,
    ) -> Result<Self, InvalidAutomaton> {
        let mut transitions = vec![vec![Vec::new(); num_symbols]; num_states];
        for (from, to, symbol) in edges {
            if from >= num_states {
                return Err(InvalidAutomaton::OutOfRangeState(from, num_states));
            }
            if to >= num_states {
                return Err(InvalidAutomaton::OutOfRangeState(to, num_states));
            }
            if symbol >= num_symbols {
                return Err(InvalidAutomaton::OutOfRangeSymbol(symbol, num_symbols));
            }
            let bucket = &mut transitions[from][symbol];
            if !bucket.contains(&to) {
                bucket.push(to);
            }
        }
        Ok(Nfa {
            num_states,
            num_symbols,
            transitions,
        })
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_symbols(&self) -> usize {
        self.num_symbols
    }

    pub fn states(&self) -> impl Iterator<Item = usize> {
        0..self.num_states
    }

    pub fn symbols(&self) -> impl Iterator<Item = usize> {
        0..self.num_symbols
    }

    /// The (possibly empty) set of states reachable from `from` on `on` in one step.
    pub fn process(&self, from: usize, on: usize) -> &[usize] {
        &self.transitions[from][on]
    }

    /// The ε-closure of `states`: every state reachable via zero or more ε (symbol 0)
    /// transitions, including the starting states themselves (§9, "eliminating self").
    pub fn epsilon_closure(&self, states: impl IntoIterator<Item = usize>) -> HashSet<usize> {
        let mut closure = HashSet::new();
        let mut worklist: Vec<usize> = Vec::new();
        for s in states {
            if closure.insert(s) {
                worklist.push(s);
            }
        }
        while let Some(s) = worklist.pop() {
            for &next in self.process(s, 0) {
                if closure.insert(next) {
                    worklist.push(next);
                }
            }
        }
        closure
    }

    /// Converts this NFA to an equivalent minimal-alphabet DFA via subset construction
    /// (§4.B), lifting `categories` (sets of NFA states) to the corresponding sets of
    /// DFA states. The DFA's symbol `s` corresponds to this NFA's symbol `s + 1` (ε is
    /// symbol 0 here and has no counterpart in the DFA).
    pub fn to_dfa(&self, categories: &[HashSet<usize>]) -> (Dfa, Vec<HashSet<usize>>) {
        let num_symbols = self.num_symbols.saturating_sub(1);

        let canonicalize = |set: &HashSet<usize>| -> Vec<usize> {
            let mut v: Vec<usize> = set.iter().copied().collect();
            v.sort_unstable();
            v
        };

        let mut ids: HashMap<Vec<usize>, usize> = HashMap::new();
        let mut multi_states: Vec<Vec<usize>> = Vec::new();

        let initial_closure = self.epsilon_closure([0]);
        let initial_key = canonicalize(&initial_closure);
        ids.insert(initial_key.clone(), 0);
        multi_states.push(initial_key);

        let mut worklist = vec![0usize];
        let mut edges: Vec<(usize, usize, usize)> = Vec::new();

        while let Some(id) = worklist.pop() {
            let current = multi_states[id].clone();
            for symbol in 1..self.num_symbols {
                let mut reachable: HashSet<usize> = HashSet::new();
                for &state in &current {
                    reachable.extend(self.process(state, symbol).iter().copied());
                }
                let closure = self.epsilon_closure(reachable);
                let key = canonicalize(&closure);

                let next_id = match ids.get(&key) {
                    Some(&id) => id,
                    None => {
                        let id = multi_states.len();
                        ids.insert(key.clone(), id);
                        multi_states.push(key);
                        worklist.push(id);
                        id
                    }
                };

                edges.push((id, next_id, symbol - 1));
            }
        }

        let dfa = Dfa::new(multi_states.len(), num_symbols, edges)
            .expect("subset construction always produces a fully covered transition table");

        let lifted = categories
            .iter()
            .map(|category| {
                multi_states
                    .iter()
                    .enumerate()
                    .filter(|(_, ms)| ms.iter().any(|s| category.contains(s)))
                    .map(|(id, _)| id)
                    .collect::<HashSet<usize>>()
            })
            .collect();

        (dfa, lifted)
    }

    /// The product of two NFAs combining per-state-pair reachability, used to build
    /// [`Nfa::intersection`]. Unreachable combinations are pruned by construction since
    /// only explored pairs receive a state id. `None` iff the two NFAs don't share an
    /// alphabet size.
    fn product_construction(
        &self,
        other: &Nfa,
        combine: impl Fn(bool, bool) -> bool,
        self_categories: &[HashSet<usize>],
        other_categories: &[HashSet<usize>],
    ) -> Option<(Nfa, Vec<HashSet<usize>>)> {
        if self.num_symbols != other.num_symbols {
            return None;
        }

        let mut ids: HashMap<(usize, usize), usize> = HashMap::new();
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        let start = (0usize, 0usize);
        ids.insert(start, 0);
        pairs.push(start);

        let mut worklist = vec![0usize];
        let mut edges: Vec<(usize, usize, usize)> = Vec::new();

        while let Some(id) = worklist.pop() {
            let (a, b) = pairs[id];
            for symbol in 0..self.num_symbols {
                for &na in self.process(a, symbol) {
                    for &nb in other.process(b, symbol) {
                        let key = (na, nb);
                        let next_id = *ids.entry(key).or_insert_with(|| {
                            pairs.push(key);
                            worklist.push(pairs.len() - 1);
                            pairs.len() - 1
                        });
                        edges.push((id, next_id, symbol));
                    }
                }
            }
        }

        let nfa = Nfa::new(pairs.len(), self.num_symbols, edges)
            .expect("product construction only emits in-range edges");

        let lifted = (0..self_categories.len().max(other_categories.len()))
            .map(|i| {
                let in_self = self_categories.get(i);
                let in_other = other_categories.get(i);
                pairs
                    .iter()
                    .enumerate()
                    .filter(|(_, &(a, b))| {
                        let a_in = in_self.is_some_and(|c| c.contains(&a));
                        let b_in = in_other.is_some_and(|c| c.contains(&b));
                        combine(a_in, b_in)
                    })
                    .map(|(id, _)| id)
                    .collect()
            })
            .collect();

        Some((nfa, lifted))
    }

    /// The NFA accepting the intersection of languages, category-wise (`a && b`). `None`
    /// iff the two NFAs don't share an alphabet size.
    pub fn intersection(
        &self,
        other: &Nfa,
        self_categories: &[HashSet<usize>],
        other_categories: &[HashSet<usize>],
    ) -> Option<(Nfa, Vec<HashSet<usize>>)> {
        self.product_construction(other, |a, b| a && b, self_categories, other_categories)
    }

    /// The NFA accepting the union of two NFAs' languages: a fresh initial state with
    /// ε-edges into both operands, offset so their state ids don't collide. Returns the
    /// combined NFA plus each operand's states' new ids, so callers can lift their own
    /// category sets. `None` iff the two NFAs don't share an alphabet size.
    pub fn union(&self, other: &Nfa) -> Option<(Nfa, [Vec<usize>; 2])> {
        if self.num_symbols != other.num_symbols {
            return None;
        }
        let offset_a = 1;
        let offset_b = offset_a + self.num_states;
        let num_states = offset_b + other.num_states;

        let mut edges = vec![(0, offset_a, 0), (0, offset_b, 0)];
        for from in 0..self.num_states {
            for symbol in 0..self.num_symbols {
                for &to in self.process(from, symbol) {
                    edges.push((from + offset_a, to + offset_a, symbol));
                }
            }
        }
        for from in 0..other.num_states {
            for symbol in 0..other.num_symbols {
                for &to in other.process(from, symbol) {
                    edges.push((from + offset_b, to + offset_b, symbol));
                }
            }
        }

        let nfa = Nfa::new(num_states, self.num_symbols, edges).expect("union only emits in-range edges");
        let shift_a: Vec<usize> = (0..self.num_states).map(|s| s + offset_a).collect();
        let shift_b: Vec<usize> = (0..other.num_states).map(|s| s + offset_b).collect();
        Some((nfa, [shift_a, shift_b]))
    }

    /// Whether `self` and `other` accept exactly the same language, given each side's
    /// accepting-state set — a paired-evaluator BFS rather than an explicit subset
    /// construction, mirroring [`crate::dfa::Dfa::equivalent_to`].
    pub fn equivalent_to(
        &self,
        self_accept: &HashSet<usize>,
        other: &Nfa,
        other_accept: &HashSet<usize>,
    ) -> bool {
        if self.num_symbols != other.num_symbols {
            return false;
        }

        let canonicalize = |set: &HashSet<usize>| -> Vec<usize> {
            let mut v: Vec<usize> = set.iter().copied().collect();
            v.sort_unstable();
            v
        };

        let a0 = self.epsilon_closure([0]);
        let b0 = other.epsilon_closure([0]);
        let mut visited: HashSet<(Vec<usize>, Vec<usize>)> = HashSet::new();
        let mut worklist = vec![(a0, b0)];

        while let Some((a, b)) = worklist.pop() {
            let a_accept = a.iter().any(|s| self_accept.contains(s));
            let b_accept = b.iter().any(|s| other_accept.contains(s));
            if a_accept != b_accept {
                return false;
            }
            let key = (canonicalize(&a), canonicalize(&b));
            if !visited.insert(key) {
                continue;
            }
            for symbol in 1..self.num_symbols {
                let mut next_a: HashSet<usize> = HashSet::new();
                for &s in &a {
                    next_a.extend(self.process(s, symbol).iter().copied());
                }
                let next_a = self.epsilon_closure(next_a);

                let mut next_b: HashSet<usize> = HashSet::new();
                for &s in &b {
                    next_b.extend(other.process(s, symbol).iter().copied());
                }
                let next_b = other.epsilon_closure(next_b);

                worklist.push((next_a, next_b));
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsilon_closure_includes_self_and_transitive_targets() {
        let nfa = Nfa::new(3, 1, [(0, 1, 0), (1, 2, 0)]).unwrap();
        let closure = nfa.epsilon_closure([0]);
        assert_eq!(closure, HashSet::from([0, 1, 2]));
    }

    #[test]
    fn subset_construction_matches_reference_walk() {
        // a*b, over symbols 1=a, 2=b (0=eps)
        let nfa = Nfa::new(3, 3, [(0, 0, 1), (0, 1, 2), (1, 2, 0)]).unwrap();
        let accepting = HashSet::from([2]);
        let (dfa, lifted) = nfa.to_dfa(&[accepting]);
        assert_eq!(dfa.num_symbols(), 2);
        let mut state = 0;
        for symbol in [0usize, 0, 1] {
            state = dfa.process(state, symbol);
        }
        assert!(lifted[0].contains(&state));
    }

    #[test]
    fn mismatched_alphabets_are_rejected_gracefully() {
        let a = Nfa::new(1, 2, []).unwrap();
        let b = Nfa::new(1, 3, []).unwrap();
        assert!(a.intersection(&b, &[], &[]).is_none());
        assert!(a.union(&b).is_none());
    }
}
