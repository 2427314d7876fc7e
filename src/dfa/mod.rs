//! Deterministic finite automata: construction, minimization, and the product
//! constructions backing boolean combinations of recognized languages (§3, §4.A, §4.C,
//! §4.K).

use std::collections::{HashMap, HashSet};

use crate::error::InvalidAutomaton;
use crate::nfa::Nfa;

/// A deterministic finite automaton: a dense `num_states x num_symbols` transition
/// table. Every cell is defined — that totality is checked at construction time.
///
/// ```rust
/// use chef::dfa::Dfa;
///
/// // accepts strings over {0} of even length
/// let dfa = Dfa::new(2, 1, [(0, 1, 0), (1, 0, 0)]).unwrap();
/// assert_eq!(dfa.process(0, 0), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Dfa {
    num_states: usize,
    num_symbols: usize,
    transitions: Vec<usize>,
}

impl Dfa {
    /// Builds a DFA from a state count, a symbol count, and an edge list
    /// `(from, to, symbol)` that must cover every `(state, symbol)` cell exactly once.
    pub fn new(
        num_states: usize,
        num_symbols: usize,
        edges: impl IntoIterator<Item = (usize, usize, usize)>,
    ) -> Result<Self, InvalidAutomaton> {
        let mut transitions: Vec<Option<usize>> = vec![None; num_states * num_symbols];
        let mut count = 0;
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
            let cell = &mut transitions[from * num_symbols + symbol];
            if cell.is_some() {
                return Err(InvalidAutomaton::DuplicateTransition {
                    state: from,
                    symbol,
                });
            }
            *cell = Some(to);
            count += 1;
        }
        if count != num_states * num_symbols {
            return Err(InvalidAutomaton::IncompleteTransitionTable {
                expected: num_states * num_symbols,
                got: count,
            });
        }
        Ok(Dfa {
            num_states,
            num_symbols,
            transitions: transitions.into_iter().map(|c| c.unwrap()).collect(),
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

    /// The (unique) destination state from `from` on `on`.
    pub fn process(&self, from: usize, on: usize) -> usize {
        self.transitions[from * self.num_symbols + on]
    }

    /// Runs the whole `symbols` sequence from the initial state 0, returning the final
    /// state.
    pub fn run(&self, symbols: impl IntoIterator<Item = usize>) -> usize {
        symbols.into_iter().fold(0, |state, symbol| self.process(state, symbol))
    }

    /// Converts this DFA to an NFA with no ε-transitions (symbol 0 is ε and carries no
    /// edges; DFA symbol `s` becomes NFA symbol `s + 1`).
    pub fn to_nfa(&self) -> Nfa {
        let edges = (0..self.num_states).flat_map(|state| {
            (0..self.num_symbols).map(move |symbol| (state, self.process(state, symbol), symbol + 1))
        });
        Nfa::new(self.num_states, self.num_symbols + 1, edges)
            .expect("a DFA's own transition table is always in range")
    }

    /// Minimizes this DFA via Hopcroft partition refinement, preserving every category
    /// in `categories` (§4.C). Returns the minimized DFA and the categories lifted to
    /// the new state ids. State 0 of the result is always the block containing the
    /// original state 0.
    pub fn minimize(&self, categories: &[HashSet<usize>]) -> (Dfa, Vec<HashSet<usize>>) {
        let signature = |state: usize| -> Vec<bool> {
            categories.iter().map(|c| c.contains(&state)).collect()
        };

        let mut by_signature: HashMap<Vec<bool>, HashSet<usize>> = HashMap::new();
        for state in self.states() {
            by_signature.entry(signature(state)).or_default().insert(state);
        }

        let mut partition: Vec<HashSet<usize>> = by_signature.into_values().collect();
        let mut worklist: Vec<HashSet<usize>> = partition.clone();

        while let Some(a) = worklist.pop() {
            log::trace!("hopcroft: splitting on block of size {}, {} blocks remain queued", a.len(), worklist.len());
            for symbol in self.symbols() {
                let x: HashSet<usize> = self
                    .states()
                    .filter(|&q| a.contains(&self.process(q, symbol)))
                    .collect();
                if x.is_empty() {
                    continue;
                }

                let mut next_partition = Vec::with_capacity(partition.len());
                for y in partition.drain(..) {
                    let intersection: HashSet<usize> = y.intersection(&x).copied().collect();
                    let difference: HashSet<usize> = y.difference(&x).copied().collect();
                    if !intersection.is_empty() && !difference.is_empty() {
                        if let Some(pos) = worklist.iter().position(|w| *w == y) {
                            worklist.remove(pos);
                            worklist.push(intersection.clone());
                            worklist.push(difference.clone());
                        } else if intersection.len() <= difference.len() {
                            worklist.push(intersection.clone());
                        } else {
                            worklist.push(difference.clone());
                        }
                        next_partition.push(intersection);
                        next_partition.push(difference);
                    } else {
                        next_partition.push(y);
                    }
                }
                partition = next_partition;
            }
        }

        // Place the block containing state 0 first, so the minimized start state is 0.
        let start_idx = partition
            .iter()
            .position(|block| block.contains(&0))
            .expect("every state belongs to exactly one block, including state 0");
        partition.swap(0, start_idx);

        let mut old_to_new: HashMap<usize, usize> = HashMap::new();
        for (new_id, block) in partition.iter().enumerate() {
            for &old in block {
                old_to_new.insert(old, new_id);
            }
        }

        let edges = partition.iter().enumerate().flat_map(|(new_id, block)| {
            let representative = *block.iter().next().expect("blocks are never empty");
            self.symbols().map(move |symbol| {
                let target = old_to_new[&self.process(representative, symbol)];
                (new_id, target, symbol)
            })
        });

        let minimized = Dfa::new(partition.len(), self.num_symbols, edges)
            .expect("every block has a representative covering every symbol");

        let lifted = categories
            .iter()
            .map(|category| category.iter().map(|&s| old_to_new[&s]).collect())
            .collect();

        (minimized, lifted)
    }

    /// Builds the product DFA of `self` and `other`, combining acceptance per-category
    /// with `combine`. `None` if the two DFAs don't share an alphabet size.
    pub fn product_construction(
        &self,
        other: &Dfa,
        combine: impl Fn(bool, bool) -> bool,
        self_categories: &[HashSet<usize>],
        other_categories: &[HashSet<usize>],
    ) -> Option<(Dfa, Vec<HashSet<usize>>)> {
        if self.num_symbols != other.num_symbols {
            return None;
        }

        let mut ids: HashMap<(usize, usize), usize> = HashMap::new();
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        ids.insert((0, 0), 0);
        pairs.push((0, 0));

        let mut worklist = vec![0usize];
        let mut edges: Vec<(usize, usize, usize)> = Vec::new();

        while let Some(id) = worklist.pop() {
            let (a, b) = pairs[id];
            for symbol in self.symbols() {
                let (na, nb) = (self.process(a, symbol), other.process(b, symbol));
                let key = (na, nb);
                let next_id = *ids.entry(key).or_insert_with(|| {
                    pairs.push(key);
                    worklist.push(pairs.len() - 1);
                    pairs.len() - 1
                });
                edges.push((id, next_id, symbol));
            }
        }

        let product = Dfa::new(pairs.len(), self.num_symbols, edges)
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

        Some((product, lifted))
    }

    pub fn union(
        &self,
        other: &Dfa,
        self_accept: &HashSet<usize>,
        other_accept: &HashSet<usize>,
    ) -> Option<(Dfa, HashSet<usize>)> {
        self.product_construction(other, |a, b| a || b, &[self_accept.clone()], &[other_accept.clone()])
            .map(|(dfa, mut cats)| (dfa, cats.remove(0)))
    }

    pub fn intersection(
        &self,
        other: &Dfa,
        self_accept: &HashSet<usize>,
        other_accept: &HashSet<usize>,
    ) -> Option<(Dfa, HashSet<usize>)> {
        self.product_construction(other, |a, b| a && b, &[self_accept.clone()], &[other_accept.clone()])
            .map(|(dfa, mut cats)| (dfa, cats.remove(0)))
    }

    pub fn difference(
        &self,
        other: &Dfa,
        self_accept: &HashSet<usize>,
        other_accept: &HashSet<usize>,
    ) -> Option<(Dfa, HashSet<usize>)> {
        self.product_construction(other, |a, b| a && !b, &[self_accept.clone()], &[other_accept.clone()])
            .map(|(dfa, mut cats)| (dfa, cats.remove(0)))
    }

    pub fn symmetric_difference(
        &self,
        other: &Dfa,
        self_accept: &HashSet<usize>,
        other_accept: &HashSet<usize>,
    ) -> Option<(Dfa, HashSet<usize>)> {
        self.product_construction(other, |a, b| a != b, &[self_accept.clone()], &[other_accept.clone()])
            .map(|(dfa, mut cats)| (dfa, cats.remove(0)))
    }

    /// The complement of `accept` over this DFA's full state set.
    pub fn invert(&self, accept: &HashSet<usize>) -> HashSet<usize> {
        self.states().filter(|s| !accept.contains(s)).collect()
    }

    /// Whether `self` (with `self_accept`) and `other` (with `other_accept`) recognize
    /// the same language, via a paired-evaluator BFS rather than constructing and
    /// checking the symmetric difference for emptiness — the naive approach explores the
    /// same state space twice over.
    pub fn equivalent_to(
        &self,
        self_accept: &HashSet<usize>,
        other: &Dfa,
        other_accept: &HashSet<usize>,
    ) -> bool {
        if self.num_symbols != other.num_symbols {
            return false;
        }
        let mut visited: HashSet<(usize, usize)> = HashSet::new();
        let mut worklist = vec![(0usize, 0usize)];

        while let Some((a, b)) = worklist.pop() {
            if !visited.insert((a, b)) {
                continue;
            }
            if self_accept.contains(&a) != other_accept.contains(&b) {
                return false;
            }
            for symbol in self.symbols() {
                worklist.push((self.process(a, symbol), other.process(b, symbol)));
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The classic Wikipedia 6-state minimization example (states a..f, accepting
    /// {b,c,d}), renumbered a=0..f=5 with symbols 0=0,1=1.
    fn wikipedia_dfa() -> (Dfa, HashSet<usize>) {
        let edges = [
            (0, 1, 0),
            (0, 2, 1),
            (1, 0, 0),
            (1, 3, 1),
            (2, 4, 0),
            (2, 5, 1),
            (3, 4, 0),
            (3, 5, 1),
            (4, 4, 0),
            (4, 5, 1),
            (5, 5, 0),
            (5, 5, 1),
        ];
        let dfa = Dfa::new(6, 2, edges).unwrap();
        (dfa, HashSet::from([1, 2, 3]))
    }

    #[test]
    fn minimize_collapses_to_three_states() {
        let (dfa, accept) = wikipedia_dfa();
        let (min, lifted) = dfa.minimize(&[accept]);
        assert_eq!(min.num_states(), 3);
        assert_eq!(lifted[0].len(), 1);
    }

    #[test]
    fn minimized_dfa_is_equivalent_to_original() {
        let (dfa, accept) = wikipedia_dfa();
        let (min, lifted) = dfa.minimize(&[accept.clone()]);
        assert!(dfa.equivalent_to(&accept, &min, &lifted[0]));
    }

    #[test]
    fn incomplete_transition_table_is_rejected() {
        let err = Dfa::new(2, 2, [(0, 1, 0)]).unwrap_err();
        assert_eq!(
            err,
            InvalidAutomaton::IncompleteTransitionTable { expected: 4, got: 1 }
        );
    }
}
