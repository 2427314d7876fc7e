//! Error types shared across the automata, regex and grammar subsystems.
//!
//! Each fallible constructor in this crate returns one of these `thiserror`-derived
//! enums rather than panicking on caller-supplied data. Panics are reserved for
//! invariant violations this crate itself would have to cause (see the `debug_assert!`s
//! in [`crate::dfa`] and [`crate::nfa`]).

use crate::cfg::{Token, Var};
use thiserror::Error;

/// A DFA or NFA was constructed from data that does not satisfy the invariants of
/// [`crate::dfa::Dfa`] / [`crate::nfa::Nfa`].
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum InvalidAutomaton {
    #[error("edge references state {0}, but only {1} states exist")]
    OutOfRangeState(usize, usize),
    #[error("edge references symbol {0}, but only {1} symbols exist")]
    OutOfRangeSymbol(usize, usize),
    #[error("dfa transition table is incomplete: expected {expected} entries (states * symbols), got {got}")]
    IncompleteTransitionTable { expected: usize, got: usize },
    #[error("dfa transition table has more than one entry for state {state} on symbol {symbol}")]
    DuplicateTransition { state: usize, symbol: usize },
}

/// A [`crate::cfg::Cfg`] was constructed with a dangling reference.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConstructionError {
    #[error("variable '{0}' is referenced in a rule but has no rule body of its own")]
    UndefinedVariable(Var),
    #[error("start variable '{0}' has no rule body")]
    MissingStartRule(Var),
}

/// Table construction detected that the grammar is not LL(1).
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("grammar is not LL(1): variable '{var}' has two applicable rules on lookahead token {token:?} (consider left-factoring or eliminating left recursion)")]
pub struct NotLl1Error {
    pub var: Var,
    pub token: Token,
}

/// A regex engine was asked to evaluate a feature it does not implement.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum UnsupportedFeature {
    #[error("character classes are a reserved placeholder and are not evaluated by any engine")]
    CharClass,
}
