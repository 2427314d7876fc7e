//! # chef
//!
//! `chef` is a compiler-construction toolkit: finite automata, a regular expression
//! algebra with a Brzozowski derivative engine, and a context-free grammar engine with
//! LL(1) table construction and a table-driven parser runtime.
//!
//! ## Usage
//!
//! ```rust
//! use chef::regex::Regex;
//!
//! let re = Regex::literal("a").concat(Regex::literal("b")).star();
//! assert!(re.matches("ababab").unwrap());
//! assert!(!re.matches("aba").unwrap());
//!
//! let (nfa, accept, symbols) = re.to_nfa().unwrap();
//! let (dfa, categories) = nfa.to_dfa(&[accept]);
//! let (min, categories) = dfa.minimize(&categories);
//! let a = symbols[&'a'];
//! let b = symbols[&'b'];
//! let end = min.run([a, b, a, b]);
//! assert!(categories[0].contains(&end));
//! ```
//!
//! ## Pipeline
//!
//! Regex source is algebraically built with the combinators in [`regex`], compiled to
//! an [`nfa::Nfa`] via Thompson's construction, converted to a [`dfa::Dfa`] via subset
//! construction, and minimized with Hopcroft's algorithm. Separately, a [`cfg::Cfg`] can
//! have its LL(1) table built by [`ll1::Table::build`] and then be used to recognize, or
//! build a concrete syntax tree for, a token stream.
//!
//! ## Operations
//!
//! This library currently supports:
//!
//! * Constructing [DFAs](dfa::Dfa::new) and [NFAs](nfa::Nfa::new) from dense state/symbol
//!   edge lists
//! * [Converting NFAs to DFAs](nfa::Nfa::to_dfa) via subset construction with ε-closure
//! * [Minimizing DFAs](dfa::Dfa::minimize) via Hopcroft partition refinement, generalized
//!   to any number of tracked categories
//! * [Checking whether two DFAs](dfa::Dfa::equivalent_to) or
//!   [two NFAs](nfa::Nfa::equivalent_to) are equivalent, and the boolean
//!   [product constructions](dfa::Dfa::product_construction) backing union, intersection,
//!   difference and symmetric difference
//! * An algebraic [regex type](regex::Regex) with normalizing smart constructors, a
//!   [Brzozowski derivative engine](regex::Regex::derivative), and a
//!   [Thompson-style NFA compiler](regex::Regex::to_nfa)
//! * A [context-free grammar model](cfg::Cfg) with
//!   [FIRST](cfg::first_sets)/[FOLLOW](cfg::follow_sets)/[FIRST⁺](cfg::first_plus_set) set
//!   computation
//! * [LL(1) table construction](ll1::Table::build) with non-LL(1) conflict detection, and
//!   a table-driven [recognizer](ll1::Table::recognize) /
//!   [CST builder](ll1::Table::parse)

pub mod cfg;
pub mod dfa;
pub mod error;
pub mod ll1;
pub mod nfa;
pub mod regex;

#[cfg(test)]
mod tests;
