//! An algebraic regular expression type with normalizing smart constructors, a
//! Brzozowski derivative engine, and a Thompson-style compiler to [`crate::nfa::Nfa`]
//! (§3, §4.D, §4.E).
//!
//! The six combinators ([`Regex::empty`], [`Regex::epsilon`], [`Regex::literal`],
//! [`Regex::union`], [`Regex::concat`], [`Regex::star`]) each normalize their result, so
//! later algorithms (derivative, compilation) never have to special-case `∅`/`ε` noise
//! left over from construction.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::UnsupportedFeature;
use crate::nfa::Nfa;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tree {
    Empty,
    Literal(Rc<str>),
    Cat(Vec<Regex>),
    Union(Vec<Regex>),
    Star(Box<Regex>),
    CharClass,
}

/// An algebraic regular expression (§3). Construct via the combinators below; the tree
/// shape is otherwise private, since every downstream operation goes through
/// [`Regex::nullable`], [`Regex::derivative`], or [`Regex::to_nfa`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regex(Tree);

impl Regex {
    /// The regex matching no string at all (language ∅).
    pub fn empty() -> Self {
        Regex(Tree::Empty)
    }

    /// The regex matching only the empty string.
    pub fn epsilon() -> Self {
        Regex(Tree::Literal(Rc::from("")))
    }

    /// The regex matching exactly `s`. An empty `s` is equivalent to [`Regex::epsilon`].
    pub fn literal(s: impl Into<Rc<str>>) -> Self {
        Regex(Tree::Literal(s.into()))
    }

    /// A reserved placeholder for Unicode character classes. No engine in this crate
    /// evaluates it; every engine returns [`UnsupportedFeature::CharClass`] instead.
    pub fn char_class() -> Self {
        Regex(Tree::CharClass)
    }

    /// `self | other`, normalizing away `∅` operands and flattening nested unions.
    ///
    /// ```rust
    /// use chef::regex::Regex;
    /// let r = Regex::literal("a").union(Regex::empty());
    /// assert_eq!(r, Regex::literal("a"));
    /// ```
    pub fn union(self, other: Self) -> Self {
        match (self.0, other.0) {
            (Tree::Empty, t) => Regex(t),
            (t, Tree::Empty) => Regex(t),
            (Tree::Union(mut xs), Tree::Union(ys)) => {
                xs.extend(ys);
                Regex(Tree::Union(xs))
            }
            (Tree::Union(mut xs), t) => {
                xs.push(Regex(t));
                Regex(Tree::Union(xs))
            }
            (t, Tree::Union(mut ys)) => {
                ys.insert(0, Regex(t));
                Regex(Tree::Union(ys))
            }
            (a, b) => Regex(Tree::Union(vec![Regex(a), Regex(b)])),
        }
    }

    /// `self · other`, normalizing `∅` absorption, literal-literal fusion, and nested
    /// concatenation flattening.
    ///
    /// ```rust
    /// use chef::regex::Regex;
    /// let r = Regex::literal("a").concat(Regex::literal("b"));
    /// assert_eq!(r, Regex::literal("ab"));
    /// ```
    pub fn concat(self, other: Self) -> Self {
        match (self.0, other.0) {
            (Tree::Empty, _) | (_, Tree::Empty) => Regex(Tree::Empty),
            (Tree::Literal(a), Tree::Literal(b)) => {
                let mut s = String::with_capacity(a.len() + b.len());
                s.push_str(&a);
                s.push_str(&b);
                Regex(Tree::Literal(Rc::from(s)))
            }
            (Tree::Cat(mut xs), Tree::Cat(ys)) => {
                xs.extend(ys);
                Regex(Tree::Cat(xs)).collapse()
            }
            (Tree::Cat(mut xs), t) => {
                if !is_empty_literal(&t) {
                    xs.push(Regex(t));
                }
                Regex(Tree::Cat(xs)).collapse()
            }
            (t, Tree::Cat(mut ys)) => {
                if !is_empty_literal(&t) {
                    ys.insert(0, Regex(t));
                }
                Regex(Tree::Cat(ys)).collapse()
            }
            (a, b) if is_empty_literal(&a) => Regex(b),
            (a, b) if is_empty_literal(&b) => Regex(a),
            (a, b) => Regex(Tree::Cat(vec![Regex(a), Regex(b)])),
        }
    }

    fn collapse(self) -> Self {
        match self.0 {
            Tree::Cat(mut xs) if xs.len() == 1 => xs.pop().unwrap(),
            Tree::Cat(xs) if xs.is_empty() => Regex::epsilon(),
            other => Regex(other),
        }
    }

    /// `self*`, normalizing `∅* = ∅` and `(r*)* = r*`.
    pub fn star(self) -> Self {
        match self.0 {
            Tree::Empty => Regex(Tree::Empty),
            Tree::Star(r) => Regex(Tree::Star(r)),
            t => Regex(Tree::Star(Box::new(Regex(t)))),
        }
    }

    /// Whether `ε` is in this regex's language (§4.D).
    pub fn nullable(&self) -> bool {
        match &self.0 {
            Tree::Empty => false,
            Tree::Literal(s) => s.is_empty(),
            Tree::Star(_) => true,
            Tree::Cat(xs) => xs.iter().all(Regex::nullable),
            Tree::Union(xs) => xs.iter().any(Regex::nullable),
            Tree::CharClass => false,
        }
    }

    /// The Brzozowski derivative of this regex with respect to `c`: the regex matching
    /// `w` such that `c` followed by `w` is matched by `self` (§4.D).
    pub fn derivative(&self, c: char) -> Result<Regex, UnsupportedFeature> {
        match &self.0 {
            Tree::Empty => Ok(Regex::empty()),
            Tree::Literal(s) => {
                let mut chars = s.chars();
                if chars.next() == Some(c) {
                    Ok(Regex::literal(chars.as_str()))
                } else {
                    Ok(Regex::empty())
                }
            }
            Tree::Union(xs) => {
                let mut acc = Regex::empty();
                for x in xs {
                    acc = acc.union(x.derivative(c)?);
                }
                Ok(acc)
            }
            Tree::Cat(xs) => {
                let (first, rest) = xs.split_first().expect("normalized Cat is never empty");
                let rest_re = Regex(Tree::Cat(rest.to_vec())).collapse();
                let mut result = first.derivative(c)?.concat(rest_re.clone());
                if first.nullable() {
                    result = result.union(rest_re.derivative(c)?);
                }
                Ok(result)
            }
            Tree::Star(r) => Ok(r.derivative(c)?.concat(Regex(Tree::Star(r.clone())))),
            Tree::CharClass => Err(UnsupportedFeature::CharClass),
        }
    }

    /// Membership by iterated derivative: `nullable(fold D_c self s)`.
    pub fn matches(&self, s: &str) -> Result<bool, UnsupportedFeature> {
        let mut current = self.clone();
        for c in s.chars() {
            current = current.derivative(c)?;
        }
        Ok(current.nullable())
    }

    fn collect_chars(&self, out: &mut Vec<char>) {
        match &self.0 {
            Tree::Empty | Tree::CharClass => {}
            Tree::Literal(s) => out.extend(s.chars()),
            Tree::Cat(xs) | Tree::Union(xs) => xs.iter().for_each(|x| x.collect_chars(out)),
            Tree::Star(r) => r.collect_chars(out),
        }
    }

    fn contains_char_class(&self) -> bool {
        match &self.0 {
            Tree::CharClass => true,
            Tree::Empty | Tree::Literal(_) => false,
            Tree::Cat(xs) | Tree::Union(xs) => xs.iter().any(Regex::contains_char_class),
            Tree::Star(r) => r.contains_char_class(),
        }
    }

    /// Compiles this regex to an NFA via Thompson's construction (§4.E). Returns the
    /// NFA, its (single) set of accepting states, and the map from source character to
    /// the `SymbolId` used for it (symbol 0 is always ε).
    pub fn to_nfa(&self) -> Result<(Nfa, std::collections::HashSet<usize>, HashMap<char, usize>), UnsupportedFeature> {
        if self.contains_char_class() {
            return Err(UnsupportedFeature::CharClass);
        }
        let mut chars = Vec::new();
        self.collect_chars(&mut chars);
        chars.sort_unstable();
        chars.dedup();
        let symbol_map: HashMap<char, usize> = chars.iter().enumerate().map(|(i, &c)| (c, i + 1)).collect();

        let fragment = build_fragment(self, &symbol_map);
        let num_symbols = symbol_map.len() + 1;
        let nfa = Nfa::new(fragment.num_states, num_symbols, fragment.edges)
            .expect("thompson construction only emits in-range edges");
        let accepts = fragment.accepts.into_iter().collect();
        Ok((nfa, accepts, symbol_map))
    }
}

fn is_empty_literal(tree: &Tree) -> bool {
    matches!(tree, Tree::Literal(s) if s.is_empty())
}

struct Fragment {
    num_states: usize,
    edges: Vec<(usize, usize, usize)>,
    accepts: Vec<usize>,
}

fn build_fragment(re: &Regex, symbol_map: &HashMap<char, usize>) -> Fragment {
    match &re.0 {
        Tree::Empty | Tree::CharClass => Fragment {
            num_states: 1,
            edges: Vec::new(),
            accepts: Vec::new(),
        },
        Tree::Literal(s) => {
            let chars: Vec<char> = s.chars().collect();
            let n = chars.len();
            let edges = chars
                .iter()
                .enumerate()
                .map(|(i, c)| (i, i + 1, symbol_map[c]))
                .collect();
            Fragment {
                num_states: n + 1,
                edges,
                accepts: vec![n],
            }
        }
        Tree::Union(xs) => {
            if xs.is_empty() {
                return Fragment {
                    num_states: 1,
                    edges: Vec::new(),
                    accepts: Vec::new(),
                };
            }
            let mut num_states = 1;
            let mut edges = vec![];
            let mut accepts = vec![];
            for x in xs {
                let sub = build_fragment(x, symbol_map);
                edges.push((0, num_states, 0));
                edges.extend(sub.edges.into_iter().map(|(f, t, s)| (f + num_states, t + num_states, s)));
                accepts.extend(sub.accepts.into_iter().map(|a| a + num_states));
                num_states += sub.num_states;
            }
            Fragment {
                num_states,
                edges,
                accepts,
            }
        }
        Tree::Cat(xs) => {
            if xs.is_empty() {
                return Fragment {
                    num_states: 1,
                    edges: Vec::new(),
                    accepts: vec![0],
                };
            }
            let mut num_states = 0;
            let mut edges = vec![];
            let mut prev_accepts: Vec<usize> = vec![];
            for x in xs {
                let sub = build_fragment(x, symbol_map);
                let offset = num_states;
                edges.extend(sub.edges.into_iter().map(|(f, t, s)| (f + offset, t + offset, s)));
                for pa in &prev_accepts {
                    edges.push((*pa, offset, 0));
                }
                prev_accepts = sub.accepts.into_iter().map(|a| a + offset).collect();
                num_states += sub.num_states;
            }
            Fragment {
                num_states,
                edges,
                accepts: prev_accepts,
            }
        }
        Tree::Star(r) => {
            let sub = build_fragment(r, symbol_map);
            let sink = sub.num_states + 1;
            let mut edges = vec![(0, 1, 0), (0, sink, 0)];
            edges.extend(sub.edges.into_iter().map(|(f, t, s)| (f + 1, t + 1, s)));
            for a in sub.accepts {
                edges.push((a + 1, 1, 0));
                edges.push((a + 1, sink, 0));
            }
            Fragment {
                num_states: sink + 1,
                edges,
                accepts: vec![sink],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Regex {
        Regex::literal(s)
    }

    fn star_plus_ab() -> Regex {
        // (Hello, World!|a(b|c)*)*
        let inner = lit("b").union(lit("c")).star();
        let alt = lit("a").concat(inner);
        lit("Hello, World!").union(alt).star()
    }

    #[test]
    fn derivative_and_nfa_agree_on_scenario_one() {
        let re = star_plus_ab();
        assert!(re.matches("").unwrap());
        assert!(re.matches("Hello, World!").unwrap());
        assert!(re.matches("ab").unwrap());
        assert!(re.matches("abac").unwrap());
        assert!(!re.matches("a").unwrap());
        assert!(!re.matches("Doesn't match").unwrap());

        let (nfa, accept, symbols) = re.to_nfa().unwrap();
        for word in ["", "Hello, World!", "ab", "abac"] {
            let mut states = nfa.epsilon_closure([0]);
            for c in word.chars() {
                let symbol = symbols[&c];
                let mut next = std::collections::HashSet::new();
                for &s in &states {
                    next.extend(nfa.process(s, symbol).iter().copied());
                }
                states = nfa.epsilon_closure(next);
            }
            assert!(states.iter().any(|s| accept.contains(s)), "failed on {word:?}");
        }
    }

    #[test]
    fn derivative_and_nfa_agree_on_scenario_two() {
        // (ab|a)baby
        let re = lit("ab").union(lit("a")).concat(lit("baby"));
        assert!(re.matches("ababy").unwrap());
        assert!(re.matches("abbaby").unwrap());
        assert!(!re.matches("baby").unwrap());
        assert!(!re.matches("ababyx").unwrap());

        let (nfa, accept, symbols) = re.to_nfa().unwrap();
        for word in ["ababy", "abbaby"] {
            let mut states = nfa.epsilon_closure([0]);
            for c in word.chars() {
                let symbol = symbols[&c];
                let mut next = std::collections::HashSet::new();
                for &s in &states {
                    next.extend(nfa.process(s, symbol).iter().copied());
                }
                states = nfa.epsilon_closure(next);
            }
            assert!(states.iter().any(|s| accept.contains(s)), "failed on {word:?}");
        }
    }

    #[test]
    fn derivative_and_nfa_agree_on_scenario_three() {
        // (a(ab)*)*|b*
        let inner = lit("a").concat(lit("ab").star()).star();
        let re = inner.union(lit("b").star());
        assert!(re.matches("").unwrap());
        assert!(re.matches("a").unwrap());
        assert!(re.matches("aab").unwrap());
        assert!(re.matches("bbb").unwrap());
        assert!(!re.matches("aabba").unwrap());

        let (nfa, accept, symbols) = re.to_nfa().unwrap();
        for word in ["", "a", "aab"] {
            let mut states = nfa.epsilon_closure([0]);
            for c in word.chars() {
                let symbol = symbols[&c];
                let mut next = std::collections::HashSet::new();
                for &s in &states {
                    next.extend(nfa.process(s, symbol).iter().copied());
                }
                states = nfa.epsilon_closure(next);
            }
            assert!(states.iter().any(|s| accept.contains(s)), "failed on {word:?}");
        }
    }

    #[test]
    fn char_class_is_rejected_by_every_engine() {
        let re = lit("a").union(Regex::char_class());
        assert_eq!(re.derivative('a'), Err(UnsupportedFeature::CharClass));
        assert_eq!(re.to_nfa().unwrap_err(), UnsupportedFeature::CharClass);
    }

    #[test]
    fn smart_constructors_normalize_on_the_fly() {
        assert_eq!(Regex::empty().union(lit("a")), lit("a"));
        assert_eq!(Regex::empty().concat(lit("a")), Regex::empty());
        assert_eq!(Regex::empty().star(), Regex::empty());
        assert_eq!(lit("a").star().star(), lit("a").star());
    }
}
