//! Context-free grammars, and the FIRST/FOLLOW/FIRST⁺ fixed-point computations used to
//! decide whether a grammar can be parsed with one token of lookahead.
//!
//! A [`Cfg`] is a start [`Var`] plus a mapping from each [`Var`] to its [`RuleBody`] (the
//! set of right-hand-side alternatives). [`Token`] is a small signed integer; two values
//! are reserved, [`EPSILON`] and [`EOF`], matching the convention used throughout the
//! rest of this crate's LL(1) machinery.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::error::ConstructionError;

/// The underlying integer representation of a grammar token.
pub type TokenType = i64;

/// Reserved token value denoting the empty production.
pub const EPSILON: TokenType = -1;

/// Reserved token value denoting end-of-input.
pub const EOF: TokenType = -2;

/// A grammar terminal, identified by a small integer. See [`EPSILON`] and [`EOF`] for the
/// two reserved values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(pub TokenType);

impl Token {
    pub const EPSILON: Token = Token(EPSILON);
    pub const EOF: Token = Token(EOF);

    pub fn is_epsilon(&self) -> bool {
        self.0 == EPSILON
    }

    pub fn is_eof(&self) -> bool {
        self.0 == EOF
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            EPSILON => write!(f, "ε"),
            EOF => write!(f, "$"),
            n => write!(f, "{n}"),
        }
    }
}

/// A grammar non-terminal, identified by name.
///
/// ```rust
/// use chef::cfg::Var;
///
/// let s = Var::new("S");
/// assert_eq!(s.to_string(), "S");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(Rc<str>);

impl Var {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Var(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Var {
    fn from(value: &str) -> Self {
        Var::new(value)
    }
}

/// One element of a right-hand-side sequence: either a non-terminal or a terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Elem {
    Var(Var),
    Token(Token),
}

/// An ordered right-hand-side of a production. An empty `Seq` denotes the erasable
/// (ε) alternative.
pub type Seq = Vec<Elem>;

/// The set of alternative right-hand-sides for a single non-terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleBody(pub Vec<Seq>);

impl RuleBody {
    pub fn alternatives(&self) -> &[Seq] {
        &self.0
    }
}

impl FromIterator<Seq> for RuleBody {
    fn from_iter<T: IntoIterator<Item = Seq>>(iter: T) -> Self {
        RuleBody(iter.into_iter().collect())
    }
}

/// A context-free grammar: a start variable and a rule map. Every variable referenced in
/// any rule body must itself have a rule body, enforced at construction time.
#[derive(Debug, Clone)]
pub struct Cfg {
    start: Var,
    rules: HashMap<Var, RuleBody>,
}

impl Cfg {
    pub fn new(start: Var, rules: HashMap<Var, RuleBody>) -> Result<Self, ConstructionError> {
        if !rules.contains_key(&start) {
            return Err(ConstructionError::MissingStartRule(start));
        }
        for body in rules.values() {
            for seq in &body.0 {
                for elem in seq {
                    if let Elem::Var(v) = elem {
                        if !rules.contains_key(v) {
                            return Err(ConstructionError::UndefinedVariable(v.clone()));
                        }
                    }
                }
            }
        }
        Ok(Cfg { start, rules })
    }

    pub fn start(&self) -> &Var {
        &self.start
    }

    pub fn body(&self, var: &Var) -> Option<&RuleBody> {
        self.rules.get(var)
    }

    pub fn rules(&self) -> &HashMap<Var, RuleBody> {
        &self.rules
    }

    pub fn variables(&self) -> impl Iterator<Item = &Var> {
        self.rules.keys()
    }
}

/// Computes FIRST(v) for every variable in `cfg` by fixed-point iteration over the rule
/// map (§4.F). `ε` is included in `FIRST(v)` iff some alternative for `v` is fully
/// nullable.
pub fn first_sets(cfg: &Cfg) -> HashMap<Var, HashSet<Token>> {
    let mut first: HashMap<Var, HashSet<Token>> =
        cfg.variables().map(|v| (v.clone(), HashSet::new())).collect();

    loop {
        let mut changed = false;
        for (var, body) in cfg.rules() {
            for seq in body.alternatives() {
                let mut prefix_nullable = true;
                for elem in seq {
                    match elem {
                        Elem::Token(t) if t.is_epsilon() => {}
                        Elem::Token(t) => {
                            changed |= first.get_mut(var).unwrap().insert(*t);
                            prefix_nullable = false;
                            break;
                        }
                        Elem::Var(u) => {
                            let u_first = first[u].clone();
                            let has_eps = u_first.contains(&Token::EPSILON);
                            for t in u_first.iter().filter(|t| !t.is_epsilon()) {
                                changed |= first.get_mut(var).unwrap().insert(*t);
                            }
                            if !has_eps {
                                prefix_nullable = false;
                                break;
                            }
                        }
                    }
                }
                if prefix_nullable {
                    changed |= first.get_mut(var).unwrap().insert(Token::EPSILON);
                }
            }
        }
        log::trace!("first_sets: pass completed, changed = {changed}");
        if !changed {
            return first;
        }
    }
}

/// Computes FOLLOW(v) for every variable, given the already-computed FIRST sets (§4.F).
/// `ε` never appears in a FOLLOW set.
pub fn follow_sets(cfg: &Cfg, first: &HashMap<Var, HashSet<Token>>) -> HashMap<Var, HashSet<Token>> {
    let mut follow: HashMap<Var, HashSet<Token>> =
        cfg.variables().map(|v| (v.clone(), HashSet::new())).collect();
    follow.get_mut(cfg.start()).unwrap().insert(Token::EOF);

    loop {
        let mut changed = false;
        for (var, body) in cfg.rules() {
            for seq in body.alternatives() {
                for (i, elem) in seq.iter().enumerate() {
                    let Elem::Var(u) = elem else { continue };
                    let beta = &seq[i + 1..];
                    let mut beta_nullable = true;
                    for b in beta {
                        match b {
                            Elem::Token(t) if t.is_epsilon() => {}
                            Elem::Token(t) => {
                                changed |= follow.get_mut(u).unwrap().insert(*t);
                                beta_nullable = false;
                                break;
                            }
                            Elem::Var(w) => {
                                let w_first = first[w].clone();
                                let has_eps = w_first.contains(&Token::EPSILON);
                                for t in w_first.iter().filter(|t| !t.is_epsilon()) {
                                    changed |= follow.get_mut(u).unwrap().insert(*t);
                                }
                                if !has_eps {
                                    beta_nullable = false;
                                    break;
                                }
                            }
                        }
                    }
                    if beta_nullable {
                        let follow_var = follow[var].clone();
                        for t in follow_var {
                            changed |= follow.get_mut(u).unwrap().insert(t);
                        }
                    }
                }
            }
        }
        log::trace!("follow_sets: pass completed, changed = {changed}");
        if !changed {
            return follow;
        }
    }
}

/// Computes FIRST⁺(v → seq), the lookahead set that decides whether the LL(1) parser
/// should choose this alternative (§4.F). Never contains `ε`.
pub fn first_plus_set(
    first: &HashMap<Var, HashSet<Token>>,
    follow: &HashMap<Var, HashSet<Token>>,
    var: &Var,
    seq: &Seq,
) -> HashSet<Token> {
    let mut result = HashSet::new();
    let mut nullable = true;
    for elem in seq {
        match elem {
            Elem::Token(t) if t.is_epsilon() => {}
            Elem::Token(t) => {
                result.insert(*t);
                nullable = false;
                break;
            }
            Elem::Var(u) => {
                let u_first = &first[u];
                let has_eps = u_first.contains(&Token::EPSILON);
                result.extend(u_first.iter().filter(|t| !t.is_epsilon()).copied());
                if !has_eps {
                    nullable = false;
                    break;
                }
            }
        }
    }
    if nullable {
        result.extend(follow[var].iter().copied());
    }
    result
}
