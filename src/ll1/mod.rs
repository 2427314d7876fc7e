//! LL(1) predictive table construction and the table-driven parser runtime (§4.G).
//!
//! [`Table::build`] fails with [`NotLl1Error`] the first time it would need to register
//! two different right-hand-sides under the same `(Var, Token)` key — the grammar is
//! either ambiguous, not left-factored, or left-recursive. [`Table::recognize`] drives a
//! plain accept/reject parse; [`Table::parse`] additionally builds a [`Cst`].

use std::collections::HashMap;
use std::rc::Rc;

use crate::cfg::{first_plus_set, first_sets, follow_sets, Cfg, Elem, Seq, Token, Var};
use crate::error::NotLl1Error;

/// A constructed LL(1) predictive table: `(Var, Token) -> (alternative index, RHS)`.
#[derive(Debug, Clone)]
pub struct Table {
    entries: HashMap<(Var, Token), (usize, Rc<Seq>)>,
}

impl Table {
    /// Builds the predictive table for `cfg`, computing FIRST, FOLLOW and FIRST⁺ along
    /// the way.
    ///
    /// ```rust
    /// use chef::cfg::{Cfg, Elem, RuleBody, Token, Var};
    /// use chef::ll1::Table;
    /// use std::collections::HashMap;
    ///
    /// let mut rules = HashMap::new();
    /// rules.insert(Var::new("S"), RuleBody(vec![vec![Elem::Token(Token(0))]]));
    /// let cfg = Cfg::new(Var::new("S"), rules).unwrap();
    /// assert!(Table::build(&cfg).is_ok());
    /// ```
    pub fn build(cfg: &Cfg) -> Result<Self, NotLl1Error> {
        let first = first_sets(cfg);
        let follow = follow_sets(cfg, &first);
        let mut entries: HashMap<(Var, Token), (usize, Rc<Seq>)> = HashMap::new();

        for (var, body) in cfg.rules() {
            for (alt, seq) in body.alternatives().iter().enumerate() {
                let lookaheads = first_plus_set(&first, &follow, var, seq);
                let seq_rc = Rc::new(seq.clone());
                for token in lookaheads {
                    let key = (var.clone(), token);
                    if entries.contains_key(&key) {
                        log::debug!("ll1 table conflict at ({var}, {token}), alternative {alt}");
                        return Err(NotLl1Error {
                            var: var.clone(),
                            token,
                        });
                    }
                    entries.insert(key, (alt, seq_rc.clone()));
                }
            }
        }

        Ok(Table { entries })
    }

    pub fn lookup(&self, var: &Var, token: Token) -> Option<(usize, &Seq)> {
        self.entries.get(&(var.clone(), token)).map(|(alt, seq)| (*alt, seq.as_ref()))
    }

    /// Recognizes `tokens` against `cfg`'s start variable, per the table in §4.G. Returns
    /// `true` iff the whole input is consumed and every expansion succeeds.
    pub fn recognize(&self, cfg: &Cfg, tokens: impl IntoIterator<Item = Token>) -> bool {
        let mut tokens = tokens.into_iter().peekable();
        let mut stack: Vec<Elem> = vec![Elem::Var(cfg.start().clone())];

        loop {
            let next = tokens.peek().copied().unwrap_or(Token::EOF);
            match stack.pop() {
                None => return next == Token::EOF,
                Some(Elem::Token(t)) => {
                    if next == t {
                        tokens.next();
                    } else {
                        return false;
                    }
                }
                Some(Elem::Var(v)) => match self.lookup(&v, next) {
                    Some((_, seq)) => stack.extend(seq.iter().rev().cloned()),
                    None => return false,
                },
            }
        }
    }

    /// Parses `tokens` against `cfg`, building a [`Cst`] via the sentinel-marker
    /// technique described in §4.G. Returns `None` on any parse failure.
    pub fn parse(&self, cfg: &Cfg, tokens: impl IntoIterator<Item = Token>) -> Option<Cst> {
        enum Frame {
            Expand(Elem),
            CloseVar,
        }

        let mut tokens = tokens.into_iter().peekable();
        let mut control = vec![Frame::Expand(Elem::Var(cfg.start().clone()))];
        let mut open_nodes: Vec<Cst> = Vec::new();

        loop {
            let next = tokens.peek().copied().unwrap_or(Token::EOF);
            match control.pop() {
                None => {
                    return if next == Token::EOF {
                        open_nodes.pop()
                    } else {
                        None
                    };
                }
                Some(Frame::CloseVar) => {
                    let finished = open_nodes.pop()?;
                    match open_nodes.last_mut() {
                        Some(parent) => parent.children.push(CstChild::Node(finished)),
                        None => open_nodes.push(finished),
                    }
                }
                Some(Frame::Expand(Elem::Token(t))) => {
                    if next == t {
                        tokens.next();
                        if let Some(parent) = open_nodes.last_mut() {
                            parent.children.push(CstChild::Token(t));
                        }
                    } else {
                        return None;
                    }
                }
                Some(Frame::Expand(Elem::Var(v))) => {
                    let (alt, seq) = self.lookup(&v, next)?;
                    open_nodes.push(Cst {
                        var: v,
                        alt,
                        children: Vec::new(),
                    });
                    control.push(Frame::CloseVar);
                    control.extend(seq.iter().rev().cloned().map(Frame::Expand));
                }
            }
        }
    }
}

/// A child of a [`Cst`] node: either a consumed token or a nested production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CstChild {
    Token(Token),
    Node(Cst),
}

/// A concrete syntax tree node: the variable it expands, which alternative of its
/// [`crate::cfg::RuleBody`] was chosen, and the resulting children in production order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cst {
    pub var: Var,
    pub alt: usize,
    pub children: Vec<CstChild>,
}

impl Cst {
    /// Flattens the tree's token leaves, in left-to-right order (§8 invariant 6).
    pub fn tokens(&self) -> Vec<Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens(&self, out: &mut Vec<Token>) {
        for child in &self.children {
            match child {
                CstChild::Token(t) => out.push(*t),
                CstChild::Node(n) => n.collect_tokens(out),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::RuleBody;
    use std::collections::HashMap;

    fn var(name: &str) -> Var {
        Var::new(name)
    }

    fn tok(n: i64) -> Elem {
        Elem::Token(Token(n))
    }

    fn nt(name: &str) -> Elem {
        Elem::Var(var(name))
    }

    /// S -> F | ( S + F, F -> a, with a=0, (=1, )=2, +=3.
    fn paren_sum_grammar() -> Cfg {
        let mut rules = HashMap::new();
        rules.insert(
            var("S"),
            RuleBody(vec![vec![nt("F")], vec![tok(1), nt("S"), tok(3), nt("F"), tok(2)]]),
        );
        rules.insert(var("F"), RuleBody(vec![vec![tok(0)]]));
        Cfg::new(var("S"), rules).unwrap()
    }

    #[test]
    fn builds_and_accepts_balanced_sum() {
        let cfg = paren_sum_grammar();
        let table = Table::build(&cfg).unwrap();
        let accepted: Vec<Token> = [1, 0, 3, 0, 2].into_iter().map(Token).collect();
        assert!(table.recognize(&cfg, accepted.clone()));

        let rejected: Vec<Token> = [1, 0, 3, 0].into_iter().map(Token).collect();
        assert!(!table.recognize(&cfg, rejected));

        let cst = table.parse(&cfg, accepted.clone()).unwrap();
        assert_eq!(cst.var, var("S"));
        assert_eq!(cst.children.len(), 5);
        assert_eq!(cst.tokens(), accepted);
    }

    #[test]
    fn left_factoring_conflict_is_rejected() {
        let mut rules = HashMap::new();
        rules.insert(var("S"), RuleBody(vec![vec![tok(0), tok(1)], vec![tok(0), tok(0)]]));
        let cfg = Cfg::new(var("S"), rules).unwrap();
        let err = Table::build(&cfg).unwrap_err();
        assert_eq!(err.var, var("S"));
    }

    #[test]
    fn left_recursion_conflict_is_rejected() {
        let mut rules = HashMap::new();
        rules.insert(var("S"), RuleBody(vec![vec![nt("S"), tok(0)], vec![tok(0)]]));
        let cfg = Cfg::new(var("S"), rules).unwrap();
        let err = Table::build(&cfg).unwrap_err();
        assert_eq!(err.var, var("S"));
    }
}
