use chef::cfg::{Cfg, Elem, RuleBody, Token, Var};
use chef::ll1::Table;
use chef::regex::Regex;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashMap;

/// `(Hello, World!|a(b|c)*)*`, the scenario-1 regex from the specification's testable
/// properties.
fn sample_regex() -> Regex {
    let inner = Regex::literal("b").union(Regex::literal("c")).star();
    let alt = Regex::literal("a").concat(inner);
    Regex::literal("Hello, World!").union(alt).star()
}

/// `S -> F | ( S + F`, `F -> a`, the parenthesized-sum grammar from the LL(1) table
/// tests, with `a=0, (=1, )=2, +=3`.
fn sample_cfg() -> Cfg {
    let tok = |n: i64| Elem::Token(Token(n));
    let nt = |name: &str| Elem::Var(Var::new(name));

    let mut rules = HashMap::new();
    rules.insert(
        Var::new("S"),
        RuleBody(vec![vec![nt("F")], vec![tok(1), nt("S"), tok(3), nt("F"), tok(2)]]),
    );
    rules.insert(Var::new("F"), RuleBody(vec![vec![tok(0)]]));
    Cfg::new(Var::new("S"), rules).unwrap()
}

pub fn ll1_table_construction(c: &mut Criterion) {
    let cfg = sample_cfg();
    c.bench_function("ll1 table build", |b| b.iter(|| Table::build(black_box(&cfg)).unwrap()));
}

pub fn thompson_compile(c: &mut Criterion) {
    let re = sample_regex();
    c.bench_function("regex to_nfa", |b| b.iter(|| black_box(&re).to_nfa().unwrap()));
}

pub fn subset_construction(c: &mut Criterion) {
    let re = sample_regex();
    let (nfa, accept, _) = re.to_nfa().unwrap();
    c.bench_function("nfa to_dfa", |b| b.iter(|| black_box(&nfa).to_dfa(black_box(&[accept.clone()]))));
}

pub fn minimization(c: &mut Criterion) {
    let re = sample_regex();
    let (nfa, accept, _) = re.to_nfa().unwrap();
    let (dfa, categories) = nfa.to_dfa(&[accept]);
    c.bench_function("dfa minimize", |b| b.iter(|| black_box(&dfa).minimize(black_box(&categories))));
}

pub fn derivative_matching(c: &mut Criterion) {
    let re = sample_regex();
    let word = "Hello, World!abababacacHello, World!";
    c.bench_function("regex matches (derivative)", |b| {
        b.iter(|| black_box(&re).matches(black_box(word)).unwrap())
    });
}

criterion_group!(
    benches,
    thompson_compile,
    subset_construction,
    minimization,
    derivative_matching,
    ll1_table_construction
);
criterion_main!(benches);
