//! Proof search benchmarks.
//!
//! Measures the truth-table verifier, feature extraction and the rewrite loop on growing inputs.
//!
//! Run with:
//! ```bash
//! cargo bench --bench search
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use eqprover::engine::Engine;
use eqprover::expr::Expr;
use eqprover::features::Features;
use eqprover::search::SearchOptions;
use eqprover::verify::check_equivalence;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// Helpers
// ============================================================================

/// `x0 ^ x1 ^ ... ^ x{n-1}`, nested to the left.
fn conjunction(n: usize) -> Expr {
    (1..n).fold(Expr::atom("x0"), |acc, i| Expr::and(acc, Expr::atom(format!("x{}", i))))
}

/// `¬x0 v ¬x1 v ... v ¬x{n-1}`, nested to the left.
fn negated_disjunction(n: usize) -> Expr {
    (1..n).fold(Expr::not(Expr::atom("x0")), |acc, i| {
        Expr::or(acc, Expr::not(Expr::atom(format!("x{}", i))))
    })
}

/// Random formula over `num_vars` variables with `num_ops` connectives.
fn random_formula(num_vars: usize, num_ops: usize, seed: u64) -> Expr {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut pool: Vec<Expr> = (0..num_vars).map(|i| Expr::atom(format!("x{}", i))).collect();
    for _ in 0..num_ops {
        let a = pool[rng.gen_range(0..pool.len())].clone();
        let b = pool[rng.gen_range(0..pool.len())].clone();
        let e = match rng.gen_range(0..4) {
            0 => Expr::not(a),
            1 => Expr::and(a, b),
            2 => Expr::or(a, b),
            _ => Expr::implies(a, b),
        };
        pool.push(e);
    }
    pool.pop().unwrap_or_else(Expr::tt)
}

// ============================================================================
// Benchmark: Truth-table verification
// ============================================================================

fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify/de_morgan");

    for n in [4, 8, 12, 16] {
        let lhs = Expr::not(conjunction(n));
        let rhs = negated_disjunction(n);
        group.throughput(Throughput::Elements(1 << n));
        group.bench_with_input(BenchmarkId::from_parameter(n), &(lhs, rhs), |b, (lhs, rhs)| {
            b.iter(|| check_equivalence(lhs, rhs));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Feature extraction
// ============================================================================

fn bench_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("features/pair");

    for ops in [8, 32, 128] {
        let e1 = random_formula(6, ops, 42);
        let e2 = random_formula(6, ops, 43);
        group.bench_with_input(BenchmarkId::new("v=6", ops), &(e1, e2), |b, (e1, e2)| {
            b.iter(|| Features::pair(e1, e2));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Direct proof search
// ============================================================================

fn bench_direct(c: &mut Criterion) {
    let mut group = c.benchmark_group("search/direct");
    let engine = Engine::default();

    let cases = [
        ("double_negation", "~~p", "p"),
        ("de_morgan", "~(p ^ q)", "~p v ~q"),
        ("factoring", "(p ^ q) v (p ^ ~q)", "p"),
        ("distributivity", "p ^ (q v r)", "(p ^ q) v (p ^ r)"),
    ];

    for (name, s1, s2) in cases {
        let e1: Expr = s1.parse().unwrap();
        let e2: Expr = s2.parse().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &(e1, e2), |b, (e1, e2)| {
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            b.iter(|| engine.prove_direct(e1, e2, SearchOptions::new(50), &mut rng));
        });
    }

    group.finish();
}

fn bench_fallback_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("search/fallback");
    let engine = Engine::default();

    for n in [2, 3, 4] {
        let e1 = Expr::not(conjunction(n));
        let e2 = negated_disjunction(n);
        group.bench_with_input(BenchmarkId::new("de_morgan", n), &(e1, e2), |b, (e1, e2)| {
            let mut rng = ChaCha8Rng::seed_from_u64(7);
            b.iter(|| engine.prove_with_fallback(e1, e2, SearchOptions::new(50), &mut rng));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_verify, bench_features, bench_direct, bench_fallback_chain);

criterion_main!(benches);
