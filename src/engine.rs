//! Proof strategies.
//!
//! An [`Engine`] owns the policies and runs the strategies built on the rewrite loop of
//! [`crate::search`]:
//!
//! - **Direct**: rewrite `e1` and `e2` until they meet.
//! - **Contrapositive**: Direct on `¬e1` and `¬e2`.
//! - **Absurdity**: reduce `e1 ∧ ¬e2` to `F`.
//! - **Bidirectional**: reduce `e1 → e2` and then `e2 → e1` to `T`.
//!
//! [`Engine::prove_with_fallback`] chains Direct, Contrapositive and Absurdity.
//!
//! All strategies are sound: a reported success is backed by a chain of law applications.
//! None is complete.

use log::info;
use rand::Rng;
use serde::Serialize;

use crate::error::ProverError;
use crate::expr::Expr;
use crate::features::Layout;
use crate::policy::{PairPolicy, PriorityPolicy, SimplifyPolicy};
use crate::search::{self, Method, Mode, ProofOutcome, SearchOptions};

/// Strategy order of [`Engine::prove_with_fallback`].
pub const FALLBACK_ORDER: [Method; 3] = [Method::Direct, Method::Contrapositive, Method::Absurdity];

/// Runs proof strategies with a fixed pair of policies.
pub struct Engine {
    pair: Box<dyn PairPolicy>,
    simplify: Option<Box<dyn SimplifyPolicy>>,
}

impl Default for Engine {
    /// Engine driven by [`PriorityPolicy`] for both pairs and single expressions.
    fn default() -> Self {
        Self {
            pair: Box::new(PriorityPolicy),
            simplify: Some(Box::new(PriorityPolicy)),
        }
    }
}

/// Builder for an [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    pair: Option<Box<dyn PairPolicy>>,
    simplify: Option<Box<dyn SimplifyPolicy>>,
}

impl EngineBuilder {
    pub fn pair_policy(mut self, policy: impl PairPolicy + 'static) -> Self {
        self.pair = Some(Box::new(policy));
        self
    }

    pub fn simplify_policy(mut self, policy: impl SimplifyPolicy + 'static) -> Self {
        self.simplify = Some(Box::new(policy));
        self
    }

    /// Fails with [`ProverError::PolicyUnavailable`] when no pairwise policy was given, and with
    /// [`ProverError::PolicyLayout`] when a policy was built for the other feature layout.
    pub fn build(self) -> Result<Engine, ProverError> {
        let pair = self.pair.ok_or(ProverError::PolicyUnavailable)?;
        check_layout("pairwise", Layout::Pair, pair.expected_layout())?;
        if let Some(simplify) = &self.simplify {
            check_layout("single-expression", Layout::Single, simplify.expected_layout())?;
        }
        Ok(Engine {
            pair,
            simplify: self.simplify,
        })
    }
}

fn check_layout(role: &'static str, expected: Layout, found: Option<Layout>) -> Result<(), ProverError> {
    match found {
        Some(found) if found != expected => Err(ProverError::PolicyLayout { role, expected, found }),
        _ => Ok(()),
    }
}

/// Outcome of [`Engine::prove_with_fallback`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackReport {
    /// The strategy that succeeded, or `None` when all failed.
    pub method: Option<Method>,
    /// Iterations summed over every attempt.
    pub total_iterations: usize,
    /// Attempts that failed before `last`, in the order tried.
    pub failed: Vec<ProofOutcome>,
    /// The successful attempt, or the last one tried when all failed.
    pub last: ProofOutcome,
}

impl FallbackReport {
    pub fn success(&self) -> bool {
        self.method.is_some()
    }

    /// The successful attempt, if any.
    pub fn proof(&self) -> Option<&ProofOutcome> {
        self.last.success.then_some(&self.last)
    }
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn has_simplify_policy(&self) -> bool {
        self.simplify.is_some()
    }

    /// Rewrites `e1` and `e2` until they are syntactically equal.
    pub fn prove_direct<R: Rng + ?Sized>(&self, e1: &Expr, e2: &Expr, options: SearchOptions, rng: &mut R) -> ProofOutcome {
        self.meet(Method::Direct, e1.clone(), e2.clone(), options, rng)
    }

    /// Runs Direct on the negations of `e1` and `e2`.
    pub fn prove_contrapositive<R: Rng + ?Sized>(
        &self,
        e1: &Expr,
        e2: &Expr,
        options: SearchOptions,
        rng: &mut R,
    ) -> ProofOutcome {
        self.meet(Method::Contrapositive, Expr::not(e1.clone()), Expr::not(e2.clone()), options, rng)
    }

    /// Reduces `e1 ∧ ¬e2` to `F`.
    ///
    /// Uses the single-expression policy when there is one, and Direct against `F` otherwise.
    pub fn prove_by_absurdity<R: Rng + ?Sized>(
        &self,
        e1: &Expr,
        e2: &Expr,
        options: SearchOptions,
        rng: &mut R,
    ) -> ProofOutcome {
        let assumption = Expr::and(e1.clone(), Expr::not(e2.clone()));
        info!("absurdity: reducing {} to F", assumption);
        self.reduce(Method::Absurdity, assumption, false, options, rng)
    }

    /// Reduces `e1 → e2` and then `e2 → e1` to `T`, the same way as [`Engine::prove_by_absurdity`].
    ///
    /// The outcome sums both runs. `final1` and `final2` hold the final forms of the two
    /// implications.
    pub fn prove_bidirectional<R: Rng + ?Sized>(
        &self,
        e1: &Expr,
        e2: &Expr,
        options: SearchOptions,
        rng: &mut R,
    ) -> ProofOutcome {
        let forward = self.reduce(Method::Bidirectional, Expr::implies(e1.clone(), e2.clone()), true, options, rng);
        if !forward.success {
            return ProofOutcome {
                final2: Expr::implies(e2.clone(), e1.clone()),
                ..forward
            };
        }

        let backward = self.reduce(Method::Bidirectional, Expr::implies(e2.clone(), e1.clone()), true, options, rng);
        let mut transformations = forward.transformations;
        transformations.extend(backward.transformations);
        ProofOutcome {
            method: Method::Bidirectional,
            success: backward.success,
            iterations: forward.iterations + backward.iterations,
            policy_steps: forward.policy_steps + backward.policy_steps,
            final1: forward.final1,
            final2: backward.final1,
            transformations,
        }
    }

    /// Tries Direct, Contrapositive and Absurdity in turn, stopping at the first success.
    pub fn prove_with_fallback<R: Rng + ?Sized>(
        &self,
        e1: &Expr,
        e2: &Expr,
        options: SearchOptions,
        rng: &mut R,
    ) -> FallbackReport {
        let mut last = self.prove_with(FALLBACK_ORDER[0], e1, e2, options, rng);
        let mut total_iterations = last.iterations;
        let mut failed = Vec::new();

        for &method in &FALLBACK_ORDER[1..] {
            if last.success {
                break;
            }
            let outcome = self.prove_with(method, e1, e2, options, rng);
            total_iterations += outcome.iterations;
            failed.push(std::mem::replace(&mut last, outcome));
        }

        let method = last.success.then_some(last.method);
        match method {
            Some(method) => info!("fallback chain succeeded with {} after {} iterations", method.name(), total_iterations),
            None => info!("fallback chain failed after {} iterations", total_iterations),
        }
        FallbackReport {
            method,
            total_iterations,
            failed,
            last,
        }
    }

    /// Runs one strategy by method. [`Method::Simplification`] reduces `e1` to the constant `e2`,
    /// falling back to Direct when `e2` is not a constant.
    pub fn prove_with<R: Rng + ?Sized>(
        &self,
        method: Method,
        e1: &Expr,
        e2: &Expr,
        options: SearchOptions,
        rng: &mut R,
    ) -> ProofOutcome {
        match method {
            Method::Direct => self.prove_direct(e1, e2, options, rng),
            Method::Contrapositive => self.prove_contrapositive(e1, e2, options, rng),
            Method::Absurdity => self.prove_by_absurdity(e1, e2, options, rng),
            Method::Bidirectional => self.prove_bidirectional(e1, e2, options, rng),
            Method::Simplification => match e2.as_constant() {
                Some(goal) => self.simplify_to_constant(e1, goal, options, rng),
                None => self.prove_direct(e1, e2, options, rng),
            },
        }
    }

    /// Rewrites `expr` alone until it becomes the constant `goal`.
    ///
    /// Uses the single-expression policy when there is one, and the pairwise policy against the
    /// constant otherwise.
    pub fn simplify_to_constant<R: Rng + ?Sized>(
        &self,
        expr: &Expr,
        goal: bool,
        options: SearchOptions,
        rng: &mut R,
    ) -> ProofOutcome {
        self.reduce(Method::Simplification, expr.clone(), goal, options, rng)
    }

    fn reduce<R: Rng + ?Sized>(&self, method: Method, expr: Expr, goal: bool, options: SearchOptions, rng: &mut R) -> ProofOutcome {
        match &self.simplify {
            Some(policy) => search::run(method, expr, Expr::constant(goal), Mode::Reduce(goal, &**policy), options, rng),
            None => self.meet(method, expr, Expr::constant(goal), options, rng),
        }
    }

    fn meet<R: Rng + ?Sized>(&self, method: Method, e1: Expr, e2: Expr, options: SearchOptions, rng: &mut R) -> ProofOutcome {
        info!("{}: {} vs {}", method.name(), e1, e2);
        search::run(method, e1, e2, Mode::Meet(&*self.pair), options, rng)
    }
}
