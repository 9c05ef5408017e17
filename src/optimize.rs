//! Proof shortening.
//!
//! Given a successful proof, the optimizer looks for shortcuts: bounded Direct searches that
//! reach one of the proof's intermediate states in fewer rewrites than the proof used. Two
//! kinds are tried:
//!
//! - from the start expression to a later state, for states from the latest backwards;
//! - between two states at least three rewrites apart.
//!
//! Every shortcut found is reported along with the best one. Proofs of at most two rewrites are
//! left alone.

use log::{debug, info};
use rand::Rng;
use serde::Serialize;

use crate::engine::Engine;
use crate::expr::Expr;
use crate::search::{ProofOutcome, SearchOptions};

/// Proofs with this many rewrites or fewer are not optimized.
pub const MINIMAL_STEPS: usize = 2;

/// Minimum distance, in rewrites, between the endpoints of a between-states shortcut.
pub const MIN_SPAN: usize = 3;

/// A shorter route to an intermediate state of a proof.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shortcut {
    /// Index of the rewrite whose result the shortcut starts from, `None` for the start expression.
    pub from_step: Option<usize>,
    /// Index of the rewrite whose result the shortcut reaches.
    pub to_step: usize,
    /// Rewrites the original proof spent on this stretch.
    pub original_steps: usize,
    /// Rewrites the shortcut needs.
    pub shortcut_steps: usize,
    pub savings: usize,
    pub proof: ProofOutcome,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotOptimized {
    /// The proof failed or applied no rewrites.
    NoValidProof,
    /// The proof is already at most [`MINIMAL_STEPS`] long.
    ProofAlreadyMinimal,
    /// No shortcut was found.
    NoShortcutFound,
}

/// Outcome of [`Engine::optimize_proof`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Optimization {
    pub optimized: bool,
    pub reason: Option<NotOptimized>,
    pub original_steps: usize,
    pub optimized_steps: usize,
    pub savings: usize,
    pub best: Option<Shortcut>,
    pub shortcuts: Vec<Shortcut>,
}

impl Optimization {
    fn unchanged(reason: NotOptimized, original_steps: usize, shortcuts: Vec<Shortcut>) -> Self {
        Self {
            optimized: false,
            reason: Some(reason),
            original_steps,
            optimized_steps: original_steps,
            savings: 0,
            best: None,
            shortcuts,
        }
    }
}

/// A proof followed by its optimization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizedProof {
    pub proof: ProofOutcome,
    pub optimization: Optimization,
}

impl Engine {
    /// Searches for shortcuts in `proof`, which must prove `start` equivalent to something.
    ///
    /// Each shortcut search is a Direct run bounded by `options.max_iterations`; searches between
    /// two states are further bounded by one less than the stretch they would replace.
    pub fn optimize_proof<R: Rng + ?Sized>(
        &self,
        proof: &ProofOutcome,
        start: &Expr,
        options: SearchOptions,
        rng: &mut R,
    ) -> Optimization {
        let steps = &proof.transformations;
        let original_steps = steps.len();

        if !proof.success || steps.is_empty() {
            return Optimization::unchanged(NotOptimized::NoValidProof, original_steps, Vec::new());
        }
        if original_steps <= MINIMAL_STEPS {
            return Optimization::unchanged(NotOptimized::ProofAlreadyMinimal, original_steps, Vec::new());
        }

        let mut shortcuts = Vec::new();

        for k in (MINIMAL_STEPS..original_steps).rev() {
            let target = &steps[k].result;
            let attempt = self.prove_direct(start, target, options, rng);
            // The proof reached this state after k + 1 rewrites.
            if attempt.success && attempt.steps() < k + 1 {
                debug!("shortcut from start to step {}: {} rewrites instead of {}", k, attempt.steps(), k + 1);
                shortcuts.push(Shortcut {
                    from_step: None,
                    to_step: k,
                    original_steps: k + 1,
                    shortcut_steps: attempt.steps(),
                    savings: k + 1 - attempt.steps(),
                    proof: attempt,
                });
            }
        }

        for i in 0..original_steps {
            for j in (i + MIN_SPAN)..original_steps {
                let span = j - i;
                let budget = SearchOptions {
                    max_iterations: options.max_iterations.min(span - 1),
                    ..options
                };
                let attempt = self.prove_direct(&steps[i].result, &steps[j].result, budget, rng);
                if attempt.success && attempt.steps() < span {
                    debug!("shortcut from step {} to step {}: {} rewrites instead of {}", i, j, attempt.steps(), span);
                    shortcuts.push(Shortcut {
                        from_step: Some(i),
                        to_step: j,
                        original_steps: span,
                        shortcut_steps: attempt.steps(),
                        savings: span - attempt.steps(),
                        proof: attempt,
                    });
                }
            }
        }

        // Earliest found wins ties.
        let best = shortcuts
            .iter()
            .enumerate()
            .max_by_key(|(index, s)| (s.savings, std::cmp::Reverse(*index)))
            .map(|(_, s)| s.clone());

        match best {
            Some(best) => {
                info!("optimized proof from {} to {} rewrites", original_steps, original_steps - best.savings);
                Optimization {
                    optimized: true,
                    reason: None,
                    original_steps,
                    optimized_steps: original_steps - best.savings,
                    savings: best.savings,
                    best: Some(best),
                    shortcuts,
                }
            }
            None => Optimization::unchanged(NotOptimized::NoShortcutFound, original_steps, shortcuts),
        }
    }

    /// Proves `e1` equivalent to `e2` by Direct, or by the fallback chain if Direct fails, then
    /// optimizes the proof with a budget of `optimize_options.max_iterations` per shortcut.
    ///
    /// Returns `None` when no strategy succeeds.
    pub fn prove_and_optimize<R: Rng + ?Sized>(
        &self,
        e1: &Expr,
        e2: &Expr,
        options: SearchOptions,
        optimize_options: SearchOptions,
        rng: &mut R,
    ) -> Option<OptimizedProof> {
        let direct = self.prove_direct(e1, e2, options, rng);
        let proof = if direct.success {
            direct
        } else {
            let report = self.prove_with_fallback(e1, e2, options, rng);
            report.proof()?.clone()
        };
        let optimization = self.optimize_proof(&proof, e1, optimize_options, rng);
        Some(OptimizedProof { proof, optimization })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::laws::Law;
    use crate::policy::Target;
    use crate::search::{Method, Transformation};
    use test_log::test;

    fn e(s: &str) -> Expr {
        s.parse().unwrap()
    }

    fn step(iteration: usize, law: Law, result: &str, other: &str) -> Transformation {
        Transformation {
            iteration,
            target: Target::First,
            law,
            result: e(result),
            subexpression: None,
            policy_guided: false,
            expr1: e(result),
            expr2: e(other),
        }
    }

    fn outcome(start: &str, success: bool, steps: Vec<Transformation>) -> ProofOutcome {
        let last = steps.last().map(|t| t.result.clone()).unwrap_or_else(|| e(start));
        ProofOutcome {
            method: Method::Direct,
            success,
            iterations: steps.len(),
            policy_steps: 0,
            final1: last.clone(),
            final2: last,
            transformations: steps,
        }
    }

    #[test]
    fn test_failed_proof() {
        let engine = Engine::default();
        let proof = outcome("p", false, vec![]);
        let result = engine.optimize_proof(&proof, &e("p"), SearchOptions::new(5), &mut ChaCha8Rng::seed_from_u64(0));
        assert!(!result.optimized);
        assert_eq!(result.reason, Some(NotOptimized::NoValidProof));
    }

    #[test]
    fn test_short_proof_is_minimal() {
        let engine = Engine::default();
        let proof = outcome("~~p ^ T", true, vec![step(0, Law::DoubleNegation, "p ^ T", "p"), step(1, Law::Identity, "p", "p")]);
        let result = engine.optimize_proof(&proof, &e("~~p ^ T"), SearchOptions::new(5), &mut ChaCha8Rng::seed_from_u64(0));
        assert!(!result.optimized);
        assert_eq!(result.reason, Some(NotOptimized::ProofAlreadyMinimal));
        assert_eq!(result.optimized_steps, 2);
    }

    #[test]
    fn test_detour_is_cut() {
        // A wasteful route from ~~p to p: swap, swap back, then eliminate.
        let start = "~~p ^ q";
        let proof = outcome(
            start,
            true,
            vec![
                step(0, Law::Commutativity, "q ^ ~~p", "p ^ q"),
                step(1, Law::Commutativity, "~~p ^ q", "p ^ q"),
                step(2, Law::Commutativity, "q ^ ~~p", "p ^ q"),
                step(3, Law::Commutativity, "~~p ^ q", "p ^ q"),
                step(4, Law::DoubleNegation, "p ^ q", "p ^ q"),
            ],
        );
        let engine = Engine::default();
        let result = engine.optimize_proof(&proof, &e(start), SearchOptions::new(10), &mut ChaCha8Rng::seed_from_u64(1));
        println!("{:#?}", result.best);

        assert!(result.optimized);
        assert!(!result.shortcuts.is_empty());
        let best = result.best.unwrap();
        // Step 4 reached from the start in a single double-negation rewrite.
        assert_eq!(best.from_step, None);
        assert_eq!(best.to_step, 4);
        assert_eq!(best.shortcut_steps, 1);
        assert_eq!(best.savings, 4);
        assert_eq!(result.optimized_steps, 1);
    }

    #[test]
    fn test_prove_and_optimize() {
        let engine = Engine::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let result = engine
            .prove_and_optimize(&e("~~p"), &e("p"), SearchOptions::new(10), SearchOptions::new(5), &mut rng)
            .unwrap();
        assert!(result.proof.success);
        assert_eq!(result.optimization.reason, Some(NotOptimized::ProofAlreadyMinimal));

        let none = engine.prove_and_optimize(&e("p"), &e("q"), SearchOptions::new(3), SearchOptions::new(3), &mut rng);
        assert!(none.is_none());
    }
}
