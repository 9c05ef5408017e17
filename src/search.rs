//! The rewrite loop shared by every proof strategy.
//!
//! Each iteration first checks the goal, then asks the policy for a rewrite. A proposal whose law
//! applies somewhere in its target is applied at a uniformly random matching location. Otherwise
//! the loop falls back to a fixed plan:
//!
//! 1. the first applicable law of [`SIMPLIFICATION_ORDER`], expression 1 before expression 2;
//! 2. a uniformly random applicable pair from [`STRUCTURE_LAWS`] × targets;
//! 3. with probability [`EXPANSION_PROBABILITY`], a uniformly random applicable pair from
//!    [`EXPANSION_LAWS`] × targets;
//! 4. otherwise the iteration passes without a rewrite.
//!
//! Reducing a single expression to a constant uses its own plan: the first law of
//! [`REDUCE_SIMPLIFICATION_ORDER`], then of [`REDUCE_STRUCTURE_LAWS`], that has a usable site.
//! A site is usable when rewriting it yields a state not visited before in the run, and
//! distributivity is only used in the direction of the goal: conjunctions over disjunctions
//! towards `F`, disjunctions over conjunctions towards `T`.

use std::collections::HashSet;

use log::{debug, info, log, trace, Level};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::expr::Expr;
use crate::features::Features;
use crate::laws::Law;
use crate::paths::{subexpr_at, Path, Side};
use crate::policy::{PairAction, PairPolicy, SimplifyPolicy, Target};

/// Simplifications tried by the fallback, in order.
pub const SIMPLIFICATION_ORDER: [Law; 9] = [
    Law::DoubleNegation,
    Law::Idempotence,
    Law::Absorption,
    Law::Factoring,
    Law::Identity,
    Law::Domination,
    Law::NegationConstant,
    Law::Complement,
    Law::ImplicationConstant,
];

pub const STRUCTURE_LAWS: [Law; 4] = [Law::DeMorgan, Law::Commutativity, Law::Associativity, Law::Contraposition];

pub const EXPANSION_LAWS: [Law; 3] = [Law::DeMorganReverse, Law::Distributivity, Law::ImplicationIntroduction];

/// Simplifications tried when reducing to a constant, in order.
pub const REDUCE_SIMPLIFICATION_ORDER: [Law; 8] = [
    Law::Complement,
    Law::Domination,
    Law::Identity,
    Law::NegationConstant,
    Law::DoubleNegation,
    Law::Idempotence,
    Law::Absorption,
    Law::Factoring,
];

/// Laws that expose complements when reducing to a constant, in order.
pub const REDUCE_STRUCTURE_LAWS: [Law; 5] = [
    Law::Distributivity,
    Law::Associativity,
    Law::DeMorgan,
    Law::ImplicationElimination,
    Law::Commutativity,
];

/// Chance that an idle iteration tries a complexity-increasing law.
// TODO: tune against the policy once a trained pairwise model is available.
pub const EXPANSION_PROBABILITY: f64 = 0.1;

/// The proof technique an outcome was produced by.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Direct,
    Contrapositive,
    Absurdity,
    Bidirectional,
    Simplification,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Method::Direct => "direct",
            Method::Contrapositive => "contrapositive",
            Method::Absurdity => "absurdity",
            Method::Bidirectional => "bidirectional",
            Method::Simplification => "simplification",
        }
    }
}

/// One applied rewrite, with both expressions as they were after it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transformation {
    pub iteration: usize,
    pub target: Target,
    pub law: Law,
    /// The rewritten target expression.
    pub result: Expr,
    /// The rewritten sub-expression, `None` when the rewrite was at the root.
    pub subexpression: Option<Expr>,
    /// Whether the policy's proposal was used, as opposed to the fallback plan.
    pub policy_guided: bool,
    pub expr1: Expr,
    pub expr2: Expr,
}

/// Result of running one strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProofOutcome {
    pub method: Method,
    pub success: bool,
    /// Iterations spent. On success, the index of the iteration at which the goal held.
    pub iterations: usize,
    pub policy_steps: usize,
    pub final1: Expr,
    pub final2: Expr,
    pub transformations: Vec<Transformation>,
}

impl ProofOutcome {
    /// Number of rewrites actually applied.
    pub fn steps(&self) -> usize {
        self.transformations.len()
    }
}

/// What the loop is trying to reach, and which policy proposes rewrites on the way.
#[derive(Clone, Copy)]
pub enum Mode<'a> {
    /// Rewrite both expressions until they are syntactically equal.
    Meet(&'a dyn PairPolicy),
    /// Rewrite expression 1 until it is the given constant. Expression 2 is carried for display.
    Reduce(bool, &'a dyn SimplifyPolicy),
}

impl Mode<'_> {
    fn targets(&self) -> &'static [Target] {
        match self {
            Mode::Meet(_) => &Target::BOTH,
            Mode::Reduce(..) => &[Target::First],
        }
    }

    fn propose(&self, expr1: &Expr, expr2: &Expr) -> PairAction {
        match *self {
            Mode::Meet(policy) => policy.predict(&Features::pair(expr1, expr2)),
            Mode::Reduce(goal, policy) => PairAction::new(Target::First, policy.predict(&Features::single(expr1, goal))),
        }
    }

    /// Sites of `law` in `expr` the loop may rewrite.
    fn sites(&self, law: Law, expr: &Expr, seen: &HashSet<Expr>) -> Vec<Path> {
        let paths = law.find(expr);
        match *self {
            Mode::Meet(_) => paths,
            Mode::Reduce(goal, _) => paths
                .into_iter()
                .filter(|path| law != Law::Distributivity || distributes_towards(goal, expr, path))
                .filter(|path| !seen.contains(&law.apply_at(expr, path)))
                .collect(),
        }
    }
}

/// Whether distributing at `path` moves `expr` towards the normal form of `goal`.
fn distributes_towards(goal: bool, expr: &Expr, path: &[Side]) -> bool {
    match subexpr_at(expr, path) {
        Some(Expr::And(..)) => !goal,
        Some(Expr::Or(..)) => goal,
        _ => false,
    }
}

/// Per-run knobs.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SearchOptions {
    pub max_iterations: usize,
    /// Log each step at `info` instead of `debug`.
    pub verbose: bool,
}

impl SearchOptions {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::new(50)
    }
}

struct State {
    expr1: Expr,
    expr2: Expr,
    /// Every form of expression 1 so far. Only filled when reducing.
    seen: HashSet<Expr>,
}

impl State {
    fn get(&self, target: Target) -> &Expr {
        match target {
            Target::First => &self.expr1,
            Target::Second => &self.expr2,
        }
    }

    fn set(&mut self, target: Target, expr: Expr) {
        match target {
            Target::First => self.expr1 = expr,
            Target::Second => self.expr2 = expr,
        }
    }

    fn reached(&self, mode: &Mode<'_>) -> bool {
        match mode {
            Mode::Meet(_) => self.expr1 == self.expr2,
            Mode::Reduce(goal, _) => self.expr1.as_constant() == Some(*goal),
        }
    }
}

/// Picks a rewrite from the fallback plan.
fn fallback<R: Rng + ?Sized>(state: &State, targets: &[Target], rng: &mut R) -> Option<PairAction> {
    for law in SIMPLIFICATION_ORDER {
        for &target in targets {
            if law.applies_anywhere(state.get(target)) {
                trace!("fallback: simplification {} on expression {}", law, target);
                return Some(PairAction::new(target, law));
            }
        }
    }

    let applicable = |laws: &[Law]| -> Vec<PairAction> {
        laws.iter()
            .flat_map(|&law| targets.iter().map(move |&target| PairAction::new(target, law)))
            .filter(|a| a.law.applies_anywhere(state.get(a.target)))
            .collect()
    };

    if let Some(&action) = applicable(&STRUCTURE_LAWS).choose(rng) {
        trace!("fallback: structure {} on expression {}", action.law, action.target);
        return Some(action);
    }

    if rng.gen_bool(EXPANSION_PROBABILITY) {
        if let Some(&action) = applicable(&EXPANSION_LAWS).choose(rng) {
            trace!("fallback: expansion {} on expression {}", action.law, action.target);
            return Some(action);
        }
    }

    trace!("fallback: nothing to do");
    None
}

/// Picks a rewrite of expression 1 from the reduction plan, with its usable sites.
fn reduce_fallback(state: &State, mode: &Mode<'_>) -> Option<(PairAction, Vec<Path>)> {
    for law in REDUCE_SIMPLIFICATION_ORDER.into_iter().chain(REDUCE_STRUCTURE_LAWS) {
        let sites = mode.sites(law, &state.expr1, &state.seen);
        if !sites.is_empty() {
            trace!("reduce fallback: {} at {} sites", law, sites.len());
            return Some((PairAction::new(Target::First, law), sites));
        }
    }
    trace!("reduce fallback: every rewrite leads back to a visited state");
    None
}

/// Runs the rewrite loop from `(expr1, expr2)` until the goal of `mode` holds or the budget runs out.
pub fn run<R: Rng + ?Sized>(
    method: Method,
    expr1: Expr,
    expr2: Expr,
    mode: Mode<'_>,
    options: SearchOptions,
    rng: &mut R,
) -> ProofOutcome {
    let level = if options.verbose { Level::Info } else { Level::Debug };
    let targets = mode.targets();
    let mut state = State {
        expr1,
        expr2,
        seen: HashSet::new(),
    };
    let reducing = matches!(mode, Mode::Reduce(..));
    if reducing {
        state.seen.insert(state.expr1.clone());
    }
    let mut transformations = Vec::new();
    let mut policy_steps = 0;

    let finish = |state: State, success: bool, iterations: usize, transformations: Vec<Transformation>, policy_steps: usize| {
        info!(
            "{} {} after {} iterations ({} rewrites, {} by policy)",
            method.name(),
            if success { "succeeded" } else { "failed" },
            iterations,
            transformations.len(),
            policy_steps
        );
        ProofOutcome {
            method,
            success,
            iterations,
            policy_steps,
            final1: state.expr1,
            final2: state.expr2,
            transformations,
        }
    };

    for iteration in 0..options.max_iterations {
        if state.reached(&mode) {
            return finish(state, true, iteration, transformations, policy_steps);
        }

        let proposal = mode.propose(&state.expr1, &state.expr2);
        debug!("[{}] policy proposes {} on expression {}", iteration, proposal.law, proposal.target);

        let proposal_paths = if targets.contains(&proposal.target) {
            mode.sites(proposal.law, state.get(proposal.target), &state.seen)
        } else {
            Vec::new()
        };

        let planned = if !proposal_paths.is_empty() {
            Some((proposal, proposal_paths, true))
        } else if reducing {
            reduce_fallback(&state, &mode).map(|(action, paths)| (action, paths, false))
        } else {
            fallback(&state, targets, rng).map(|action| (action, action.law.find(state.get(action.target)), false))
        };
        let Some((action, paths, policy_guided)) = planned else {
            continue;
        };

        let Some(path) = paths.choose(rng) else {
            continue;
        };
        let current = state.get(action.target);
        let subexpression = if path.is_empty() {
            None
        } else {
            subexpr_at(current, path).cloned()
        };
        let result = action.law.apply_at(current, path);

        log!(
            level,
            "[{}] {} on expression {}{}: {}",
            iteration,
            action.law,
            action.target,
            if policy_guided { " (policy)" } else { "" },
            result
        );

        if policy_guided {
            policy_steps += 1;
        }
        if reducing {
            state.seen.insert(result.clone());
        }
        state.set(action.target, result.clone());
        transformations.push(Transformation {
            iteration,
            target: action.target,
            law: action.law,
            result,
            subexpression,
            policy_guided,
            expr1: state.expr1.clone(),
            expr2: state.expr2.clone(),
        });
    }

    let success = state.reached(&mode);
    finish(state, success, options.max_iterations, transformations, policy_steps)
}
