//! Top-level entry point: text in, proof report out.

use std::fmt;
use std::str::FromStr;

use log::info;
use rand::Rng;
use serde::Serialize;

use crate::engine::Engine;
use crate::error::ProverError;
use crate::expr::{are_equal, Expr};
use crate::optimize::Optimization;
use crate::parser::parse;
use crate::search::{Method, SearchOptions, Transformation};
use crate::verify::{check_equivalence_in, truth_table, variable_count, TruthTable, MAX_VARIABLES};

/// Largest accepted iteration budget.
pub const MAX_ITERATIONS: usize = 500;

/// Proof strategy selector.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Direct, then Contrapositive, then Absurdity.
    #[default]
    Automatic,
    Direct,
    Contrapositive,
    Absurd,
    Bidirectional,
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Automatic => "automatic",
            Strategy::Direct => "direct",
            Strategy::Contrapositive => "contrapositive",
            Strategy::Absurd => "absurd",
            Strategy::Bidirectional => "bidirectional",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = ProverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "automatic" => Ok(Strategy::Automatic),
            "direct" => Ok(Strategy::Direct),
            "contrapositive" => Ok(Strategy::Contrapositive),
            "absurd" => Ok(Strategy::Absurd),
            "bidirectional" => Ok(Strategy::Bidirectional),
            other => Err(ProverError::InvalidStrategy(other.to_string())),
        }
    }
}

/// Configuration of [`Prover::prove`].
#[derive(Debug, Clone)]
pub struct ProverConfig {
    /// Which strategy to run.
    ///
    /// Default: [`Strategy::Automatic`].
    pub strategy: Strategy,

    /// Iteration budget per strategy run, between 1 and [`MAX_ITERATIONS`].
    ///
    /// Default: `50`.
    pub max_iterations: usize,

    /// Log every rewrite at `info` level.
    ///
    /// Default: `false`.
    pub verbose: bool,

    /// Attach the full truth table of both inputs to the report.
    ///
    /// Default: `false`.
    pub truth_table: bool,

    /// Search the successful proof for shortcuts.
    ///
    /// Default: `false`.
    pub optimize: bool,

    /// Iteration budget per shortcut search.
    ///
    /// Default: `15`.
    pub optimize_iterations: usize,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            max_iterations: 50,
            verbose: false,
            truth_table: false,
            optimize: false,
            optimize_iterations: 15,
        }
    }
}

impl ProverConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_truth_table(mut self, truth_table: bool) -> Self {
        self.truth_table = truth_table;
        self
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn with_optimize_iterations(mut self, optimize_iterations: usize) -> Self {
        self.optimize_iterations = optimize_iterations;
        self
    }

    pub fn validate(&self) -> Result<(), ProverError> {
        if !(1..=MAX_ITERATIONS).contains(&self.max_iterations) {
            return Err(ProverError::InvalidIterations {
                value: self.max_iterations,
                max: MAX_ITERATIONS,
            });
        }
        Ok(())
    }

    fn search_options(&self) -> SearchOptions {
        SearchOptions::new(self.max_iterations).verbose(self.verbose)
    }
}

/// How a report's verdict was reached.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodUsed {
    /// The truth table showed the inputs differ; no rewriting was attempted.
    SemanticVerification,
    /// The inputs were already syntactically equal.
    SyntacticEquality,
    Direct,
    Contrapositive,
    Absurdity,
    Bidirectional,
    /// Every strategy ran out of iterations.
    AllFailed,
}

impl From<Method> for MethodUsed {
    fn from(method: Method) -> Self {
        match method {
            Method::Direct | Method::Simplification => MethodUsed::Direct,
            Method::Contrapositive => MethodUsed::Contrapositive,
            Method::Absurdity => MethodUsed::Absurdity,
            Method::Bidirectional => MethodUsed::Bidirectional,
        }
    }
}

/// Everything known about one proof request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProofReport {
    /// Whether the request was answered: a proof was found or non-equivalence was shown.
    pub success: bool,
    pub equivalent: bool,
    pub method_used: MethodUsed,
    pub strategy: Strategy,
    pub iterations: usize,
    pub policy_steps: usize,
    pub initial1: Expr,
    pub initial2: Expr,
    pub final1: Expr,
    pub final2: Expr,
    pub transformations: Vec<Transformation>,
    pub truth_table: Option<TruthTable>,
    pub optimization: Option<Optimization>,
    pub message: String,
}

impl ProofReport {
    fn trivial(
        equivalent: bool,
        method_used: MethodUsed,
        strategy: Strategy,
        e1: Expr,
        e2: Expr,
        truth_table: Option<TruthTable>,
        message: String,
    ) -> Self {
        Self {
            success: true,
            equivalent,
            method_used,
            strategy,
            iterations: 0,
            policy_steps: 0,
            final1: e1.clone(),
            final2: e2.clone(),
            initial1: e1,
            initial2: e2,
            transformations: Vec::new(),
            truth_table,
            optimization: None,
            message,
        }
    }
}

/// Parses, verifies and proves pairs of expressions with one [`Engine`].
#[derive(Default)]
pub struct Prover {
    engine: Engine,
}

impl Prover {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Proves `text1` equivalent to `text2`.
    ///
    /// Inputs that are not semantically equivalent are reported as such without any rewriting.
    /// A failed search is a report with `success == false`, not an error. Inputs with more than
    /// [`MAX_VARIABLES`] distinct variables are rejected before any enumeration.
    pub fn prove<R: Rng + ?Sized>(
        &self,
        text1: &str,
        text2: &str,
        config: &ProverConfig,
        rng: &mut R,
    ) -> Result<ProofReport, ProverError> {
        config.validate()?;
        let (e1, t1) = parse(text1).map_err(|source| ProverError::Parse { which: 1, source })?;
        let (e2, t2) = parse(text2).map_err(|source| ProverError::Parse { which: 2, source })?;

        let count = variable_count(&e1, &e2);
        if count > MAX_VARIABLES {
            return Err(ProverError::TooManyVariables {
                count,
                max: MAX_VARIABLES,
            });
        }

        let table = config.truth_table.then(|| truth_table(&e1, &e2));

        let verdict = check_equivalence_in(&e1, &t1, &e2, &t2);
        if !verdict.equivalent {
            info!("{} and {} are not equivalent", e1, e2);
            let message = format!("{} and {} are not equivalent", e1, e2);
            return Ok(ProofReport::trivial(
                false,
                MethodUsed::SemanticVerification,
                config.strategy,
                e1,
                e2,
                table,
                message,
            ));
        }

        if are_equal(&e1, &e2) {
            let message = "The expressions are syntactically identical".to_string();
            return Ok(ProofReport::trivial(
                true,
                MethodUsed::SyntacticEquality,
                config.strategy,
                e1,
                e2,
                table,
                message,
            ));
        }

        Ok(self.prove_equivalent(e1, e2, table, config, rng))
    }

    /// Runs the configured strategy on two expressions already known to be equivalent.
    fn prove_equivalent<R: Rng + ?Sized>(
        &self,
        e1: Expr,
        e2: Expr,
        table: Option<TruthTable>,
        config: &ProverConfig,
        rng: &mut R,
    ) -> ProofReport {
        let options = config.search_options();
        info!("proving {} == {} with strategy {}", e1, e2, config.strategy);

        let (proof, iterations, method_used) = match config.strategy {
            Strategy::Automatic => {
                let report = self.engine.prove_with_fallback(&e1, &e2, options, rng);
                let method_used = report.method.map_or(MethodUsed::AllFailed, MethodUsed::from);
                (report.last, report.total_iterations, method_used)
            }
            strategy => {
                let method = match strategy {
                    Strategy::Contrapositive => Method::Contrapositive,
                    Strategy::Absurd => Method::Absurdity,
                    Strategy::Bidirectional => Method::Bidirectional,
                    _ => Method::Direct,
                };
                let proof = self.engine.prove_with(method, &e1, &e2, options, rng);
                let iterations = proof.iterations;
                (proof, iterations, MethodUsed::from(method))
            }
        };

        let optimization = (config.optimize && proof.success).then(|| {
            let optimize_options = SearchOptions::new(config.optimize_iterations).verbose(config.verbose);
            self.engine.optimize_proof(&proof, &e1, optimize_options, rng)
        });

        let message = if proof.success {
            format!("Proved by {} in {} steps", proof.method.name(), proof.steps())
        } else {
            format!(
                "The expressions are equivalent, but no proof was found within {} iterations",
                config.max_iterations
            )
        };

        ProofReport {
            success: proof.success,
            equivalent: true,
            method_used,
            strategy: config.strategy,
            iterations,
            policy_steps: proof.policy_steps,
            initial1: e1,
            initial2: e2,
            final1: proof.final1,
            final2: proof.final2,
            transformations: proof.transformations,
            truth_table: table,
            optimization,
            message,
        }
    }
}
