//! Rewrite policies.
//!
//! A policy looks at a feature vector and proposes the next rewrite. The engine treats a proposal
//! as advice only: when the proposed law does not apply anywhere in its target, the engine falls
//! back to its own priority plan.
//!
//! Policies are classifiers over a fixed set of classes. The class tables below are a stable
//! contract between trained models and the engine:
//!
//! - pairwise policies have [`PAIR_CLASSES`] classes, see [`PairAction::from_class`];
//! - single-expression policies have [`SIMPLIFY_CLASSES`] classes, see [`Law::from_simplify_class`].

use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ProverError;
use crate::features::{Features, Layout, PAIR_WIDTH, SINGLE_WIDTH};
use crate::laws::Law;

/// Which of the two expressions of a proof state a rewrite acts on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Target {
    First,
    Second,
}

impl Target {
    /// 1 or 2.
    pub fn number(self) -> usize {
        match self {
            Target::First => 1,
            Target::Second => 2,
        }
    }

    pub const BOTH: [Target; 2] = [Target::First, Target::Second];
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.number() as u64)
    }
}

/// A proposed rewrite of one expression of a pair.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct PairAction {
    pub target: Target,
    pub law: Law,
}

pub const PAIR_CLASSES: usize = 34;
pub const SIMPLIFY_CLASSES: usize = 17;

/// Laws of the first twelve pairwise classes: index `i` on target 1, index `i + 6` on target 2.
const PAIR_LEADING: [Law; 6] = [
    Law::DoubleNegation,
    Law::Idempotence,
    Law::Absorption,
    Law::ImplicationElimination,
    Law::DeMorgan,
    Law::Commutativity,
];

/// Laws of the remaining pairwise classes: `12 + 2k` on target 1, `13 + 2k` on target 2.
const PAIR_TRAILING: [Law; 11] = [
    Law::ImplicationIntroduction,
    Law::Contraposition,
    Law::DeMorganReverse,
    Law::Distributivity,
    Law::Complement,
    Law::Identity,
    Law::Domination,
    Law::NegationConstant,
    Law::ImplicationConstant,
    Law::Factoring,
    Law::Associativity,
];

const SIMPLIFY_TABLE: [Law; SIMPLIFY_CLASSES] = [
    Law::Complement,
    Law::Domination,
    Law::Identity,
    Law::NegationConstant,
    Law::Distributivity,
    Law::Factoring,
    Law::Associativity,
    Law::DoubleNegation,
    Law::DeMorgan,
    Law::Idempotence,
    Law::Absorption,
    Law::ImplicationElimination,
    Law::ImplicationConstant,
    Law::Commutativity,
    Law::Contraposition,
    Law::ImplicationIntroduction,
    Law::DeMorganReverse,
];

impl PairAction {
    pub fn new(target: Target, law: Law) -> Self {
        Self { target, law }
    }

    /// Decodes a pairwise class index. Unknown indices decode to `(1, double_negation)`.
    pub fn from_class(class: usize) -> Self {
        let (target, law) = match class {
            0..=5 => (Target::First, PAIR_LEADING[class]),
            6..=11 => (Target::Second, PAIR_LEADING[class - 6]),
            12..=33 => {
                let k = (class - 12) / 2;
                let target = if class % 2 == 0 { Target::First } else { Target::Second };
                (target, PAIR_TRAILING[k])
            }
            _ => {
                warn!("unknown pairwise class {}, using double_negation on expression 1", class);
                (Target::First, Law::DoubleNegation)
            }
        };
        Self { target, law }
    }

    /// Encodes the action as a pairwise class index.
    pub fn to_class(self) -> usize {
        if let Some(i) = PAIR_LEADING.iter().position(|&l| l == self.law) {
            return match self.target {
                Target::First => i,
                Target::Second => i + 6,
            };
        }
        // Every law is in exactly one of the two tables.
        let k = PAIR_TRAILING.iter().position(|&l| l == self.law).unwrap_or_default();
        match self.target {
            Target::First => 12 + 2 * k,
            Target::Second => 13 + 2 * k,
        }
    }
}

impl Law {
    /// Decodes a single-expression class index. Unknown indices decode to `complement`.
    pub fn from_simplify_class(class: usize) -> Law {
        SIMPLIFY_TABLE.get(class).copied().unwrap_or_else(|| {
            warn!("unknown simplification class {}, using complement", class);
            Law::Complement
        })
    }

    /// Encodes the law as a single-expression class index.
    pub fn simplify_class(self) -> usize {
        SIMPLIFY_TABLE.iter().position(|&l| l == self).unwrap_or_default()
    }
}

/// Proposes rewrites for a pair of expressions.
pub trait PairPolicy: Send + Sync {
    /// Must be free of side effects: equal features give equal proposals.
    fn predict(&self, features: &Features) -> PairAction;

    /// The feature layout the policy was built for, when it reads the raw vector.
    fn expected_layout(&self) -> Option<Layout> {
        None
    }
}

/// Proposes rewrites for a single expression being reduced to a constant.
pub trait SimplifyPolicy: Send + Sync {
    fn predict(&self, features: &Features) -> Law;

    fn expected_layout(&self) -> Option<Layout> {
        None
    }
}

impl<P: PairPolicy + ?Sized> PairPolicy for Box<P> {
    fn predict(&self, features: &Features) -> PairAction {
        (**self).predict(features)
    }

    fn expected_layout(&self) -> Option<Layout> {
        (**self).expected_layout()
    }
}

impl<P: SimplifyPolicy + ?Sized> SimplifyPolicy for Box<P> {
    fn predict(&self, features: &Features) -> Law {
        (**self).predict(features)
    }

    fn expected_layout(&self) -> Option<Layout> {
        (**self).expected_layout()
    }
}

/// Laws [`PriorityPolicy`] proposes on pairs, most preferred first.
pub const PAIR_PRIORITY: [Law; 11] = [
    Law::DoubleNegation,
    Law::Complement,
    Law::NegationConstant,
    Law::Identity,
    Law::Domination,
    Law::ImplicationConstant,
    Law::Idempotence,
    Law::Absorption,
    Law::Factoring,
    Law::ImplicationElimination,
    Law::DeMorgan,
];

/// Laws [`PriorityPolicy`] proposes on single expressions, most preferred first.
pub const SIMPLIFY_PRIORITY: [Law; 11] = [
    Law::Complement,
    Law::Domination,
    Law::Identity,
    Law::NegationConstant,
    Law::DoubleNegation,
    Law::Idempotence,
    Law::Absorption,
    Law::Factoring,
    Law::ImplicationConstant,
    Law::ImplicationElimination,
    Law::DeMorgan,
];

/// Deterministic policy driven by the applicability bits.
///
/// Proposes the first law of its priority list that applies. On pairs, when both expressions
/// qualify, the one with more nodes is rewritten (the first on ties). When nothing on the list
/// applies, the proposal is a law known not to apply, which hands the step to the engine's
/// randomized structural fallback.
#[derive(Debug, Clone, Default)]
pub struct PriorityPolicy;

impl PriorityPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl PairPolicy for PriorityPolicy {
    fn predict(&self, features: &Features) -> PairAction {
        let size = |t| features.structural(t).map_or(0.0, |s| s[1]);
        let (preferred, other) = if size(Target::Second) > size(Target::First) {
            (Target::Second, Target::First)
        } else {
            (Target::First, Target::Second)
        };

        for law in PAIR_PRIORITY {
            for target in [preferred, other] {
                if features.applicable(target, law) {
                    return PairAction::new(target, law);
                }
            }
        }
        PairAction::new(Target::First, PAIR_PRIORITY[0])
    }
}

impl SimplifyPolicy for PriorityPolicy {
    fn predict(&self, features: &Features) -> Law {
        SIMPLIFY_PRIORITY
            .into_iter()
            .find(|&law| features.applicable(Target::First, law))
            .unwrap_or(SIMPLIFY_PRIORITY[0])
    }
}

/// Weights and biases of a linear classifier, as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// One row of input weights per class.
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

impl LinearModel {
    /// Checks the model shape against `classes` outputs over `width` inputs.
    pub fn validate(&self, classes: usize, width: usize) -> Result<(), ProverError> {
        if self.weights.len() != classes || self.bias.len() != classes {
            return Err(ProverError::PolicyModel(format!(
                "expected {} classes, found {} weight rows and {} biases",
                classes,
                self.weights.len(),
                self.bias.len()
            )));
        }
        if let Some((class, row)) = self.weights.iter().enumerate().find(|(_, row)| row.len() != width) {
            return Err(ProverError::PolicyModel(format!(
                "class {} expects {} features, the layout has {}",
                class,
                row.len(),
                width
            )));
        }
        Ok(())
    }

    /// Index of the highest-scoring class. The first class wins ties.
    pub fn argmax(&self, input: &[f64]) -> usize {
        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (class, (row, bias)) in self.weights.iter().zip(&self.bias).enumerate() {
            let score = bias + row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>();
            if score > best_score {
                best = class;
                best_score = score;
            }
        }
        best
    }
}

/// Pre-trained linear classifier over feature vectors.
///
/// The same type serves as a pairwise policy (loaded with [`LinearPolicy::pair_from_json`]) or
/// as a single-expression policy ([`LinearPolicy::simplify_from_json`]).
#[derive(Debug, Clone)]
pub struct LinearPolicy {
    model: LinearModel,
    layout: Layout,
}

impl LinearPolicy {
    /// Wraps a pairwise model: [`PAIR_CLASSES`] classes over [`PAIR_WIDTH`] inputs.
    pub fn pair(model: LinearModel) -> Result<Self, ProverError> {
        model.validate(PAIR_CLASSES, PAIR_WIDTH)?;
        Ok(Self {
            model,
            layout: Layout::Pair,
        })
    }

    /// Wraps a single-expression model: [`SIMPLIFY_CLASSES`] classes over [`SINGLE_WIDTH`] inputs.
    pub fn simplify(model: LinearModel) -> Result<Self, ProverError> {
        model.validate(SIMPLIFY_CLASSES, SINGLE_WIDTH)?;
        Ok(Self {
            model,
            layout: Layout::Single,
        })
    }

    pub fn pair_from_json(json: &str) -> Result<Self, ProverError> {
        Self::pair(serde_json::from_str(json)?)
    }

    pub fn simplify_from_json(json: &str) -> Result<Self, ProverError> {
        Self::simplify(serde_json::from_str(json)?)
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    fn classify(&self, features: &Features) -> usize {
        debug_assert_eq!(features.layout(), self.layout, "feature layout mismatch");
        self.model.argmax(features.as_slice())
    }
}

impl PairPolicy for LinearPolicy {
    fn predict(&self, features: &Features) -> PairAction {
        PairAction::from_class(self.classify(features))
    }

    fn expected_layout(&self) -> Option<Layout> {
        Some(self.layout)
    }
}

impl SimplifyPolicy for LinearPolicy {
    fn predict(&self, features: &Features) -> Law {
        Law::from_simplify_class(self.classify(features))
    }

    fn expected_layout(&self) -> Option<Layout> {
        Some(self.layout)
    }
}
