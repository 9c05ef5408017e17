//! Propositional equivalence laws.
//!
//! Each [`Law`] has a root-level pattern check and a rewrite. Both look at the root of the given
//! expression only; use [`Law::find`] and [`Law::apply_at`] to act on sub-expressions.
//!
//! | Law                        | Rewrite                                            |
//! |----------------------------|----------------------------------------------------|
//! | `double_negation`          | `¬¬p → p`                                          |
//! | `idempotence`              | `p ∧ p → p`, `p ∨ p → p`                           |
//! | `absorption`               | `p ∧ (p ∨ q) → p`, `p ∨ (p ∧ q) → p`               |
//! | `factoring`                | `(p ∧ q) ∨ (p ∧ r) → p ∧ (q ∨ r)` and its dual     |
//! | `identity`                 | `p ∧ T → p`, `p ∨ F → p`                           |
//! | `domination`               | `p ∨ T → T`, `p ∧ F → F`                           |
//! | `negation_constant`        | `¬T → F`, `¬F → T`                                 |
//! | `complement`               | `p ∨ ¬p → T`, `p ∧ ¬p → F`                         |
//! | `implication_constant`     | `T→p → p`, `F→p → T`, `p→T → T`, `p→F → ¬p`        |
//! | `de_morgan`                | `¬(p ∧ q) → ¬p ∨ ¬q` and its dual                  |
//! | `commutativity`            | `p ∘ q → q ∘ p`                                    |
//! | `associativity`            | `(p ∘ q) ∘ r ↔ p ∘ (q ∘ r)`                        |
//! | `implication_elimination`  | `p → q ⟶ ¬p ∨ q`                                   |
//! | `implication_introduction` | `¬p ∨ q ⟶ p → q`                                   |
//! | `contraposition`           | `p → q ⟶ ¬q → ¬p`                                  |
//! | `de_morgan_reverse`        | `p ∨ q → ¬(¬p ∧ ¬q)` and its dual                  |
//! | `distributivity`           | `p ∧ (q ∨ r) → (p ∧ q) ∨ (p ∧ r)` and its dual     |

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::expr::{BinOp, Expr};
use crate::paths::{any_applicable, apply_at_path, find_applicable_paths, Path, Side};

/// How a law changes expression size. Drives the engine's fallback plan.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LawKind {
    /// Never grows the expression.
    Simplification,
    /// Reshapes without changing size much.
    Structure,
    /// Grows the expression.
    Expansion,
    /// Rewrites implications into disjunctions. Only ever proposed by a policy.
    Conversion,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Law {
    DoubleNegation,
    Idempotence,
    Absorption,
    Factoring,
    Identity,
    Domination,
    NegationConstant,
    Complement,
    ImplicationConstant,
    DeMorgan,
    Commutativity,
    Associativity,
    ImplicationElimination,
    ImplicationIntroduction,
    Contraposition,
    DeMorganReverse,
    Distributivity,
}

impl Law {
    /// All laws, in feature-vector order.
    pub const ALL: [Law; 17] = [
        Law::DoubleNegation,
        Law::Idempotence,
        Law::Absorption,
        Law::Factoring,
        Law::Identity,
        Law::Domination,
        Law::NegationConstant,
        Law::Complement,
        Law::ImplicationConstant,
        Law::DeMorgan,
        Law::Commutativity,
        Law::Associativity,
        Law::ImplicationElimination,
        Law::ImplicationIntroduction,
        Law::Contraposition,
        Law::DeMorganReverse,
        Law::Distributivity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Law::DoubleNegation => "double_negation",
            Law::Idempotence => "idempotence",
            Law::Absorption => "absorption",
            Law::Factoring => "factoring",
            Law::Identity => "identity",
            Law::Domination => "domination",
            Law::NegationConstant => "negation_constant",
            Law::Complement => "complement",
            Law::ImplicationConstant => "implication_constant",
            Law::DeMorgan => "de_morgan",
            Law::Commutativity => "commutativity",
            Law::Associativity => "associativity",
            Law::ImplicationElimination => "implication_elimination",
            Law::ImplicationIntroduction => "implication_introduction",
            Law::Contraposition => "contraposition",
            Law::DeMorganReverse => "de_morgan_reverse",
            Law::Distributivity => "distributivity",
        }
    }

    pub fn from_name(name: &str) -> Option<Law> {
        Law::ALL.into_iter().find(|law| law.name() == name)
    }

    /// Position in [`Law::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn kind(self) -> LawKind {
        match self {
            Law::DoubleNegation
            | Law::Idempotence
            | Law::Absorption
            | Law::Factoring
            | Law::Identity
            | Law::Domination
            | Law::NegationConstant
            | Law::Complement
            | Law::ImplicationConstant => LawKind::Simplification,
            Law::DeMorgan | Law::Commutativity | Law::Associativity | Law::Contraposition => LawKind::Structure,
            Law::DeMorganReverse | Law::Distributivity | Law::ImplicationIntroduction => LawKind::Expansion,
            Law::ImplicationElimination => LawKind::Conversion,
        }
    }

    /// Whether the law matches at the root of `expr`.
    pub fn check(self, expr: &Expr) -> bool {
        match self {
            Law::DoubleNegation => matches!(expr, Expr::Not(inner) if matches!(**inner, Expr::Not(_))),
            Law::Idempotence => matches!(expr.as_binary(), Some((op, l, r)) if op.is_lattice() && l == r),
            Law::Absorption => absorption_survivor(expr).is_some(),
            Law::Factoring => common_factor(expr).is_some(),
            Law::Identity => identity_survivor(expr).is_some(),
            Law::Domination => domination_result(expr).is_some(),
            Law::NegationConstant => matches!(expr, Expr::Not(inner) if inner.is_constant()),
            Law::Complement => complement_result(expr).is_some(),
            Law::ImplicationConstant => matches!(expr, Expr::Implies(l, r) if l.is_constant() || r.is_constant()),
            Law::DeMorgan => matches!(expr, Expr::Not(inner) if matches!(**inner, Expr::And(..) | Expr::Or(..))),
            Law::Commutativity => matches!(expr, Expr::And(..) | Expr::Or(..)),
            Law::Associativity => associativity_rotation(expr).is_some(),
            Law::ImplicationElimination => matches!(expr, Expr::Implies(..)),
            Law::ImplicationIntroduction => matches!(expr, Expr::Or(l, _) if matches!(**l, Expr::Not(_))),
            Law::Contraposition => matches!(expr, Expr::Implies(..)),
            Law::DeMorganReverse => matches!(expr, Expr::And(..) | Expr::Or(..)),
            Law::Distributivity => distributivity_split(expr).is_some(),
        }
    }

    /// Rewrites the root of `expr`, or returns `None` when the law does not match.
    pub fn rewrite(self, expr: &Expr) -> Option<Expr> {
        match self {
            Law::DoubleNegation => match expr {
                Expr::Not(inner) => match &**inner {
                    Expr::Not(x) => Some((**x).clone()),
                    _ => None,
                },
                _ => None,
            },
            Law::Idempotence => match expr.as_binary() {
                Some((op, l, r)) if op.is_lattice() && l == r => Some((**l).clone()),
                _ => None,
            },
            Law::Absorption => absorption_survivor(expr).map(|e| (**e).clone()),
            Law::Factoring => common_factor(expr).map(|f| {
                Expr::binary(f.inner_op, Arc::clone(f.common), Expr::binary(f.outer_op, Arc::clone(f.rest1), Arc::clone(f.rest2)))
            }),
            Law::Identity => identity_survivor(expr).map(|e| (**e).clone()),
            Law::Domination => domination_result(expr).map(Expr::Const),
            Law::NegationConstant => match expr {
                Expr::Not(inner) => inner.as_constant().map(|v| Expr::Const(!v)),
                _ => None,
            },
            Law::Complement => complement_result(expr).map(Expr::Const),
            Law::ImplicationConstant => match expr {
                Expr::Implies(l, r) => match (l.as_constant(), r.as_constant()) {
                    (Some(true), _) => Some((**r).clone()),
                    (Some(false), _) => Some(Expr::tt()),
                    (None, Some(true)) => Some(Expr::tt()),
                    (None, Some(false)) => Some(Expr::not(Arc::clone(l))),
                    (None, None) => None,
                },
                _ => None,
            },
            Law::DeMorgan => match expr {
                Expr::Not(inner) => match &**inner {
                    Expr::And(l, r) => Some(Expr::or(Expr::not(Arc::clone(l)), Expr::not(Arc::clone(r)))),
                    Expr::Or(l, r) => Some(Expr::and(Expr::not(Arc::clone(l)), Expr::not(Arc::clone(r)))),
                    _ => None,
                },
                _ => None,
            },
            Law::Commutativity => match expr {
                Expr::And(l, r) => Some(Expr::And(Arc::clone(r), Arc::clone(l))),
                Expr::Or(l, r) => Some(Expr::Or(Arc::clone(r), Arc::clone(l))),
                _ => None,
            },
            Law::Associativity => associativity_rotation(expr),
            Law::ImplicationElimination => match expr {
                Expr::Implies(l, r) => Some(Expr::or(Expr::not(Arc::clone(l)), Arc::clone(r))),
                _ => None,
            },
            Law::ImplicationIntroduction => match expr {
                Expr::Or(l, r) => l.as_negation().map(|p| Expr::Implies(Arc::clone(p), Arc::clone(r))),
                _ => None,
            },
            Law::Contraposition => match expr {
                Expr::Implies(l, r) => Some(Expr::implies(Expr::not(Arc::clone(r)), Expr::not(Arc::clone(l)))),
                _ => None,
            },
            Law::DeMorganReverse => match expr {
                Expr::Or(l, r) => Some(Expr::not(Expr::and(Expr::not(Arc::clone(l)), Expr::not(Arc::clone(r))))),
                Expr::And(l, r) => Some(Expr::not(Expr::or(Expr::not(Arc::clone(l)), Expr::not(Arc::clone(r))))),
                _ => None,
            },
            Law::Distributivity => distributivity_split(expr).map(|d| {
                Expr::binary(
                    d.inner_op,
                    Expr::binary(d.outer_op, Arc::clone(d.x), Arc::clone(d.y)),
                    Expr::binary(d.outer_op, Arc::clone(d.x), Arc::clone(d.z)),
                )
            }),
        }
    }

    /// Rewrites the root of `expr`. Returns an unchanged copy when the law does not match.
    pub fn apply(self, expr: &Expr) -> Expr {
        self.rewrite(expr).unwrap_or_else(|| expr.clone())
    }

    /// Paths of every sub-expression the law matches, in pre-order.
    pub fn find(self, expr: &Expr) -> Vec<Path> {
        find_applicable_paths(expr, |e| self.check(e))
    }

    /// Whether the law matches anywhere in `expr`.
    pub fn applies_anywhere(self, expr: &Expr) -> bool {
        any_applicable(expr, |e| self.check(e))
    }

    /// Rewrites the sub-expression at `path`, sharing everything off the path.
    ///
    /// # Panics
    ///
    /// Panics if the law does not match at `path`. Callers obtain paths from [`Law::find`].
    pub fn apply_at(self, expr: &Expr, path: &[Side]) -> Expr {
        apply_at_path(expr, path, |sub| {
            assert!(self.check(sub), "{} does not apply to {}", self, sub);
            self.apply(sub)
        })
    }
}

impl fmt::Display for Law {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Law {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Law::from_name(s).ok_or_else(|| format!("unknown law '{}'", s))
    }
}

/// `p ∧ (p ∨ q)` and friends: the operand that survives absorption.
fn absorption_survivor(expr: &Expr) -> Option<&Arc<Expr>> {
    let (op, l, r) = expr.as_binary()?;
    let dual = op.dual()?;
    let contains = |side: &Expr, x: &Arc<Expr>| match side.as_binary() {
        Some((inner, a, b)) if inner == dual => a == x || b == x,
        _ => false,
    };
    if contains(&**r, l) {
        Some(l)
    } else if contains(&**l, r) {
        Some(r)
    } else {
        None
    }
}

struct Factor<'a> {
    outer_op: BinOp,
    inner_op: BinOp,
    common: &'a Arc<Expr>,
    rest1: &'a Arc<Expr>,
    rest2: &'a Arc<Expr>,
}

/// `(p ∧ q) ∨ (p ∧ r)`: both sides share an operand under the dual connective.
fn common_factor(expr: &Expr) -> Option<Factor<'_>> {
    let (outer_op, l, r) = expr.as_binary()?;
    let inner_op = outer_op.dual()?;
    let (lop, ll, lr) = l.as_binary()?;
    let (rop, rl, rr) = r.as_binary()?;
    if lop != inner_op || rop != inner_op {
        return None;
    }
    let (common, rest1, rest2) = if ll == rl {
        (ll, lr, rr)
    } else if ll == rr {
        (ll, lr, rl)
    } else if lr == rl {
        (lr, ll, rr)
    } else if lr == rr {
        (lr, ll, rl)
    } else {
        return None;
    };
    Some(Factor {
        outer_op,
        inner_op,
        common,
        rest1,
        rest2,
    })
}

/// `p ∧ T`, `T ∧ p`, `p ∨ F`, `F ∨ p`: the non-constant operand.
fn identity_survivor(expr: &Expr) -> Option<&Arc<Expr>> {
    let (neutral, l, r) = match expr {
        Expr::And(l, r) => (true, l, r),
        Expr::Or(l, r) => (false, l, r),
        _ => return None,
    };
    if r.as_constant() == Some(neutral) {
        Some(l)
    } else if l.as_constant() == Some(neutral) {
        Some(r)
    } else {
        None
    }
}

/// `p ∨ T → T`, `p ∧ F → F`.
fn domination_result(expr: &Expr) -> Option<bool> {
    let (dominant, l, r) = match expr {
        Expr::And(l, r) => (false, l, r),
        Expr::Or(l, r) => (true, l, r),
        _ => return None,
    };
    (l.as_constant() == Some(dominant) || r.as_constant() == Some(dominant)).then_some(dominant)
}

/// `p ∨ ¬p → T`, `p ∧ ¬p → F`, either operand order.
fn complement_result(expr: &Expr) -> Option<bool> {
    let (value, l, r) = match expr {
        Expr::And(l, r) => (false, l, r),
        Expr::Or(l, r) => (true, l, r),
        _ => return None,
    };
    let negates = |n: &Expr, x: &Arc<Expr>| n.as_negation().is_some_and(|inner| inner == x);
    (negates(&**r, l) || negates(&**l, r)).then_some(value)
}

/// Left-nested groups rotate right; otherwise right-nested groups rotate left.
fn associativity_rotation(expr: &Expr) -> Option<Expr> {
    let (op, l, r) = expr.as_binary()?;
    if !op.is_lattice() {
        return None;
    }
    if let Some((lop, a, b)) = l.as_binary() {
        if lop == op {
            return Some(Expr::binary(op, Arc::clone(a), Expr::binary(op, Arc::clone(b), Arc::clone(r))));
        }
    }
    if let Some((rop, b, c)) = r.as_binary() {
        if rop == op {
            return Some(Expr::binary(op, Expr::binary(op, Arc::clone(l), Arc::clone(b)), Arc::clone(c)));
        }
    }
    None
}

struct Distribution<'a> {
    outer_op: BinOp,
    inner_op: BinOp,
    x: &'a Arc<Expr>,
    y: &'a Arc<Expr>,
    z: &'a Arc<Expr>,
}

/// `x ∘ (y • z)` or `(y • z) ∘ x` where `•` is the dual of `∘`. The right group is preferred.
/// The rewrite always puts `x` first: `(x ∘ y) • (x ∘ z)`.
fn distributivity_split(expr: &Expr) -> Option<Distribution<'_>> {
    let (outer_op, l, r) = expr.as_binary()?;
    let inner_op = outer_op.dual()?;
    if let Some((rop, y, z)) = r.as_binary() {
        if rop == inner_op {
            return Some(Distribution {
                outer_op,
                inner_op,
                x: l,
                y,
                z,
            });
        }
    }
    if let Some((lop, y, z)) = l.as_binary() {
        if lop == inner_op {
            return Some(Distribution {
                outer_op,
                inner_op,
                x: r,
                y,
                z,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::semantically_equivalent;
    use test_log::test;

    fn e(s: &str) -> Expr {
        s.parse().unwrap()
    }

    fn rewrites(law: Law, input: &str, expected: &str) {
        let before = e(input);
        assert!(law.check(&before), "{} should match {}", law, before);
        let after = law.apply(&before);
        assert_eq!(after.to_string(), expected, "{} on {}", law, before);
        assert!(semantically_equivalent(&before, &after));
    }

    fn rejects(law: Law, input: &str) {
        let before = e(input);
        assert!(!law.check(&before), "{} should not match {}", law, before);
        assert_eq!(law.apply(&before), before);
    }

    #[test]
    fn test_names_round_trip() {
        for (i, law) in Law::ALL.into_iter().enumerate() {
            assert_eq!(law.index(), i);
            assert_eq!(Law::from_name(law.name()), Some(law));
            assert_eq!(law.name().parse::<Law>(), Ok(law));
        }
        assert_eq!(Law::from_name("modus_ponens"), None);
    }

    #[test]
    fn test_double_negation() {
        rewrites(Law::DoubleNegation, "~~p", "p");
        rewrites(Law::DoubleNegation, "~~(p ^ q)", "(p ^ q)");
        rejects(Law::DoubleNegation, "~p");
    }

    #[test]
    fn test_idempotence() {
        rewrites(Law::Idempotence, "p ^ p", "p");
        rewrites(Law::Idempotence, "(p v q) v (p v q)", "(p v q)");
        rejects(Law::Idempotence, "p -> p");
        rejects(Law::Idempotence, "p ^ q");
    }

    #[test]
    fn test_absorption() {
        rewrites(Law::Absorption, "p ^ (p v q)", "p");
        rewrites(Law::Absorption, "p v (q ^ p)", "p");
        rewrites(Law::Absorption, "(p v q) ^ q", "q");
        rejects(Law::Absorption, "p ^ (p ^ q)");
    }

    #[test]
    fn test_factoring() {
        rewrites(Law::Factoring, "(p ^ q) v (p ^ ~q)", "(p ^ (q v (¬q)))");
        rewrites(Law::Factoring, "(p v q) ^ (r v q)", "(q v (p ^ r))");
        rewrites(Law::Factoring, "(q ^ p) v (p ^ r)", "(p ^ (q v r))");
        rejects(Law::Factoring, "(p ^ q) v (r ^ s)");
        rejects(Law::Factoring, "(p ^ q) ^ (p ^ r)");
    }

    #[test]
    fn test_identity() {
        rewrites(Law::Identity, "p ^ T", "p");
        rewrites(Law::Identity, "T ^ p", "p");
        rewrites(Law::Identity, "p v F", "p");
        rewrites(Law::Identity, "F v (q -> r)", "(q → r)");
        rejects(Law::Identity, "p v T");
    }

    #[test]
    fn test_domination() {
        rewrites(Law::Domination, "p v T", "T");
        rewrites(Law::Domination, "F ^ p", "F");
        rejects(Law::Domination, "p ^ T");
    }

    #[test]
    fn test_negation_constant() {
        rewrites(Law::NegationConstant, "~T", "F");
        rewrites(Law::NegationConstant, "~F", "T");
        rejects(Law::NegationConstant, "~p");
    }

    #[test]
    fn test_complement() {
        rewrites(Law::Complement, "p v ~p", "T");
        rewrites(Law::Complement, "~p ^ p", "F");
        rewrites(Law::Complement, "(p ^ q) ^ ~(p ^ q)", "F");
        rejects(Law::Complement, "p v ~q");
    }

    #[test]
    fn test_implication_constant() {
        rewrites(Law::ImplicationConstant, "T -> p", "p");
        rewrites(Law::ImplicationConstant, "F -> p", "T");
        rewrites(Law::ImplicationConstant, "p -> T", "T");
        rewrites(Law::ImplicationConstant, "p -> F", "(¬p)");
        rejects(Law::ImplicationConstant, "p -> q");
    }

    #[test]
    fn test_de_morgan() {
        rewrites(Law::DeMorgan, "~(p ^ q)", "((¬p) v (¬q))");
        rewrites(Law::DeMorgan, "~(p v q)", "((¬p) ^ (¬q))");
        rejects(Law::DeMorgan, "~(p -> q)");
    }

    #[test]
    fn test_commutativity() {
        rewrites(Law::Commutativity, "p ^ q", "(q ^ p)");
        rewrites(Law::Commutativity, "p v q", "(q v p)");
        rejects(Law::Commutativity, "p -> q");
    }

    #[test]
    fn test_associativity() {
        rewrites(Law::Associativity, "(p ^ q) ^ r", "(p ^ (q ^ r))");
        rewrites(Law::Associativity, "p v (q v r)", "((p v q) v r)");
        rejects(Law::Associativity, "(p ^ q) v r");
        rejects(Law::Associativity, "(p -> q) -> r");
    }

    #[test]
    fn test_implication_laws() {
        rewrites(Law::ImplicationElimination, "p -> q", "((¬p) v q)");
        rewrites(Law::ImplicationIntroduction, "~p v q", "(p → q)");
        rejects(Law::ImplicationIntroduction, "q v ~p");
        rewrites(Law::Contraposition, "p -> q", "((¬q) → (¬p))");
    }

    #[test]
    fn test_de_morgan_reverse() {
        rewrites(Law::DeMorganReverse, "p v q", "(¬((¬p) ^ (¬q)))");
        rewrites(Law::DeMorganReverse, "p ^ q", "(¬((¬p) v (¬q)))");
        rejects(Law::DeMorganReverse, "~p");
    }

    #[test]
    fn test_distributivity() {
        rewrites(Law::Distributivity, "p ^ (q v r)", "((p ^ q) v (p ^ r))");
        rewrites(Law::Distributivity, "(q ^ r) v p", "((p v q) ^ (p v r))");
        rewrites(Law::Distributivity, "(p v q) ^ (r v s)", "(((p v q) ^ r) v ((p v q) ^ s))");
        rejects(Law::Distributivity, "p ^ (q ^ r)");
    }

    #[test]
    fn test_kinds() {
        let simplifications = Law::ALL.iter().filter(|l| l.kind() == LawKind::Simplification).count();
        assert_eq!(simplifications, 9);
        assert_eq!(Law::ImplicationElimination.kind(), LawKind::Conversion);
        assert_eq!(Law::Distributivity.kind(), LawKind::Expansion);
    }

    #[test]
    fn test_apply_at_nested() {
        let expr = e("q ^ ~~p");
        let paths = Law::DoubleNegation.find(&expr);
        assert_eq!(paths, vec![vec![Side::Right]]);
        assert_eq!(Law::DoubleNegation.apply_at(&expr, &paths[0]).to_string(), "(q ^ p)");
        assert!(Law::DoubleNegation.applies_anywhere(&expr));
        assert!(!Law::Complement.applies_anywhere(&expr));
    }

    #[test]
    #[should_panic]
    fn test_apply_at_mismatch() {
        Law::DeMorgan.apply_at(&e("p ^ q"), &[]);
    }

    #[test]
    fn test_serialize_name() {
        assert_eq!(serde_json::to_string(&Law::DeMorganReverse).unwrap(), "\"de_morgan_reverse\"");
    }
}
