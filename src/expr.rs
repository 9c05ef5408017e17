//! Propositional expression trees.
//!
//! An [`Expr`] is an immutable tree of atomic variables, truth constants, negations and the three
//! binary connectives. Children are held behind [`Arc`], so a rewrite that changes one subtree
//! rebuilds only the ancestor chain and shares every untouched sibling with the original tree.
//!
//! # Canonical form
//!
//! The [`Display`][fmt::Display] implementation is the canonical rendering used throughout the
//! crate: every compound node is parenthesized, negation is written `¬`, conjunction `^`,
//! disjunction `v` and implication `→`. The canonical string of a parsed tree parses back to the
//! same tree.
//!
//! ```
//! use eqprover::expr::Expr;
//!
//! let e = Expr::or(Expr::not(Expr::atom("p")), Expr::atom("q"));
//! assert_eq!(e.to_string(), "((¬p) v q)");
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::symbols::Valuation;

/// Binary connective.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinOp {
    And,
    Or,
    Implies,
}

impl BinOp {
    /// The other one of AND/OR. Implication has no dual.
    pub fn dual(self) -> Option<BinOp> {
        match self {
            BinOp::And => Some(BinOp::Or),
            BinOp::Or => Some(BinOp::And),
            BinOp::Implies => None,
        }
    }

    /// Whether the connective is commutative, associative and idempotent (AND and OR).
    pub fn is_lattice(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::And => "^",
            BinOp::Or => "v",
            BinOp::Implies => "→",
        }
    }
}

/// A propositional expression.
///
/// # Invariants
///
/// - Nodes are pure data; evaluation never mutates the tree.
/// - Two trees are equal iff their canonical strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Named boolean variable.
    Atom(Arc<str>),
    /// Truth constant `T` or `F`.
    Const(bool),
    Not(Arc<Expr>),
    And(Arc<Expr>, Arc<Expr>),
    Or(Arc<Expr>, Arc<Expr>),
    Implies(Arc<Expr>, Arc<Expr>),
}

impl Expr {
    pub fn atom(name: impl Into<Arc<str>>) -> Self {
        Expr::Atom(name.into())
    }

    pub fn constant(value: bool) -> Self {
        Expr::Const(value)
    }

    pub fn tt() -> Self {
        Expr::Const(true)
    }

    pub fn ff() -> Self {
        Expr::Const(false)
    }

    pub fn not(operand: impl Into<Arc<Expr>>) -> Self {
        Expr::Not(operand.into())
    }

    pub fn and(lhs: impl Into<Arc<Expr>>, rhs: impl Into<Arc<Expr>>) -> Self {
        Expr::And(lhs.into(), rhs.into())
    }

    pub fn or(lhs: impl Into<Arc<Expr>>, rhs: impl Into<Arc<Expr>>) -> Self {
        Expr::Or(lhs.into(), rhs.into())
    }

    pub fn implies(lhs: impl Into<Arc<Expr>>, rhs: impl Into<Arc<Expr>>) -> Self {
        Expr::Implies(lhs.into(), rhs.into())
    }

    pub fn binary(op: BinOp, lhs: impl Into<Arc<Expr>>, rhs: impl Into<Arc<Expr>>) -> Self {
        match op {
            BinOp::And => Expr::And(lhs.into(), rhs.into()),
            BinOp::Or => Expr::Or(lhs.into(), rhs.into()),
            BinOp::Implies => Expr::Implies(lhs.into(), rhs.into()),
        }
    }

    /// Splits a binary node into its connective and operands.
    pub fn as_binary(&self) -> Option<(BinOp, &Arc<Expr>, &Arc<Expr>)> {
        match self {
            Expr::And(l, r) => Some((BinOp::And, l, r)),
            Expr::Or(l, r) => Some((BinOp::Or, l, r)),
            Expr::Implies(l, r) => Some((BinOp::Implies, l, r)),
            _ => None,
        }
    }

    /// Operand of a negation.
    pub fn as_negation(&self) -> Option<&Arc<Expr>> {
        match self {
            Expr::Not(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<bool> {
        match self {
            Expr::Const(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Expr::Const(_))
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Expr::Const(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Expr::Const(false))
    }

    /// Leaf check: an atom or a constant.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Expr::Atom(_) | Expr::Const(_))
    }

    pub fn is_binary(&self) -> bool {
        self.as_binary().is_some()
    }

    /// Evaluates the expression under the given valuation.
    ///
    /// Evaluation is strict: both operands of every connective are always evaluated.
    /// Atoms missing from the valuation evaluate to `false`.
    pub fn evaluate<V: Valuation + ?Sized>(&self, env: &V) -> bool {
        match self {
            Expr::Atom(name) => env.value(name).unwrap_or(false),
            Expr::Const(value) => *value,
            Expr::Not(inner) => !inner.evaluate(env),
            Expr::And(l, r) => l.evaluate(env) & r.evaluate(env),
            Expr::Or(l, r) => l.evaluate(env) | r.evaluate(env),
            Expr::Implies(l, r) => !l.evaluate(env) | r.evaluate(env),
        }
    }

    /// Names of all atoms in the tree. Constants are not variables.
    pub fn free_variables(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Expr::Atom(name) => {
                names.insert(name);
            }
            Expr::Const(_) => {}
            Expr::Not(inner) => inner.collect_variables(names),
            Expr::And(l, r) | Expr::Or(l, r) | Expr::Implies(l, r) => {
                l.collect_variables(names);
                r.collect_variables(names);
            }
        }
    }

    /// Depth of the tree, counting leaves as 1.
    pub fn depth(&self) -> usize {
        match self {
            Expr::Atom(_) | Expr::Const(_) => 1,
            Expr::Not(inner) => 1 + inner.depth(),
            Expr::And(l, r) | Expr::Or(l, r) | Expr::Implies(l, r) => 1 + l.depth().max(r.depth()),
        }
    }

    /// Total number of nodes.
    pub fn size(&self) -> usize {
        match self {
            Expr::Atom(_) | Expr::Const(_) => 1,
            Expr::Not(inner) => 1 + inner.size(),
            Expr::And(l, r) | Expr::Or(l, r) | Expr::Implies(l, r) => 1 + l.size() + r.size(),
        }
    }

    /// Number of leaves (atoms and constants).
    pub fn leaf_count(&self) -> usize {
        match self {
            Expr::Atom(_) | Expr::Const(_) => 1,
            Expr::Not(inner) => inner.leaf_count(),
            Expr::And(l, r) | Expr::Or(l, r) | Expr::Implies(l, r) => l.leaf_count() + r.leaf_count(),
        }
    }

    /// Number of nodes satisfying `pred`.
    pub fn count(&self, pred: &impl Fn(&Expr) -> bool) -> usize {
        let own = usize::from(pred(self));
        own + match self {
            Expr::Atom(_) | Expr::Const(_) => 0,
            Expr::Not(inner) => inner.count(pred),
            Expr::And(l, r) | Expr::Or(l, r) | Expr::Implies(l, r) => l.count(pred) + r.count(pred),
        }
    }

    /// Whether any node satisfies `pred`.
    pub fn any(&self, pred: &impl Fn(&Expr) -> bool) -> bool {
        pred(self)
            || match self {
                Expr::Atom(_) | Expr::Const(_) => false,
                Expr::Not(inner) => inner.any(pred),
                Expr::And(l, r) | Expr::Or(l, r) | Expr::Implies(l, r) => l.any(pred) || r.any(pred),
            }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Atom(name) => write!(f, "{}", name),
            Expr::Const(true) => write!(f, "T"),
            Expr::Const(false) => write!(f, "F"),
            Expr::Not(inner) => write!(f, "(¬{})", inner),
            Expr::And(l, r) => write!(f, "({} {} {})", l, BinOp::And.symbol(), r),
            Expr::Or(l, r) => write!(f, "({} {} {})", l, BinOp::Or.symbol(), r),
            Expr::Implies(l, r) => write!(f, "({} {} {})", l, BinOp::Implies.symbol(), r),
        }
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Syntactic equality: same structure and same symbols.
///
/// This is not equality up to any equivalence law: `p ^ q` and `q ^ p` are different.
pub fn are_equal(a: &Expr, b: &Expr) -> bool {
    a == b
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use test_log::test;

    fn p() -> Expr {
        Expr::atom("p")
    }

    fn q() -> Expr {
        Expr::atom("q")
    }

    #[test]
    fn test_canonical_string() {
        assert_eq!(p().to_string(), "p");
        assert_eq!(Expr::tt().to_string(), "T");
        assert_eq!(Expr::ff().to_string(), "F");
        assert_eq!(Expr::not(p()).to_string(), "(¬p)");
        assert_eq!(Expr::and(p(), q()).to_string(), "(p ^ q)");
        assert_eq!(Expr::or(p(), q()).to_string(), "(p v q)");
        assert_eq!(Expr::implies(p(), q()).to_string(), "(p → q)");
        let e = Expr::not(Expr::or(Expr::not(p()), Expr::not(q())));
        assert_eq!(e.to_string(), "(¬((¬p) v (¬q)))");
    }

    #[test]
    fn test_evaluate() {
        let mut env = HashMap::new();
        let imp = Expr::implies(p(), q());
        for (vp, vq, expected) in [(false, false, true), (false, true, true), (true, false, false), (true, true, true)] {
            env.insert("p".to_string(), vp);
            env.insert("q".to_string(), vq);
            assert_eq!(imp.evaluate(&env), expected, "p={} q={}", vp, vq);
        }
    }

    #[test]
    fn test_evaluate_does_not_touch_tree() {
        let e = Expr::and(p(), Expr::not(q()));
        let before = e.clone();
        let mut env = HashMap::new();
        env.insert("p".to_string(), true);
        assert!(e.evaluate(&env));
        env.insert("q".to_string(), true);
        assert!(!e.evaluate(&env));
        assert_eq!(e, before);
    }

    #[test]
    fn test_constants_ignore_environment() {
        let mut env = HashMap::new();
        env.insert("T".to_string(), false);
        assert!(Expr::tt().evaluate(&env));
        assert!(!Expr::ff().evaluate(&env));
    }

    #[test]
    fn test_free_variables() {
        let e = Expr::or(Expr::and(p(), Expr::tt()), Expr::implies(q(), p()));
        let vars: Vec<&str> = e.free_variables().into_iter().collect();
        assert_eq!(vars, vec!["p", "q"]);
        assert!(Expr::and(Expr::tt(), Expr::ff()).free_variables().is_empty());
    }

    #[test]
    fn test_depth_and_size() {
        assert_eq!(p().depth(), 1);
        assert_eq!(p().size(), 1);
        let e = Expr::and(Expr::not(p()), q());
        assert_eq!(e.depth(), 3);
        assert_eq!(e.size(), 4);
        assert_eq!(e.leaf_count(), 2);
        assert_eq!(e.count(&|n| matches!(n, Expr::Not(_))), 1);
    }

    #[test]
    fn test_are_equal_is_syntactic() {
        let a = Expr::and(p(), q());
        let b = Expr::and(q(), p());
        assert!(are_equal(&a, &a.clone()));
        assert!(!are_equal(&a, &b));
        assert_eq!(are_equal(&a, &b), a.to_string() == b.to_string());
    }

    #[test]
    fn test_binary_helpers() {
        let e = Expr::binary(BinOp::Or, p(), q());
        let (op, l, r) = e.as_binary().unwrap();
        assert_eq!(op, BinOp::Or);
        assert_eq!(**l, p());
        assert_eq!(**r, q());
        assert_eq!(BinOp::And.dual(), Some(BinOp::Or));
        assert_eq!(BinOp::Implies.dual(), None);
        assert!(!BinOp::Implies.is_lattice());
    }

    #[test]
    fn test_serialize_as_canonical_string() {
        let e = Expr::implies(p(), Expr::ff());
        assert_eq!(serde_json::to_string(&e).unwrap(), "\"(p → F)\"");
    }
}
