//! Numeric features of expressions, fed to policies.
//!
//! Every expression yields [`STRUCTURAL_WIDTH`] structural features followed by
//! [`APPLICABILITY_WIDTH`] applicability bits (one per law, in [`Law::ALL`] order).
//!
//! - Pair layout ([`PAIR_WIDTH`]): `structural(e1) ++ structural(e2) ++ applicable(e1) ++ applicable(e2)`.
//! - Single layout ([`SINGLE_WIDTH`]): `structural(e) ++ applicable(e) ++ [goal]`, goal 1 for `T`.
//!
//! Structural features, in order: depth, node count, leaf count, negation count, conjunction
//! count, disjunction count, implication count, has double negation, has a De Morgan pattern,
//! root is implication, root is binary, is a leaf, useful variable count, useless variable
//! count, useful ratio, is tautology, is contradiction.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::expr::Expr;
use crate::laws::Law;
use crate::policy::Target;
use crate::symbols::SymbolTable;

pub const STRUCTURAL_WIDTH: usize = 17;
pub const APPLICABILITY_WIDTH: usize = Law::ALL.len();
pub const PAIR_WIDTH: usize = 2 * (STRUCTURAL_WIDTH + APPLICABILITY_WIDTH);
pub const SINGLE_WIDTH: usize = STRUCTURAL_WIDTH + APPLICABILITY_WIDTH + 1;

/// Which variables can change an expression's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usefulness {
    pub useful: BTreeSet<String>,
    pub useless: BTreeSet<String>,
    pub is_tautology: bool,
    pub is_contradiction: bool,
}

/// Splits the variables of `expr` into useful and useless ones.
///
/// A variable is useful when some assignment of the others exists under which flipping it
/// changes the value of `expr`. When no variable is useful the expression is constant, and a
/// single evaluation decides between tautology and contradiction.
///
/// Expects at most [`crate::verify::MAX_VARIABLES`] variables.
pub fn usefulness(expr: &Expr) -> Usefulness {
    let table = SymbolTable::for_expr(expr);
    let names: Vec<String> = table.names().map(str::to_string).collect();

    let mut useful = BTreeSet::new();
    let mut useless = BTreeSet::new();

    for (k, name) in names.iter().enumerate() {
        let others: Vec<&String> = names.iter().enumerate().filter(|&(j, _)| j != k).map(|(_, n)| n).collect();
        let mut matters = false;
        for bits in 0..(1u64 << others.len()) {
            for (j, other) in others.iter().enumerate() {
                table.set(other, (bits >> j) & 1 == 1);
            }
            table.set(name, false);
            let low = expr.evaluate(&table);
            table.set(name, true);
            let high = expr.evaluate(&table);
            if low != high {
                matters = true;
                break;
            }
        }
        if matters {
            useful.insert(name.clone());
        } else {
            useless.insert(name.clone());
        }
    }

    let (is_tautology, is_contradiction) = if useful.is_empty() {
        table.clear();
        let value = expr.evaluate(&table);
        (value, !value)
    } else {
        (false, false)
    };

    Usefulness {
        useful,
        useless,
        is_tautology,
        is_contradiction,
    }
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn is_double_negation(e: &Expr) -> bool {
    matches!(e, Expr::Not(inner) if matches!(**inner, Expr::Not(_)))
}

fn is_de_morgan_pattern(e: &Expr) -> bool {
    matches!(e, Expr::Not(inner) if matches!(**inner, Expr::And(..) | Expr::Or(..)))
}

/// The structural features of `expr`.
pub fn structural(expr: &Expr) -> [f64; STRUCTURAL_WIDTH] {
    let u = usefulness(expr);
    let total = u.useful.len() + u.useless.len();
    let ratio = if total > 0 { u.useful.len() as f64 / total as f64 } else { 0.0 };

    [
        expr.depth() as f64,
        expr.size() as f64,
        expr.leaf_count() as f64,
        expr.count(&|n| matches!(n, Expr::Not(_))) as f64,
        expr.count(&|n| matches!(n, Expr::And(..))) as f64,
        expr.count(&|n| matches!(n, Expr::Or(..))) as f64,
        expr.count(&|n| matches!(n, Expr::Implies(..))) as f64,
        flag(expr.any(&is_double_negation)),
        flag(expr.any(&is_de_morgan_pattern)),
        flag(matches!(expr, Expr::Implies(..))),
        flag(expr.is_binary()),
        flag(expr.is_leaf()),
        u.useful.len() as f64,
        u.useless.len() as f64,
        ratio,
        flag(u.is_tautology),
        flag(u.is_contradiction),
    ]
}

/// One bit per law: whether it applies anywhere in `expr`.
pub fn applicability(expr: &Expr) -> [f64; APPLICABILITY_WIDTH] {
    let mut bits = [0.0; APPLICABILITY_WIDTH];
    for law in Law::ALL {
        bits[law.index()] = flag(law.applies_anywhere(expr));
    }
    bits
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Pair,
    Single,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Pair => write!(f, "pair"),
            Layout::Single => write!(f, "single-expression"),
        }
    }
}

/// A feature vector in one of the two layouts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Features {
    layout: Layout,
    values: Vec<f64>,
}

impl Features {
    /// Features of a proof state with two expressions.
    pub fn pair(e1: &Expr, e2: &Expr) -> Self {
        let mut values = Vec::with_capacity(PAIR_WIDTH);
        values.extend(structural(e1));
        values.extend(structural(e2));
        values.extend(applicability(e1));
        values.extend(applicability(e2));
        Self {
            layout: Layout::Pair,
            values,
        }
    }

    /// Features of one expression being reduced to the constant `goal`.
    pub fn single(expr: &Expr, goal: bool) -> Self {
        let mut values = Vec::with_capacity(SINGLE_WIDTH);
        values.extend(structural(expr));
        values.extend(applicability(expr));
        values.push(flag(goal));
        Self {
            layout: Layout::Single,
            values,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Structural features of `target`. The single layout only has [`Target::First`].
    pub fn structural(&self, target: Target) -> Option<&[f64]> {
        let start = match (self.layout, target) {
            (_, Target::First) => 0,
            (Layout::Pair, Target::Second) => STRUCTURAL_WIDTH,
            (Layout::Single, Target::Second) => return None,
        };
        Some(&self.values[start..start + STRUCTURAL_WIDTH])
    }

    /// Whether `law` applies somewhere in `target`, as recorded in the vector.
    pub fn applicable(&self, target: Target, law: Law) -> bool {
        let base = match (self.layout, target) {
            (Layout::Pair, Target::First) => 2 * STRUCTURAL_WIDTH,
            (Layout::Pair, Target::Second) => 2 * STRUCTURAL_WIDTH + APPLICABILITY_WIDTH,
            (Layout::Single, Target::First) => STRUCTURAL_WIDTH,
            (Layout::Single, Target::Second) => return false,
        };
        self.values[base + law.index()] > 0.5
    }

    /// Goal constant of a single-layout vector.
    pub fn goal(&self) -> Option<bool> {
        match self.layout {
            Layout::Single => self.values.last().map(|&v| v > 0.5),
            Layout::Pair => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn e(s: &str) -> Expr {
        s.parse().unwrap()
    }

    #[test]
    fn test_widths() {
        assert_eq!(PAIR_WIDTH, 68);
        assert_eq!(SINGLE_WIDTH, 35);
        assert_eq!(Features::pair(&e("p"), &e("q ^ r")).len(), 68);
        assert_eq!(Features::single(&e("p ^ ~p"), false).len(), 35);
    }

    #[test]
    fn test_atom_features() {
        let f = structural(&e("p"));
        let expected = [1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0];
        assert_eq!(f, expected);
        assert_eq!(applicability(&e("p")), [0.0; APPLICABILITY_WIDTH]);
    }

    #[test]
    fn test_structural_counts() {
        let f = structural(&e("~~p -> (q v ~(r ^ s))"));
        println!("features = {:?}", f);
        assert_eq!(f[0], 5.0); // depth
        assert_eq!(f[1], 10.0); // nodes
        assert_eq!(f[2], 4.0); // leaves
        assert_eq!(f[3], 3.0); // negations
        assert_eq!(f[4], 1.0);
        assert_eq!(f[5], 1.0);
        assert_eq!(f[6], 1.0);
        assert_eq!(f[7], 1.0); // double negation
        assert_eq!(f[8], 1.0); // de morgan pattern
        assert_eq!(f[9], 1.0); // root implication
        assert_eq!(f[10], 1.0);
        assert_eq!(f[11], 0.0);
    }

    #[test]
    fn test_usefulness() {
        let u = usefulness(&e("p ^ (q v ~q)"));
        assert_eq!(u.useful.iter().collect::<Vec<_>>(), vec!["p"]);
        assert_eq!(u.useless.iter().collect::<Vec<_>>(), vec!["q"]);
        assert!(!u.is_tautology && !u.is_contradiction);

        let u = usefulness(&e("p v ~p"));
        assert!(u.useful.is_empty());
        assert!(u.is_tautology);

        let u = usefulness(&e("p ^ ~p"));
        assert!(u.is_contradiction);

        let u = usefulness(&e("~T"));
        assert!(u.is_contradiction);
        assert!(!u.is_tautology);
    }

    #[test]
    fn test_applicability_bits() {
        let bits = applicability(&e("~~p ^ q"));
        assert_eq!(bits[Law::DoubleNegation.index()], 1.0);
        assert_eq!(bits[Law::Commutativity.index()], 1.0);
        assert_eq!(bits[Law::DeMorganReverse.index()], 1.0);
        assert_eq!(bits[Law::ImplicationElimination.index()], 0.0);
        assert_eq!(bits[Law::Complement.index()], 0.0);
    }

    #[test]
    fn test_pair_accessors() {
        let f = Features::pair(&e("p -> q"), &e("~~r"));
        assert!(f.applicable(Target::First, Law::ImplicationElimination));
        assert!(!f.applicable(Target::Second, Law::ImplicationElimination));
        assert!(f.applicable(Target::Second, Law::DoubleNegation));
        assert_eq!(f.structural(Target::Second).unwrap()[1], 3.0);
        assert_eq!(f.goal(), None);
    }

    #[test]
    fn test_single_accessors() {
        let f = Features::single(&e("p v ~p"), true);
        assert!(f.applicable(Target::First, Law::Complement));
        assert!(!f.applicable(Target::Second, Law::Complement));
        assert_eq!(f.goal(), Some(true));
        assert_eq!(f.as_slice()[SINGLE_WIDTH - 1], 1.0);
        assert_eq!(f.structural(Target::Second), None);
    }
}
