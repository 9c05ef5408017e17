//! Truth-table semantics.
//!
//! Equivalence checking enumerates all `2^n` assignments of the `n` distinct variables of both
//! expressions. The cost is exponential in `n`; it is meant for the small formulas the rewrite
//! engine handles.

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::expr::Expr;
use crate::symbols::SymbolTable;

/// Most distinct variables a pair of expressions may have for truth-table enumeration.
pub const MAX_VARIABLES: usize = 63;

/// Outcome of a truth-table comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub equivalent: bool,
    /// Number of assignments evaluated before stopping.
    pub assignments_checked: u64,
    /// First assignment on which the two expressions differ.
    pub counterexample: Option<BTreeMap<String, bool>>,
}

/// Number of distinct variables across both expressions.
pub fn variable_count(e1: &Expr, e2: &Expr) -> usize {
    joint_variables(e1, e2).len()
}

/// Sorted union of both expressions' variables.
fn joint_variables(e1: &Expr, e2: &Expr) -> Vec<String> {
    let mut names = e1.free_variables();
    names.extend(e2.free_variables());
    names.into_iter().map(str::to_string).collect()
}

/// Sets the variables of `names` to the bits of `assignment` (bit `j` for name `j`).
fn assign(tables: &[&SymbolTable], names: &[String], assignment: u64) {
    for (j, name) in names.iter().enumerate() {
        let value = (assignment >> j) & 1 == 1;
        for table in tables {
            table.set(name, value);
        }
    }
}

fn assignment_count(n: usize) -> u64 {
    assert!(n <= MAX_VARIABLES, "truth-table enumeration over {} variables is not supported", n);
    1u64 << n
}

/// Compares `e1` and `e2` on every assignment, binding values through their own symbol tables.
///
/// Each variable gets the same value in both tables. Names missing from a table evaluate to
/// false there, so pass tables covering the expressions' variables. Cells are left holding the
/// last assignment tried.
///
/// # Panics
///
/// Panics when the expressions have more than [`MAX_VARIABLES`] distinct variables.
pub fn check_equivalence_in(e1: &Expr, t1: &SymbolTable, e2: &Expr, t2: &SymbolTable) -> Verdict {
    let names = joint_variables(e1, e2);
    let total = assignment_count(names.len());

    for i in 0..total {
        assign(&[t1, t2], &names, i);
        if e1.evaluate(t1) != e2.evaluate(t2) {
            debug!("{} and {} differ on assignment {:#b}", e1, e2, i);
            return Verdict {
                equivalent: false,
                assignments_checked: i + 1,
                counterexample: Some(t1.snapshot().into_iter().chain(t2.snapshot()).collect()),
            };
        }
    }

    Verdict {
        equivalent: true,
        assignments_checked: total,
        counterexample: None,
    }
}

/// Compares `e1` and `e2` on every assignment of their joint variables.
pub fn check_equivalence(e1: &Expr, e2: &Expr) -> Verdict {
    let table = SymbolTable::for_expr(&Expr::and(e1.clone(), e2.clone()));
    check_equivalence_in(e1, &table, e2, &table)
}

/// Whether `e1` and `e2` agree on every assignment.
pub fn semantically_equivalent(e1: &Expr, e2: &Expr) -> bool {
    check_equivalence(e1, e2).equivalent
}

/// One assignment of a [`TruthTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TruthRow {
    /// Variable columns, including negated-variable columns such as `¬p`.
    pub values: BTreeMap<String, bool>,
    /// Sub-expression values of the first expression, by canonical string.
    pub subvalues1: BTreeMap<String, bool>,
    pub subvalues2: BTreeMap<String, bool>,
    pub value1: bool,
    pub value2: bool,
}

/// Full truth table of two expressions, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TruthTable {
    /// Sorted variable names followed by `¬x` for each variable that appears negated.
    pub columns: Vec<String>,
    /// Distinct binary sub-expressions of the first expression, deepest first.
    pub subexpressions1: Vec<String>,
    pub subexpressions2: Vec<String>,
    pub rows: Vec<TruthRow>,
}

/// Distinct binary sub-expressions of `expr` other than `expr` itself, deepest first.
fn binary_subexpressions(expr: &Expr) -> Vec<Expr> {
    fn walk(node: &Expr, depth: usize, out: &mut Vec<(usize, Expr)>) {
        match node {
            Expr::Atom(_) | Expr::Const(_) => {}
            Expr::Not(inner) => walk(inner, depth + 1, out),
            Expr::And(l, r) | Expr::Or(l, r) | Expr::Implies(l, r) => {
                walk(l, depth + 1, out);
                walk(r, depth + 1, out);
                if !out.iter().any(|(_, seen)| seen == node) {
                    out.push((depth, node.clone()));
                }
            }
        }
    }

    let mut found = Vec::new();
    walk(expr, 0, &mut found);
    found.retain(|(_, e)| e != expr);
    found.sort_by(|a, b| b.0.cmp(&a.0));
    found.into_iter().map(|(_, e)| e).collect()
}

/// Variables occurring directly under a negation.
fn negated_variables(expr: &Expr) -> Vec<String> {
    fn walk(node: &Expr, out: &mut Vec<String>) {
        match node {
            Expr::Atom(_) | Expr::Const(_) => {}
            Expr::Not(inner) => {
                if let Expr::Atom(name) = &**inner {
                    out.push(name.to_string());
                }
                walk(inner, out);
            }
            Expr::And(l, r) | Expr::Or(l, r) | Expr::Implies(l, r) => {
                walk(l, out);
                walk(r, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(expr, &mut out);
    out
}

/// Builds the display truth table of `e1` and `e2`.
///
/// Row `i` assigns bit `j` of `i` to the `j`-th variable in sorted order. Panics past
/// [`MAX_VARIABLES`] variables.
pub fn truth_table(e1: &Expr, e2: &Expr) -> TruthTable {
    let names = joint_variables(e1, e2);
    let table = SymbolTable::for_expr(&Expr::and(e1.clone(), e2.clone()));

    let mut negated = negated_variables(e1);
    negated.extend(negated_variables(e2));
    let negated: Vec<String> = names.iter().filter(|n| negated.contains(n)).cloned().collect();

    let subs1 = binary_subexpressions(e1);
    let subs2 = binary_subexpressions(e2);

    let mut rows = Vec::new();
    for i in 0..assignment_count(names.len()) {
        assign(&[&table], &names, i);
        let mut values = table.snapshot();
        for name in &negated {
            let v = table.get(name).unwrap_or(false);
            values.insert(format!("¬{}", name), !v);
        }
        let eval_all = |subs: &[Expr]| -> BTreeMap<String, bool> {
            subs.iter().map(|s| (s.to_string(), s.evaluate(&table))).collect()
        };
        rows.push(TruthRow {
            values,
            subvalues1: eval_all(&subs1),
            subvalues2: eval_all(&subs2),
            value1: e1.evaluate(&table),
            value2: e2.evaluate(&table),
        });
    }

    let mut columns = names;
    columns.extend(negated.iter().map(|n| format!("¬{}", n)));

    TruthTable {
        columns,
        subexpressions1: subs1.iter().map(Expr::to_string).collect(),
        subexpressions2: subs2.iter().map(Expr::to_string).collect(),
        rows,
    }
}
