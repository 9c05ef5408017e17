//! Locations inside expression trees.
//!
//! A [`Path`] is the sequence of [`Side`]s taken from the root to reach a sub-expression. The
//! operand of a negation is reached through [`Side::Left`].
//!
//! # Example
//!
//! ```
//! use eqprover::expr::Expr;
//! use eqprover::paths::{find_applicable_paths, subexpr_at, Side};
//!
//! let e: Expr = "~~p ^ ~~q".parse().unwrap();
//! let is_double_neg = |n: &Expr| matches!(n, Expr::Not(inner) if matches!(**inner, Expr::Not(_)));
//!
//! let paths = find_applicable_paths(&e, is_double_neg);
//! assert_eq!(paths, vec![vec![Side::Left], vec![Side::Right]]);
//! assert_eq!(subexpr_at(&e, &paths[1]).unwrap().to_string(), "(¬(¬q))");
//! ```

use std::sync::Arc;

use serde::Serialize;

use crate::expr::Expr;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Root-to-node route. The empty path denotes the root.
pub type Path = Vec<Side>;

/// Children of `expr` with the side each one hangs on.
fn children(expr: &Expr) -> impl Iterator<Item = (Side, &Expr)> {
    let (left, right): (Option<&Expr>, Option<&Expr>) = match expr {
        Expr::Atom(_) | Expr::Const(_) => (None, None),
        Expr::Not(inner) => (Some(&**inner), None),
        Expr::And(l, r) | Expr::Or(l, r) | Expr::Implies(l, r) => (Some(&**l), Some(&**r)),
    };
    left.map(|e| (Side::Left, e)).into_iter().chain(right.map(|e| (Side::Right, e)))
}

/// All paths whose sub-expression satisfies `check`, in pre-order (root first, left before right).
pub fn find_applicable_paths(expr: &Expr, check: impl Fn(&Expr) -> bool) -> Vec<Path> {
    let mut found = Vec::new();
    let mut stack: Vec<(Path, &Expr)> = vec![(Vec::new(), expr)];

    while let Some((path, node)) = stack.pop() {
        if check(node) {
            found.push(path.clone());
        }
        // Push right first so that left is visited first.
        let kids: Vec<_> = children(node).collect();
        for (side, child) in kids.into_iter().rev() {
            let mut child_path = path.clone();
            child_path.push(side);
            stack.push((child_path, child));
        }
    }

    found
}

/// Whether any sub-expression satisfies `check`. Stops at the first hit.
pub fn any_applicable(expr: &Expr, check: impl Fn(&Expr) -> bool) -> bool {
    expr.any(&check)
}

/// Sub-expression at `path`, or `None` if the path leaves the tree.
pub fn subexpr_at<'a>(expr: &'a Expr, path: &[Side]) -> Option<&'a Expr> {
    let mut node = expr;
    for side in path {
        node = match (node, side) {
            (Expr::Not(inner), Side::Left) => &**inner,
            (Expr::And(l, _) | Expr::Or(l, _) | Expr::Implies(l, _), Side::Left) => &**l,
            (Expr::And(_, r) | Expr::Or(_, r) | Expr::Implies(_, r), Side::Right) => &**r,
            _ => return None,
        };
    }
    Some(node)
}

/// Replaces the sub-expression at `path` with `rewrite(sub)`.
///
/// Only the nodes on the path are rebuilt; every sibling off the path is shared with `expr`.
///
/// # Panics
///
/// Panics if `path` does not lead to a node of `expr`.
pub fn apply_at_path(expr: &Expr, path: &[Side], rewrite: impl FnOnce(&Expr) -> Expr) -> Expr {
    let Some((side, rest)) = path.split_first() else {
        return rewrite(expr);
    };

    let descend = |child: &Arc<Expr>| -> Arc<Expr> { Arc::new(apply_at_path(child, rest, rewrite)) };

    match (expr, side) {
        (Expr::Not(inner), Side::Left) => Expr::Not(descend(inner)),
        (Expr::And(l, r), Side::Left) => Expr::And(descend(l), Arc::clone(r)),
        (Expr::And(l, r), Side::Right) => Expr::And(Arc::clone(l), descend(r)),
        (Expr::Or(l, r), Side::Left) => Expr::Or(descend(l), Arc::clone(r)),
        (Expr::Or(l, r), Side::Right) => Expr::Or(Arc::clone(l), descend(r)),
        (Expr::Implies(l, r), Side::Left) => Expr::Implies(descend(l), Arc::clone(r)),
        (Expr::Implies(l, r), Side::Right) => Expr::Implies(Arc::clone(l), descend(r)),
        _ => panic!("path {:?} leaves the expression at {}", path, expr),
    }
}

/// Replaces the sub-expression at `path` with `replacement`.
pub fn replace_at(expr: &Expr, path: &[Side], replacement: Expr) -> Expr {
    apply_at_path(expr, path, |_| replacement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn e(s: &str) -> Expr {
        s.parse().unwrap()
    }

    #[test]
    fn test_preorder() {
        let expr = e("(p ^ q) v ~r");
        let all = find_applicable_paths(&expr, |_| true);
        let expected: Vec<Path> = vec![
            vec![],
            vec![Side::Left],
            vec![Side::Left, Side::Left],
            vec![Side::Left, Side::Right],
            vec![Side::Right],
            vec![Side::Right, Side::Left],
        ];
        assert_eq!(all, expected);
        for path in &all {
            assert!(subexpr_at(&expr, path).is_some());
        }
    }

    #[test]
    fn test_subexpr_at_out_of_tree() {
        let expr = e("~p");
        assert_eq!(subexpr_at(&expr, &[Side::Right]), None);
        assert_eq!(subexpr_at(&expr, &[Side::Left, Side::Left]), None);
    }

    #[test]
    fn test_apply_at_path_shares_siblings() {
        let expr = e("(p ^ q) v (r ^ s)");
        let rewritten = replace_at(&expr, &[Side::Left, Side::Right], Expr::atom("x"));
        assert_eq!(rewritten.to_string(), "((p ^ x) v (r ^ s))");

        let (Expr::Or(_, old_right), Expr::Or(_, new_right)) = (&expr, &rewritten) else {
            panic!("expected disjunctions");
        };
        assert!(Arc::ptr_eq(old_right, new_right));
        assert_eq!(expr.to_string(), "((p ^ q) v (r ^ s))");
    }

    #[test]
    fn test_apply_at_root() {
        let expr = e("p");
        assert_eq!(apply_at_path(&expr, &[], |x| Expr::not(x.clone())).to_string(), "(¬p)");
    }

    #[test]
    #[should_panic]
    fn test_apply_at_invalid_path() {
        apply_at_path(&e("p ^ q"), &[Side::Left, Side::Left], |x| x.clone());
    }

    #[test]
    fn test_any_applicable() {
        let expr = e("p ^ (q -> r)");
        assert!(any_applicable(&expr, |n| matches!(n, Expr::Implies(..))));
        assert!(!any_applicable(&expr, |n| matches!(n, Expr::Or(..))));
    }
}
