//! Expression tree to DOT (Graphviz) conversion.
//!
//! Renders an [`Expr`] as a tree so that intermediate proof states can be inspected visually with
//! Graphviz tools like `dot`.
//!
//! # DOT Format
//!
//! The generated DOT output follows these conventions:
//! - **Connective nodes** (`¬`, `^`, `v`, `→`) are rendered as circles
//! - **Variable leaves** are rendered as boxes, all on the bottom rank
//! - **Constant leaves** (`T`, `F`) are rendered as squares
//! - **Edges**:
//!   - Solid lines lead to left operands (and to the operand of a negation)
//!   - Dashed lines lead to right operands
//! - An optional **highlighted path** (e.g. the location of the last rewrite) is filled
//!
//! # Examples
//!
//! ```
//! use eqprover::expr::Expr;
//!
//! let e: Expr = "~(p ^ q)".parse().unwrap();
//! let dot = e.to_dot().unwrap();
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! assert!(dot.starts_with("graph {"));
//! ```

use std::fmt::Write as _;

use crate::expr::Expr;
use crate::paths::Side;

/// Configuration options for DOT output generation.
///
/// # Examples
///
/// ```
/// use eqprover::dot::DotConfig;
/// use eqprover::expr::Expr;
///
/// let e: Expr = "p -> T".parse().unwrap();
/// let config = DotConfig {
///     operator_shape: "ellipse",
///     ..DotConfig::default()
/// };
/// let dot = e.to_dot_with_config(&config, None).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for connective nodes (default: "circle")
    pub operator_shape: &'static str,
    /// Shape for variable leaves (default: "box")
    pub variable_shape: &'static str,
    /// Shape for constant leaves (default: "square")
    pub constant_shape: &'static str,
    /// Style for edges to left operands (default: "solid")
    pub left_edge_style: &'static str,
    /// Style for edges to right operands (default: "dashed")
    pub right_edge_style: &'static str,
    /// Fill color for highlighted nodes (default: "lightblue")
    pub highlight_color: &'static str,
    /// Whether to put all variable leaves on one rank (default: true)
    pub align_leaves: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            operator_shape: "circle",
            variable_shape: "box",
            constant_shape: "square",
            left_edge_style: "solid",
            right_edge_style: "dashed",
            highlight_color: "lightblue",
            align_leaves: true,
        }
    }
}

fn label(expr: &Expr) -> String {
    match expr {
        Expr::Atom(name) => name.to_string(),
        Expr::Const(true) => "T".to_string(),
        Expr::Const(false) => "F".to_string(),
        Expr::Not(_) => "¬".to_string(),
        Expr::And(..) => "^".to_string(),
        Expr::Or(..) => "v".to_string(),
        Expr::Implies(..) => "→".to_string(),
    }
}

impl Expr {
    /// Converts the expression tree to DOT (Graphviz) format.
    ///
    /// Nodes are numbered in pre-order, so the root is node `0`. Shared sub-trees are drawn once
    /// per occurrence.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default(), None)
    }

    /// Converts the expression tree to DOT format with custom configuration.
    ///
    /// When `highlight` is given, every node on that path from the root (inclusive) is filled
    /// with [`DotConfig::highlight_color`]. A path leaving the tree highlights the part of it
    /// that exists.
    pub fn to_dot_with_config(&self, config: &DotConfig, highlight: Option<&[Side]>) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "graph {{")?;
        writeln!(dot, "node [shape={}];", config.operator_shape)?;

        let mut leaves = Vec::new();
        let mut next_id = 0;
        // (node, id, parent id and side, path from root)
        let mut stack: Vec<(&Expr, Option<(usize, Side)>, Vec<Side>)> = vec![(self, None, Vec::new())];

        while let Some((node, parent, path)) = stack.pop() {
            let id = next_id;
            next_id += 1;

            let shape = match node {
                Expr::Atom(_) => config.variable_shape,
                Expr::Const(_) => config.constant_shape,
                _ => config.operator_shape,
            };
            let highlighted = highlight.is_some_and(|h| h.starts_with(&path));
            if highlighted {
                writeln!(
                    dot,
                    "{} [shape={}, label=\"{}\", style=filled, fillcolor={}];",
                    id,
                    shape,
                    label(node),
                    config.highlight_color
                )?;
            } else {
                writeln!(dot, "{} [shape={}, label=\"{}\"];", id, shape, label(node))?;
            }
            if node.is_leaf() {
                leaves.push(id);
            }

            if let Some((parent_id, side)) = parent {
                let style = match side {
                    Side::Left => config.left_edge_style,
                    Side::Right => config.right_edge_style,
                };
                writeln!(dot, "{} -- {} [style={}];", parent_id, id, style)?;
            }

            // Right is pushed first so that left gets the smaller id.
            let children: Vec<(Side, &Expr)> = match node {
                Expr::Atom(_) | Expr::Const(_) => vec![],
                Expr::Not(inner) => vec![(Side::Left, &**inner)],
                Expr::And(l, r) | Expr::Or(l, r) | Expr::Implies(l, r) => vec![(Side::Left, &**l), (Side::Right, &**r)],
            };
            for (side, child) in children.into_iter().rev() {
                let mut child_path = path.clone();
                child_path.push(side);
                stack.push((child, Some((id, side)), child_path));
            }
        }

        if config.align_leaves && leaves.len() > 1 {
            write!(dot, "{{ rank=same;")?;
            for id in &leaves {
                write!(dot, " {};", id)?;
            }
            writeln!(dot, " }}")?;
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(s: &str) -> Expr {
        s.parse().unwrap()
    }

    #[test]
    fn test_to_dot_basic() {
        let dot = e("~(p ^ q)").to_dot().unwrap();
        println!("{}", dot);
        assert!(dot.starts_with("graph {"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("0 [shape=circle, label=\"¬\"];"));
        assert!(dot.contains("1 [shape=circle, label=\"^\"];"));
        assert!(dot.contains("2 [shape=box, label=\"p\"];"));
        assert!(dot.contains("0 -- 1 [style=solid];"));
        assert!(dot.contains("1 -- 3 [style=dashed];"));
        assert!(dot.contains("{ rank=same; 2; 3; }"));
    }

    #[test]
    fn test_to_dot_single_leaf() {
        let dot = e("T").to_dot().unwrap();
        assert!(dot.contains("0 [shape=square, label=\"T\"];"));
        assert!(!dot.contains("--"));
        assert!(!dot.contains("rank=same"));
    }

    #[test]
    fn test_to_dot_highlight() {
        let config = DotConfig::default();
        let dot = e("p v ~~q").to_dot_with_config(&config, Some(&[Side::Right])).unwrap();
        assert!(dot.contains("0 [shape=circle, label=\"v\", style=filled, fillcolor=lightblue];"));
        assert!(dot.contains("2 [shape=circle, label=\"¬\", style=filled, fillcolor=lightblue];"));
        assert!(dot.contains("3 [shape=circle, label=\"¬\"];"));
        assert!(dot.contains("1 [shape=box, label=\"p\"];"));
    }

    #[test]
    fn test_to_dot_with_config() {
        let config = DotConfig {
            operator_shape: "ellipse",
            align_leaves: false,
            ..DotConfig::default()
        };
        let dot = e("p -> q").to_dot_with_config(&config, None).unwrap();
        assert!(dot.contains("0 [shape=ellipse, label=\"→\"];"));
        assert!(!dot.contains("rank=same"));
    }

    /// Writes a DOT file for manual inspection.
    #[test]
    #[ignore]
    fn test_write_dot_file() {
        let dot = e("(p ^ q) v (p ^ ~q)").to_dot().unwrap();
        std::fs::write("test_output.dot", &dot).unwrap();
        println!("DOT output:\n{}", dot);
    }
}
