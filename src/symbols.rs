//! Variable bindings.
//!
//! A [`SymbolTable`] owns one mutable truth cell per variable name. The parser interns names through
//! the table, so every occurrence of the same name in a tree shares one [`Arc<str>`] and binds to
//! the same cell. The truth-table verifier flips cells in place while enumerating assignments.

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::expr::Expr;

/// Source of truth values for atoms.
pub trait Valuation {
    /// Value bound to `name`, or `None` when the name is unknown.
    fn value(&self, name: &str) -> Option<bool>;
}

impl Valuation for HashMap<String, bool> {
    fn value(&self, name: &str) -> Option<bool> {
        self.get(name).copied()
    }
}

impl Valuation for BTreeMap<String, bool> {
    fn value(&self, name: &str) -> Option<bool> {
        self.get(name).copied()
    }
}

/// Per-expression name to truth-cell map.
///
/// Cells use interior mutability, so a table can be reassigned through a shared reference while
/// expressions are evaluated against it. The table is therefore `!Sync`.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    cells: BTreeMap<Arc<str>, Cell<bool>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding every free variable of `expr`, all unset (false).
    pub fn for_expr(expr: &Expr) -> Self {
        let mut table = Self::new();
        for name in expr.free_variables() {
            table.intern(name);
        }
        table
    }

    /// Returns the shared name for `name`, creating a false cell on first sight.
    pub fn intern(&mut self, name: &str) -> Arc<str> {
        if let Some((key, _)) = self.cells.get_key_value(name) {
            return Arc::clone(key);
        }
        let key: Arc<str> = Arc::from(name);
        self.cells.insert(Arc::clone(&key), Cell::new(false));
        key
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(|k| k.as_ref())
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.cells.get(name).map(Cell::get)
    }

    /// Binds `name` to `value`. Returns `false` if the name is not in the table.
    pub fn set(&self, name: &str, value: bool) -> bool {
        match self.cells.get(name) {
            Some(cell) => {
                cell.set(value);
                true
            }
            None => false,
        }
    }

    /// Resets every cell to false.
    pub fn clear(&self) {
        for cell in self.cells.values() {
            cell.set(false);
        }
    }

    /// Copy of the current bindings.
    pub fn snapshot(&self) -> BTreeMap<String, bool> {
        self.cells.iter().map(|(k, v)| (k.to_string(), v.get())).collect()
    }
}

impl Valuation for SymbolTable {
    fn value(&self, name: &str) -> Option<bool> {
        self.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_intern_shares_name() {
        let mut table = SymbolTable::new();
        let a = table.intern("p");
        let b = table.intern("p");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("p"), Some(false));
    }

    #[test]
    fn test_set_through_shared_reference() {
        let mut table = SymbolTable::new();
        table.intern("q");
        table.intern("p");
        let shared = &table;
        assert!(shared.set("p", true));
        assert!(!shared.set("r", true));
        assert_eq!(table.snapshot().into_iter().collect::<Vec<_>>(), vec![("p".to_string(), true), ("q".to_string(), false)]);
        table.clear();
        assert_eq!(table.get("p"), Some(false));
    }

    #[test]
    fn test_for_expr() {
        let e = Expr::and(Expr::atom("b"), Expr::or(Expr::atom("a"), Expr::tt()));
        let table = SymbolTable::for_expr(&e);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_evaluate_against_table() {
        let mut table = SymbolTable::new();
        let p = table.intern("p");
        let e = Expr::not(Expr::Atom(p));
        assert!(e.evaluate(&table));
        table.set("p", true);
        assert!(!e.evaluate(&table));
    }
}
