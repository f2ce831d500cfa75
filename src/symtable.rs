// File: src/symtable.rs
//
// Compile-time symbol table used by the parser.
// A SymTable is one scope level with an optional link to its enclosing
// table; lookups walk outward until the name is found or the chain ends.

use std::collections::HashMap;

/// What a registered name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Builtin,
    Function,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Symbol { name: name.into(), kind }
    }
}

#[derive(Debug, Default)]
pub struct SymTable {
    table: HashMap<String, Symbol>,
    prev: Option<Box<SymTable>>,
}

impl SymTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table nested inside `prev`
    pub fn with_parent(prev: SymTable) -> Self {
        SymTable { table: HashMap::new(), prev: Some(Box::new(prev)) }
    }

    /// Inserts a symbol in this level; returns false if the name already
    /// exists at this level (the existing entry is kept)
    pub fn insert(&mut self, symbol: Symbol) -> bool {
        if self.table.contains_key(&symbol.name) {
            return false;
        }
        self.table.insert(symbol.name.clone(), symbol);
        true
    }

    pub fn find(&self, name: &str) -> Option<&Symbol> {
        let mut current = Some(self);
        while let Some(scope) = current {
            if let Some(symbol) = scope.table.get(name) {
                return Some(symbol);
            }
            current = scope.prev.as_deref();
        }
        None
    }

    /// Detaches and returns the enclosing table
    #[cfg(test)]
    pub fn into_parent(self) -> Option<SymTable> {
        self.prev.map(|p| *p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_outward() {
        let mut global = SymTable::new();
        assert!(global.insert(Symbol::new("print", SymbolKind::Builtin)));
        let mut inner = SymTable::with_parent(global);
        assert!(inner.insert(Symbol::new("helper", SymbolKind::Function)));

        assert_eq!(inner.find("print").map(|s| s.kind), Some(SymbolKind::Builtin));
        assert_eq!(inner.find("helper").map(|s| s.kind), Some(SymbolKind::Function));
        assert!(inner.find("missing").is_none());

        let global = inner.into_parent().expect("parent table");
        assert!(global.find("helper").is_none());
    }

    #[test]
    fn test_insert_keeps_first_entry() {
        let mut table = SymTable::new();
        assert!(table.insert(Symbol::new("f", SymbolKind::Function)));
        assert!(!table.insert(Symbol::new("f", SymbolKind::Builtin)));
        assert_eq!(table.find("f").map(|s| s.kind), Some(SymbolKind::Function));
    }
}
