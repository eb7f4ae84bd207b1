//! Scope chain and symbols

use std::collections::HashMap;

use log::debug;

use crate::types::Type;
use crate::utils::Span;

/// Kind of symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Variable,
    Function,
}

/// Symbol information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: Type,
    /// Always true for variables; for functions, whether a body has been seen
    pub defined: bool,
    /// Site of the identifier that introduced the symbol
    pub span: Span,
}

impl Symbol {
    pub fn variable(name: impl Into<String>, ty: Type, span: Span) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Variable,
            ty,
            defined: true,
            span,
        }
    }

    pub fn function(name: impl Into<String>, ty: Type, defined: bool, span: Span) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Function,
            ty,
            defined,
            span,
        }
    }
}

/// A scope containing symbols
#[derive(Debug, Default)]
struct Scope {
    symbols: HashMap<String, Symbol>,
}

/// Stack of lexical scopes; the bottom frame is the file scope.
///
/// A popped scope is dropped together with its bindings.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    /// Enter a new scope
    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::default());
        debug!("enter scope (depth {})", self.depth());
    }

    /// Exit the current scope.
    ///
    /// Panics when asked to pop the file scope.
    pub fn exit_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot exit the file scope");
        self.scopes.pop();
        debug!("exit scope (depth {})", self.depth());
    }

    /// Number of scopes below the current one; 0 at file scope
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn is_file_scope(&self) -> bool {
        self.scopes.len() == 1
    }

    /// Bind a symbol in the current scope, replacing any same-named binding there
    pub fn insert(&mut self, symbol: Symbol) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.symbols.insert(symbol.name.clone(), symbol);
        }
    }

    /// Bind a symbol in the file scope
    pub fn insert_global(&mut self, symbol: Symbol) {
        self.scopes[0].symbols.insert(symbol.name.clone(), symbol);
    }

    /// Look up a symbol, searching from current scope upward
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.symbols.get(name))
    }

    /// Look up a symbol only in the current scope
    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.scopes.last().and_then(|scope| scope.symbols.get(name))
    }

    /// Look up a symbol only in the file scope
    pub fn lookup_global(&self, name: &str) -> Option<&Symbol> {
        self.scopes[0].symbols.get(name)
    }

    pub fn lookup_global_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.scopes[0].symbols.get_mut(name)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
