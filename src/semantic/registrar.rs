//! Definition/declaration registration
//!
//! Every name entering a scope goes through here. Errors are reported as
//! they are found and the offending binding is dropped; analysis continues.

use std::collections::HashSet;

use log::debug;

use crate::frontend::ast::Ident;
use crate::semantic::analyzer::SemanticAnalyzer;
use crate::semantic::declarator::Declared;
use crate::semantic::scope::{Symbol, SymbolKind};
use crate::types::Type;
use crate::utils::SemanticErrorKind;

/// Outcome of binding a name in the file scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Name is free: insert a new symbol
    Insert,
    /// Declared function receives its first body
    Define,
    /// Clash with the existing binding
    Reject(SemanticErrorKind),
}

/// Classify a new file-scope occurrence against the existing binding.
///
/// `existing` is the kind and defined-state of the current binding, if any.
/// Variables are always defining occurrences.
pub fn classify(existing: Option<(SymbolKind, bool)>, kind: SymbolKind, defining: bool) -> Binding {
    let Some((existing_kind, existing_defined)) = existing else {
        return Binding::Insert;
    };

    match (existing_kind, kind) {
        (SymbolKind::Variable, SymbolKind::Variable) => {
            Binding::Reject(SemanticErrorKind::Redefinition)
        }
        (SymbolKind::Function, SymbolKind::Variable) => {
            Binding::Reject(SemanticErrorKind::Redeclaration)
        }
        (SymbolKind::Variable, SymbolKind::Function) => {
            if defining {
                Binding::Reject(SemanticErrorKind::Redefinition)
            } else {
                Binding::Reject(SemanticErrorKind::Redeclaration)
            }
        }
        (SymbolKind::Function, SymbolKind::Function) => {
            if !defining {
                Binding::Reject(SemanticErrorKind::Redeclaration)
            } else if existing_defined {
                Binding::Reject(SemanticErrorKind::Redefinition)
            } else {
                Binding::Define
            }
        }
    }
}

/// A global whose struct type may still be completed later in the file
#[derive(Debug, Clone)]
pub(crate) struct PendingGlobal {
    pub ident: Ident,
    pub ty: Type,
}

impl SemanticAnalyzer<'_> {
    /// Define a variable (global, local or parameter) in the current scope
    pub(crate) fn define_variable(&mut self, ident: &Ident, ty: Type) {
        // An array of incomplete structs is never acceptable
        if ty.is_array() && self.structs.is_incomplete(&ty) {
            self.report(SemanticErrorKind::IncompleteTypeDefinition, ident);
            return;
        }

        let at_file_scope = self.symbols.is_file_scope();
        let deferred = !ty.is_array() && self.structs.is_incomplete(&ty);
        if deferred && !at_file_scope {
            self.report(SemanticErrorKind::IncompleteTypeDefinition, ident);
            return;
        }

        if at_file_scope {
            let existing = self
                .symbols
                .lookup_global(&ident.name)
                .map(|s| (s.kind, s.defined));
            if let Binding::Reject(kind) = classify(existing, SymbolKind::Variable, true) {
                self.report(kind, ident);
                return;
            }

            debug!("global variable {}: {}", ident.name, ty);
            if deferred {
                self.pending.push(PendingGlobal {
                    ident: ident.clone(),
                    ty: ty.clone(),
                });
            }
            self.symbols
                .insert_global(Symbol::variable(ident.name.clone(), ty, ident.span));
            self.record_global(&ident.name);
        } else {
            // Shadowing an outer scope is fine; only this scope can clash
            if self.symbols.lookup_local(&ident.name).is_some() {
                self.report(SemanticErrorKind::Redefinition, ident);
                return;
            }
            debug!("local variable {}: {} (depth {})", ident.name, ty, self.symbols.depth());
            self.symbols
                .insert(Symbol::variable(ident.name.clone(), ty, ident.span));
        }
    }

    /// Declare (`has_body == false`) or define a function at file scope
    pub(crate) fn declare_function(&mut self, ident: &Ident, ty: Type, has_body: bool) {
        let existing = self
            .symbols
            .lookup_global(&ident.name)
            .map(|s| (s.kind, s.defined));

        match classify(existing, SymbolKind::Function, has_body) {
            Binding::Insert => {
                debug!("function {}: {} (body: {})", ident.name, ty, has_body);
                self.symbols.insert_global(Symbol::function(
                    ident.name.clone(),
                    ty,
                    has_body,
                    ident.span,
                ));
                self.record_global(&ident.name);
            }
            Binding::Define => {
                debug!("function {} defined after declaration: {}", ident.name, ty);
                if let Some(symbol) = self.symbols.lookup_global_mut(&ident.name) {
                    symbol.ty = ty;
                    symbol.defined = true;
                }
            }
            Binding::Reject(kind) => self.report(kind, ident),
        }
    }

    /// Duplicate-name check for the parameters of a bodyless declaration.
    ///
    /// Nothing is bound; only the first duplicate is reported.
    pub(crate) fn check_param_list(&mut self, params: &[Declared]) {
        let mut seen: HashSet<&str> = HashSet::new();
        for param in params {
            if !seen.insert(param.ident.name.as_str()) {
                self.report(SemanticErrorKind::Redefinition, &param.ident);
                return;
            }
        }
    }

    /// A direct name reference must resolve somewhere in the scope chain
    pub(crate) fn check_ident(&mut self, ident: &Ident) {
        if self.symbols.lookup(&ident.name).is_none() {
            self.report(SemanticErrorKind::UndeclaredUse, ident);
        }
    }

    /// Re-test globals accepted with an incomplete struct type
    pub(crate) fn check_pending_globals(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for global in &pending {
            if self.structs.is_incomplete(&global.ty) {
                self.report(SemanticErrorKind::IncompleteTypeDefinition, &global.ident);
            } else {
                debug!("deferred global {} completed: {}", global.ident.name, global.ty);
            }
        }
    }

    fn record_global(&mut self, name: &str) {
        if !self.globals.iter().any(|g| g == name) {
            self.globals.push(name.to_string());
        }
    }
}
