//! Semantic analysis: scopes, struct tags, declarators and name checks

pub mod analyzer;
pub mod declarator;
pub mod registrar;
pub mod scope;
pub mod structs;
mod summary;

pub use analyzer::{analyze, Analysis, SemanticAnalyzer};
pub use declarator::{parse_bound, Declared};
pub use registrar::{classify, Binding};
pub use scope::{Symbol, SymbolKind, SymbolTable};
pub use structs::StructRegistry;
