//! Structured Feedback Module
//!
//! Machine-readable output of one analysis run:
//! - JSON diagnostics with stable error codes
//! - File-scope symbol and struct listings

use serde::{Deserialize, Serialize};

use crate::semantic::{Analysis, Symbol};
use crate::types::StructDef;
use crate::utils::{SemanticError, SemanticErrorKind, Span};

// ==================== Structured Error Report ====================

/// A single semantic diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Error code (e.g., "E0001")
    pub code: String,

    pub kind: SemanticErrorKind,

    /// Human-readable message, same text as the plain-text output
    pub message: String,

    /// Offending identifier
    pub name: String,

    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl From<Span> for Location {
    fn from(span: Span) -> Self {
        Self {
            line: span.line,
            column: span.column,
        }
    }
}

impl ErrorReport {
    pub fn from_error(error: &SemanticError) -> Self {
        Self {
            code: error.kind().code().to_string(),
            kind: error.kind(),
            message: error.to_string(),
            name: error.name.clone(),
            location: error.span().into(),
        }
    }
}

// ==================== Symbol Listing ====================

/// A file-scope name and its rendered type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub location: Location,
}

impl SymbolEntry {
    fn from_symbol(symbol: &Symbol, analysis: &Analysis) -> Self {
        Self {
            name: symbol.name.clone(),
            ty: analysis.render_type(symbol),
            location: symbol.span.into(),
        }
    }
}

/// A struct tag as known at the end of analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructEntry {
    pub tag: String,
    pub complete: bool,
    /// Full form, e.g. `struct P{int x;}`
    pub layout: String,
}

impl From<&StructDef> for StructEntry {
    fn from(def: &StructDef) -> Self {
        Self {
            tag: def.tag.clone(),
            complete: def.complete,
            layout: def.full_form(),
        }
    }
}

// ==================== Analysis Report ====================

/// Complete feedback for one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// True when no semantic error was reported
    pub success: bool,

    pub source_file: String,

    /// Errors in the order they were reported
    pub diagnostics: Vec<ErrorReport>,

    pub variables: Vec<SymbolEntry>,

    pub functions: Vec<SymbolEntry>,

    /// Struct tags in first-mention order
    pub structs: Vec<StructEntry>,
}

impl AnalysisReport {
    pub fn new(source_file: impl Into<String>, analysis: &Analysis, errors: &[SemanticError]) -> Self {
        Self {
            success: errors.is_empty(),
            source_file: source_file.into(),
            diagnostics: errors.iter().map(ErrorReport::from_error).collect(),
            variables: analysis
                .variables()
                .map(|s| SymbolEntry::from_symbol(s, analysis))
                .collect(),
            functions: analysis
                .functions()
                .map(|s| SymbolEntry::from_symbol(s, analysis))
                .collect(),
            structs: analysis.structs.iter().map(StructEntry::from).collect(),
        }
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
