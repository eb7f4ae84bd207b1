//! Error handling for the SPL-C analyzer

use std::fmt;

use crate::utils::Span;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal error: the run cannot produce a program tree
#[derive(Error, Debug, Clone)]
pub enum Error {
    // ==================== Parser Errors ====================

    #[error("Unexpected token: expected {expected}, got {got}")]
    UnexpectedToken {
        expected: String,
        got: String,
        span: Span,
    },

    #[error("Expected identifier")]
    ExpectedIdent { span: Span },

    #[error("Expected type specifier")]
    ExpectedSpecifier { span: Span },

    #[error("Expected declarator")]
    ExpectedDeclarator { span: Span },

    #[error("Expected expression")]
    ExpectedExpr { span: Span },

    #[error("Expected array size")]
    ExpectedArraySize { span: Span },

    #[error("Invalid character '{ch}'")]
    InvalidCharacter { ch: char, span: Span },
}

impl Error {
    /// Get the span associated with this error
    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::InvalidCharacter { span, .. } => *span,
            Self::ExpectedIdent { span }
            | Self::ExpectedSpecifier { span }
            | Self::ExpectedDeclarator { span }
            | Self::ExpectedExpr { span }
            | Self::ExpectedArraySize { span } => *span,
        }
    }
}

// ==================== Semantic Errors ====================

/// The four reportable semantic error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticErrorKind {
    Redeclaration,
    Redefinition,
    UndeclaredUse,
    IncompleteTypeDefinition,
}

impl SemanticErrorKind {
    /// Stable diagnostic code used by the JSON report
    pub fn code(&self) -> &'static str {
        match self {
            Self::Redeclaration => "E0001",
            Self::Redefinition => "E0002",
            Self::UndeclaredUse => "E0003",
            Self::IncompleteTypeDefinition => "E0004",
        }
    }
}

impl fmt::Display for SemanticErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Redeclaration => "Redeclaration of",
            Self::Redefinition => "Redefinition of",
            Self::UndeclaredUse => "Undeclared use of",
            Self::IncompleteTypeDefinition => "Definition of incomplete type for",
        };
        f.write_str(text)
    }
}

/// A semantic error, anchored at the offending identifier.
///
/// These never abort analysis; they are handed to an [`ErrorSink`] as soon as
/// they are discovered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Error at line {}: {} '{}'", .span.line, .kind, .name)]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub name: String,
    pub span: Span,
}

impl SemanticError {
    pub fn new(kind: SemanticErrorKind, name: impl Into<String>, span: Span) -> Self {
        Self { kind, name: name.into(), span }
    }

    pub fn kind(&self) -> SemanticErrorKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

/// Receiver of semantic errors as the analyzer discovers them
pub trait ErrorSink {
    fn report(&mut self, error: SemanticError);
}

impl ErrorSink for Vec<SemanticError> {
    fn report(&mut self, error: SemanticError) {
        self.push(error);
    }
}
