//! Token definitions for SPL-C

use crate::utils::Span;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn eof(span: Span) -> Self {
        Self { kind: TokenKind::Eof, span }
    }
}

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ============ Keywords ============
    /// int
    Int,
    /// char
    Char,
    /// struct
    Struct,
    /// return
    Return,
    /// if
    If,
    /// else
    Else,
    /// while
    While,
    /// break
    Break,
    /// continue
    Continue,

    // ============ Identifiers and Literals ============
    /// Identifier (variable, function, struct tag or member name)
    Ident(String),
    /// Integer literal, kept as written so array bounds can be validated later
    IntLit(String),
    /// Character literal
    CharLit(char),
    /// String literal
    StringLit(String),

    // ============ Operators ============
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// =
    Eq,
    /// ==
    EqEq,
    /// !=
    Ne,
    /// <
    Lt,
    /// <=
    Le,
    /// >
    Gt,
    /// >=
    Ge,
    /// &&
    AndAnd,
    /// ||
    OrOr,
    /// !
    Not,
    /// &
    And,
    /// |
    Or,
    /// ^
    Caret,
    /// ~
    Tilde,
    /// <<
    Shl,
    /// >>
    Shr,
    /// ->
    Arrow,
    /// .
    Dot,

    // ============ Delimiters ============
    /// (
    LParen,
    /// )
    RParen,
    /// {
    LBrace,
    /// }
    RBrace,
    /// [
    LBracket,
    /// ]
    RBracket,
    /// ,
    Comma,
    /// ;
    Semicolon,

    // ============ Special ============
    Eof,
    Unknown(char),
}

impl TokenKind {
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "int" => Some(TokenKind::Int),
            "char" => Some(TokenKind::Char),
            "struct" => Some(TokenKind::Struct),
            "return" => Some(TokenKind::Return),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "break" => Some(TokenKind::Break),
            "continue" => Some(TokenKind::Continue),
            _ => None,
        }
    }

    /// True for tokens that can start a type specifier
    pub fn starts_specifier(&self) -> bool {
        matches!(self, TokenKind::Int | TokenKind::Char | TokenKind::Struct)
    }

    pub fn binary_precedence(&self) -> Option<u8> {
        match self {
            // Assignment (lowest)
            TokenKind::Eq => Some(1),

            // Logical OR
            TokenKind::OrOr => Some(2),

            // Logical AND
            TokenKind::AndAnd => Some(3),

            // Bitwise OR
            TokenKind::Or => Some(4),

            // Bitwise XOR
            TokenKind::Caret => Some(5),

            // Bitwise AND
            TokenKind::And => Some(6),

            // Equality
            TokenKind::EqEq | TokenKind::Ne => Some(7),

            // Comparison
            TokenKind::Lt | TokenKind::Le | TokenKind::Gt | TokenKind::Ge => Some(8),

            // Shift
            TokenKind::Shl | TokenKind::Shr => Some(9),

            // Additive
            TokenKind::Plus | TokenKind::Minus => Some(10),

            // Multiplicative (highest for binary)
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some(11),

            _ => None,
        }
    }
}
