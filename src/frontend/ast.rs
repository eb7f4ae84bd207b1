//! Program tree for SPL-C
//!
//! This is the already-parsed input the semantic analyzer consumes.

use crate::utils::Span;

/// A complete program (compilation unit)
#[derive(Debug, Clone)]
pub struct Program {
    pub items: Vec<Item>,
}

/// Top-level items, in source order
#[derive(Debug, Clone)]
pub enum Item {
    /// `specifier name(params) { ... }`
    FunctionDef(FunctionDef),
    /// `specifier name(params);`
    FunctionDecl(FunctionSig),
    /// `specifier declarator;`
    GlobalVar(Decl),
    /// `specifier;` (struct forward declaration or definition)
    StructDecl(Specifier),
}

/// Function header shared by declarations and definitions
#[derive(Debug, Clone)]
pub struct FunctionSig {
    pub ret: Specifier,
    pub name: Ident,
    pub params: Vec<Decl>,
    pub span: Span,
}

/// Function definition
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub sig: FunctionSig,
    pub body: Block,
}

/// A `specifier declarator` pair: parameter, struct member or variable
#[derive(Debug, Clone)]
pub struct Decl {
    pub specifier: Specifier,
    pub declarator: Declarator,
    pub span: Span,
}

/// Base-type portion of a declaration
#[derive(Debug, Clone)]
pub enum Specifier {
    Int(Span),
    Char(Span),
    /// `struct Tag` when `members` is `None`, `struct Tag { ... }` otherwise
    Struct {
        tag: Ident,
        members: Option<Vec<Decl>>,
        span: Span,
    },
}

/// Name-plus-shape portion of a declaration
#[derive(Debug, Clone)]
pub enum Declarator {
    /// `name`
    Ident(Ident),
    /// `declarator [ size ]`
    Array {
        inner: Box<Declarator>,
        size: ArraySize,
        span: Span,
    },
    /// `* declarator`
    Pointer { inner: Box<Declarator>, span: Span },
    /// `( declarator )`
    Paren { inner: Box<Declarator>, span: Span },
}

impl Declarator {
    /// The single identifier at the core of the declarator
    pub fn ident(&self) -> &Ident {
        match self {
            Declarator::Ident(ident) => ident,
            Declarator::Array { inner, .. }
            | Declarator::Pointer { inner, .. }
            | Declarator::Paren { inner, .. } => inner.ident(),
        }
    }
}

/// Array bound exactly as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArraySize {
    pub text: String,
    pub span: Span,
}

/// Code block
#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// Statement
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `{ ... }`
    Block(Block),
    /// `specifier declarator [= expr];`
    VarDecl {
        decl: Decl,
        init: Option<Expr>,
        span: Span,
    },
    /// Expression statement
    Expr(Expr),
    /// `return [expr];`
    Return { value: Option<Expr>, span: Span },
    /// `if (cond) stmt [else stmt]`
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        span: Span,
    },
    /// `while (cond) stmt`
    While {
        cond: Expr,
        body: Box<Stmt>,
        span: Span,
    },
    /// break
    Break { span: Span },
    /// continue
    Continue { span: Span },
    /// Empty statement (;)
    Empty { span: Span },
}

/// Expression
#[derive(Debug, Clone)]
pub enum Expr {
    /// Literal value
    Literal(Literal),
    /// Direct name reference
    Ident(Ident),
    /// Binary operation, including assignment
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
        span: Span,
    },
    /// Unary operation
    Unary {
        op: UnOp,
        expr: Box<Expr>,
        span: Span,
    },
    /// Function call
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    /// Index access (expr[index])
    Index {
        expr: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    /// Member access (`expr.field` or `expr->field`); `field` is not a name reference
    Member {
        expr: Box<Expr>,
        field: Ident,
        arrow: bool,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(lit) => lit.span(),
            Expr::Ident(ident) => ident.span,
            Expr::Binary { span, .. } => *span,
            Expr::Unary { span, .. } => *span,
            Expr::Call { span, .. } => *span,
            Expr::Index { span, .. } => *span,
            Expr::Member { span, .. } => *span,
        }
    }
}

/// Literal value
#[derive(Debug, Clone)]
pub enum Literal {
    Int(String, Span),
    Char(char, Span),
    String(String, Span),
}

impl Literal {
    pub fn span(&self) -> Span {
        match self {
            Literal::Int(_, s) => *s,
            Literal::Char(_, s) => *s,
            Literal::String(_, s) => *s,
        }
    }
}

/// Identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self { name: name.into(), span }
    }
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    // Assignment
    Assign,
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    /// Negation (-)
    Neg,
    /// Logical not (!)
    Not,
    /// Bitwise not (~)
    BitNot,
    /// Dereference (*)
    Deref,
    /// Address-of (&)
    AddrOf,
}
