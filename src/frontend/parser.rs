//! Parser for SPL-C
//!
//! Recursive descent parser with Pratt parsing for expressions.

use crate::frontend::ast::*;
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Result, Span};

/// The parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a new parser from a lexer
    pub fn new(mut lexer: Lexer) -> Self {
        Self {
            tokens: lexer.tokenize(),
            pos: 0,
        }
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos + 1).map(|t| &t.kind)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Span of the most recently consumed token
    fn prev_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn unexpected(&self, expected: &str) -> Error {
        let token = self.current();
        match token.kind {
            TokenKind::Unknown(ch) => Error::InvalidCharacter { ch, span: token.span },
            _ => Error::UnexpectedToken {
                expected: expected.to_string(),
                got: format!("{:?}", token.kind),
                span: token.span,
            },
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("{:?}", expected)))
        }
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ==================== Top-level Items ====================

    /// Parse a complete program
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut items = Vec::new();

        while !self.is_at_end() {
            items.push(self.parse_item()?);
        }

        Ok(Program { items })
    }

    /// Parse a top-level item
    fn parse_item(&mut self) -> Result<Item> {
        let start = self.current().span;
        let specifier = self.parse_specifier()?;

        if self.consume(&TokenKind::Semicolon) {
            return Ok(Item::StructDecl(specifier));
        }

        let is_function = matches!(self.current_kind(), TokenKind::Ident(_))
            && matches!(self.peek_kind(), Some(TokenKind::LParen));
        if is_function {
            let name = self.parse_ident()?;
            self.expect(TokenKind::LParen)?;
            let params = self.parse_params()?;
            self.expect(TokenKind::RParen)?;

            let mut sig = FunctionSig {
                ret: specifier,
                name,
                params,
                span: start.merge(&self.prev_span()),
            };

            if self.check(&TokenKind::LBrace) {
                let body = self.parse_block()?;
                sig.span = start.merge(&body.span);
                return Ok(Item::FunctionDef(FunctionDef { sig, body }));
            }

            self.expect(TokenKind::Semicolon)?;
            return Ok(Item::FunctionDecl(sig));
        }

        let declarator = self.parse_declarator()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Item::GlobalVar(Decl {
            specifier,
            declarator,
            span: start.merge(&self.prev_span()),
        }))
    }

    fn parse_params(&mut self) -> Result<Vec<Decl>> {
        let mut params = Vec::new();

        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            params.push(self.parse_decl()?);
            if !self.consume(&TokenKind::Comma) {
                break;
            }
        }

        Ok(params)
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.current().clone();
        match &token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Ident::new(name.clone(), token.span))
            }
            TokenKind::Unknown(ch) => Err(Error::InvalidCharacter { ch: *ch, span: token.span }),
            _ => Err(Error::ExpectedIdent { span: token.span }),
        }
    }

    // ==================== Declarations ====================

    /// `specifier declarator`
    fn parse_decl(&mut self) -> Result<Decl> {
        let start = self.current().span;
        let specifier = self.parse_specifier()?;
        let declarator = self.parse_declarator()?;
        Ok(Decl {
            specifier,
            declarator,
            span: start.merge(&self.prev_span()),
        })
    }

    fn parse_specifier(&mut self) -> Result<Specifier> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Int => {
                self.advance();
                Ok(Specifier::Int(token.span))
            }
            TokenKind::Char => {
                self.advance();
                Ok(Specifier::Char(token.span))
            }
            TokenKind::Struct => {
                self.advance();
                let tag = self.parse_ident()?;

                let members = if self.consume(&TokenKind::LBrace) {
                    let mut members = Vec::new();
                    while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                        members.push(self.parse_decl()?);
                        self.expect(TokenKind::Semicolon)?;
                    }
                    self.expect(TokenKind::RBrace)?;
                    Some(members)
                } else {
                    None
                };

                Ok(Specifier::Struct {
                    tag,
                    members,
                    span: token.span.merge(&self.prev_span()),
                })
            }
            TokenKind::Unknown(ch) => Err(Error::InvalidCharacter { ch, span: token.span }),
            _ => Err(Error::ExpectedSpecifier { span: token.span }),
        }
    }

    /// `'*' declarator | direct ('[' size ']')*`
    fn parse_declarator(&mut self) -> Result<Declarator> {
        if self.check(&TokenKind::Star) {
            let star = self.advance();
            let inner = self.parse_declarator()?;
            return Ok(Declarator::Pointer {
                inner: Box::new(inner),
                span: star.span.merge(&self.prev_span()),
            });
        }

        let start = self.current().span;
        let mut declarator = match self.current_kind() {
            TokenKind::Ident(_) => Declarator::Ident(self.parse_ident()?),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_declarator()?;
                self.expect(TokenKind::RParen)?;
                Declarator::Paren {
                    inner: Box::new(inner),
                    span: start.merge(&self.prev_span()),
                }
            }
            TokenKind::Unknown(ch) => {
                return Err(Error::InvalidCharacter { ch: *ch, span: start });
            }
            _ => return Err(Error::ExpectedDeclarator { span: start }),
        };

        while self.consume(&TokenKind::LBracket) {
            let size = self.parse_array_size()?;
            self.expect(TokenKind::RBracket)?;
            declarator = Declarator::Array {
                inner: Box::new(declarator),
                size,
                span: start.merge(&self.prev_span()),
            };
        }

        Ok(declarator)
    }

    fn parse_array_size(&mut self) -> Result<ArraySize> {
        let start = self.current().span;
        let negative = self.consume(&TokenKind::Minus);

        let text = match self.current_kind() {
            TokenKind::IntLit(text) => text.clone(),
            _ => return Err(Error::ExpectedArraySize { span: self.current().span }),
        };
        self.advance();

        Ok(ArraySize {
            text: if negative { format!("-{}", text) } else { text },
            span: start.merge(&self.prev_span()),
        })
    }

    // ==================== Statements ====================

    fn parse_block(&mut self) -> Result<Block> {
        let start = self.current().span;
        self.expect(TokenKind::LBrace)?;

        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_stmt()?);
        }

        self.expect(TokenKind::RBrace)?;

        Ok(Block {
            stmts,
            span: start.merge(&self.prev_span()),
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        let start = self.current().span;

        if self.current_kind().starts_specifier() {
            return self.parse_var_decl_stmt();
        }

        match self.current_kind() {
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Return {
                    value,
                    span: start.merge(&self.prev_span()),
                })
            }
            TokenKind::If => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let cond = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                let then_branch = Box::new(self.parse_stmt()?);
                let else_branch = if self.consume(&TokenKind::Else) {
                    Some(Box::new(self.parse_stmt()?))
                } else {
                    None
                };
                Ok(Stmt::If {
                    cond,
                    then_branch,
                    else_branch,
                    span: start.merge(&self.prev_span()),
                })
            }
            TokenKind::While => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let cond = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                let body = Box::new(self.parse_stmt()?);
                Ok(Stmt::While {
                    cond,
                    body,
                    span: start.merge(&self.prev_span()),
                })
            }
            TokenKind::Break => {
                self.advance();
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Break { span: start })
            }
            TokenKind::Continue => {
                self.advance();
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Continue { span: start })
            }
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::Empty { span: start })
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_var_decl_stmt(&mut self) -> Result<Stmt> {
        let start = self.current().span;
        let decl = self.parse_decl()?;

        let init = if self.consume(&TokenKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;

        Ok(Stmt::VarDecl {
            decl,
            init,
            span: start.merge(&self.prev_span()),
        })
    }

    // ==================== Expression Parsing (Pratt) ====================

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(0)
    }

    /// Parse expression with binding power (Pratt parsing)
    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let op_token = self.current().clone();
            let Some(bp) = op_token.kind.binary_precedence() else {
                break;
            };

            if bp < min_bp {
                break;
            }

            self.advance();
            let op = Self::token_to_binop(&op_token)?;

            // Right-associative for assignment
            let next_bp = if op == BinOp::Assign { bp } else { bp + 1 };

            let right = self.parse_expr_bp(next_bp)?;
            let span = left.span().merge(&right.span());

            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let token = self.current().clone();
        let op = match token.kind {
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Not => UnOp::Not,
            TokenKind::Tilde => UnOp::BitNot,
            TokenKind::Star => UnOp::Deref,
            TokenKind::And => UnOp::AddrOf,
            _ => {
                let primary = self.parse_primary()?;
                return self.parse_postfix(primary);
            }
        };

        self.advance();
        let expr = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            span: token.span.merge(&expr.span()),
            expr: Box::new(expr),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let token = self.current().clone();

        let expr = match token.kind {
            TokenKind::Ident(_) => Expr::Ident(self.parse_ident()?),
            TokenKind::IntLit(text) => {
                self.advance();
                Expr::Literal(Literal::Int(text, token.span))
            }
            TokenKind::CharLit(c) => {
                self.advance();
                Expr::Literal(Literal::Char(c, token.span))
            }
            TokenKind::StringLit(s) => {
                self.advance();
                Expr::Literal(Literal::String(s, token.span))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                inner
            }
            TokenKind::Unknown(ch) => {
                return Err(Error::InvalidCharacter { ch, span: token.span });
            }
            _ => return Err(Error::ExpectedExpr { span: token.span }),
        };

        Ok(expr)
    }

    fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr> {
        loop {
            if self.consume(&TokenKind::LParen) {
                let mut args = Vec::new();
                while !self.check(&TokenKind::RParen) && !self.is_at_end() {
                    args.push(self.parse_expr()?);
                    if !self.consume(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen)?;
                expr = Expr::Call {
                    span: expr.span().merge(&self.prev_span()),
                    func: Box::new(expr),
                    args,
                };
            } else if self.consume(&TokenKind::LBracket) {
                let index = self.parse_expr()?;
                self.expect(TokenKind::RBracket)?;
                expr = Expr::Index {
                    span: expr.span().merge(&self.prev_span()),
                    expr: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.check(&TokenKind::Dot) || self.check(&TokenKind::Arrow) {
                let arrow = self.advance().kind == TokenKind::Arrow;
                let field = self.parse_ident()?;
                expr = Expr::Member {
                    span: expr.span().merge(&field.span),
                    expr: Box::new(expr),
                    field,
                    arrow,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn token_to_binop(token: &Token) -> Result<BinOp> {
        let op = match token.kind {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::Percent => BinOp::Mod,
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::Ne => BinOp::Ne,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Le => BinOp::Le,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::Ge => BinOp::Ge,
            TokenKind::AndAnd => BinOp::And,
            TokenKind::OrOr => BinOp::Or,
            TokenKind::And => BinOp::BitAnd,
            TokenKind::Or => BinOp::BitOr,
            TokenKind::Caret => BinOp::BitXor,
            TokenKind::Shl => BinOp::Shl,
            TokenKind::Shr => BinOp::Shr,
            TokenKind::Eq => BinOp::Assign,
            _ => {
                return Err(Error::UnexpectedToken {
                    expected: "binary operator".to_string(),
                    got: format!("{:?}", token.kind),
                    span: token.span,
                })
            }
        };
        Ok(op)
    }
}

/// Lex and parse `source` into a program tree
pub fn parse_source(source: &str) -> Result<Program> {
    Parser::new(Lexer::new(source)).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Result<Program> {
        parse_source(source)
    }

    fn single_global(source: &str) -> Decl {
        let program = parse(source).unwrap();
        assert_eq!(program.items.len(), 1);
        match program.items.into_iter().next().unwrap() {
            Item::GlobalVar(decl) => decl,
            other => panic!("expected global variable, got {:?}", other),
        }
    }

    /// Compact rendering of a declarator tree for assertions
    fn shape(declarator: &Declarator) -> String {
        match declarator {
            Declarator::Ident(ident) => ident.name.clone(),
            Declarator::Array { inner, size, .. } => format!("array({}, {})", shape(inner), size.text),
            Declarator::Pointer { inner, .. } => format!("ptr({})", shape(inner)),
            Declarator::Paren { inner, .. } => format!("paren({})", shape(inner)),
        }
    }

    #[test]
    fn test_empty_function() {
        let program = parse("int main() {}").unwrap();
        assert_eq!(program.items.len(), 1);
        assert!(matches!(program.items[0], Item::FunctionDef(_)));
    }

    #[test]
    fn test_function_declaration_with_params() {
        let program = parse("int add(int a, char *b[2]);").unwrap();
        match &program.items[0] {
            Item::FunctionDecl(sig) => {
                assert_eq!(sig.name.name, "add");
                assert_eq!(sig.params.len(), 2);
                assert_eq!(shape(&sig.params[1].declarator), "ptr(array(b, 2))");
            }
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_declarator_shapes() {
        assert_eq!(shape(&single_global("int a;").declarator), "a");
        assert_eq!(shape(&single_global("int a[10][20];").declarator), "array(array(a, 10), 20)");
        assert_eq!(shape(&single_global("int *a[3];").declarator), "ptr(array(a, 3))");
        assert_eq!(shape(&single_global("int (*a)[3];").declarator), "array(paren(ptr(a)), 3)");
        assert_eq!(shape(&single_global("int **p;").declarator), "ptr(ptr(p))");
        assert_eq!(shape(&single_global("int a[-4];").declarator), "array(a, -4)");
    }

    #[test]
    fn test_declarator_ident() {
        let decl = single_global("char *(*name)[4];");
        assert_eq!(decl.declarator.ident().name, "name");
    }

    #[test]
    fn test_struct_forms() {
        let program = parse("struct S; struct S { int x; char *y; }; struct S s;").unwrap();
        assert_eq!(program.items.len(), 3);
        match &program.items[1] {
            Item::StructDecl(Specifier::Struct { tag, members: Some(members), .. }) => {
                assert_eq!(tag.name, "S");
                assert_eq!(members.len(), 2);
            }
            other => panic!("expected struct definition, got {:?}", other),
        }
        assert!(matches!(
            &program.items[0],
            Item::StructDecl(Specifier::Struct { members: None, .. })
        ));
        assert!(matches!(&program.items[2], Item::GlobalVar(_)));
    }

    #[test]
    fn test_statements() {
        let source = "int main() {
            int x = 1;
            { char c; }
            if (x > 0) x = x - 1; else { return 0; }
            while (x) { x = x - 1; break; }
            ;
            return x;
        }";
        let program = parse(source).unwrap();
        let Item::FunctionDef(def) = &program.items[0] else {
            panic!("expected function definition");
        };
        assert_eq!(def.body.stmts.len(), 6);
        assert!(matches!(def.body.stmts[0], Stmt::VarDecl { init: Some(_), .. }));
        assert!(matches!(def.body.stmts[1], Stmt::Block(_)));
        assert!(matches!(def.body.stmts[2], Stmt::If { else_branch: Some(_), .. }));
        assert!(matches!(def.body.stmts[3], Stmt::While { .. }));
        assert!(matches!(def.body.stmts[4], Stmt::Empty { .. }));
        assert!(matches!(def.body.stmts[5], Stmt::Return { value: Some(_), .. }));
    }

    #[test]
    fn test_expression_precedence() {
        let program = parse("int main() { a = b + c * d; }").unwrap();
        let Item::FunctionDef(def) = &program.items[0] else {
            panic!("expected function definition");
        };
        let Stmt::Expr(Expr::Binary { op: BinOp::Assign, right, .. }) = &def.body.stmts[0] else {
            panic!("expected assignment");
        };
        let Expr::Binary { op: BinOp::Add, right: product, .. } = right.as_ref() else {
            panic!("expected addition");
        };
        assert!(matches!(product.as_ref(), Expr::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn test_postfix_expressions() {
        let program = parse("int main() { f(a[1], s.x, p->y, -*q); }").unwrap();
        let Item::FunctionDef(def) = &program.items[0] else {
            panic!("expected function definition");
        };
        let Stmt::Expr(Expr::Call { func, args, .. }) = &def.body.stmts[0] else {
            panic!("expected call");
        };
        assert!(matches!(func.as_ref(), Expr::Ident(id) if id.name == "f"));
        assert_eq!(args.len(), 4);
        assert!(matches!(args[0], Expr::Index { .. }));
        assert!(matches!(args[1], Expr::Member { arrow: false, .. }));
        assert!(matches!(args[2], Expr::Member { arrow: true, .. }));
        assert!(matches!(args[3], Expr::Unary { op: UnOp::Neg, .. }));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse("int a"), Err(Error::UnexpectedToken { .. })));
        assert!(matches!(parse("float x;"), Err(Error::ExpectedSpecifier { .. })));
        assert!(matches!(parse("int a[];"), Err(Error::ExpectedArraySize { .. })));
        assert!(matches!(parse("int 3;"), Err(Error::ExpectedDeclarator { .. })));
        assert!(matches!(parse("int main() { x = ; }"), Err(Error::ExpectedExpr { .. })));
        assert!(matches!(parse("int a @;"), Err(Error::InvalidCharacter { ch: '@', .. })));
    }

    #[test]
    fn test_parse_error_points_at_offending_token() {
        let err = parse("int a;\nint b[];").unwrap_err();
        assert!(matches!(err, Error::ExpectedArraySize { .. }));
        assert_eq!((err.span().line, err.span().column), (2, 7));
    }
}
