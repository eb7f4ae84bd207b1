//! Semantic Analysis for SPL-C
//!
//! Performs:
//! - Symbol table management (scopes, definitions)
//! - Struct tag registration and declarator resolution
//! - Redeclaration / redefinition / undeclared-use / incomplete-type checks
//!
//! One pre-order walk over the program in source order. Errors go to the
//! caller's [`ErrorSink`] the moment they are found; only the completeness
//! check for globals of forward-declared struct type waits for the end.

use log::debug;

use crate::frontend::ast::*;
use crate::semantic::declarator::Declared;
use crate::semantic::registrar::PendingGlobal;
use crate::semantic::scope::{Symbol, SymbolKind, SymbolTable};
use crate::semantic::structs::StructRegistry;
use crate::types::Type;
use crate::utils::{ErrorSink, SemanticError, SemanticErrorKind};

/// Semantic analyzer; one instance per program
pub struct SemanticAnalyzer<'s> {
    pub(crate) symbols: SymbolTable,
    pub(crate) structs: StructRegistry,
    /// File-scope names in first-occurrence order
    pub(crate) globals: Vec<String>,
    pub(crate) pending: Vec<PendingGlobal>,
    sink: &'s mut dyn ErrorSink,
}

impl<'s> SemanticAnalyzer<'s> {
    pub fn new(sink: &'s mut dyn ErrorSink) -> Self {
        Self {
            symbols: SymbolTable::new(),
            structs: StructRegistry::new(),
            globals: Vec::new(),
            pending: Vec::new(),
            sink,
        }
    }

    /// Analyze a program and hand back its file-scope symbols
    pub fn analyze(mut self, program: &Program) -> Analysis {
        for item in &program.items {
            self.check_item(item);
        }

        self.check_pending_globals();
        self.finish()
    }

    pub(crate) fn report(&mut self, kind: SemanticErrorKind, ident: &Ident) {
        let error = SemanticError::new(kind, ident.name.clone(), ident.span);
        debug!("{}", error);
        self.sink.report(error);
    }

    fn finish(self) -> Analysis {
        let symbols = self
            .globals
            .iter()
            .filter_map(|name| self.symbols.lookup_global(name).cloned())
            .collect();
        Analysis {
            symbols,
            structs: self.structs,
        }
    }

    // ==================== Items ====================

    fn check_item(&mut self, item: &Item) {
        match item {
            Item::FunctionDef(def) => self.check_function(def),
            Item::FunctionDecl(sig) => self.check_function_decl(sig),
            Item::GlobalVar(decl) => {
                let declared = self.resolve_decl(decl);
                self.define_variable(&declared.ident, declared.ty);
            }
            Item::StructDecl(specifier) => {
                self.resolve_specifier(specifier);
            }
        }
    }

    /// Resolve the return type and parameters of a function header
    fn resolve_signature(&mut self, sig: &FunctionSig) -> (Type, Vec<Declared>) {
        let ret = self.resolve_specifier(&sig.ret);
        let params: Vec<Declared> = sig.params.iter().map(|p| self.resolve_decl(p)).collect();
        let ty = Type::function(ret, params.iter().map(|p| p.ty.clone()).collect());
        (ty, params)
    }

    fn check_function(&mut self, def: &FunctionDef) {
        let (ty, params) = self.resolve_signature(&def.sig);
        self.declare_function(&def.sig.name, ty, true);

        self.symbols.enter_scope();

        // Parameters live in the body scope, so a local may not reuse their names
        for param in params {
            self.define_variable(&param.ident, param.ty);
        }
        for stmt in &def.body.stmts {
            self.check_stmt(stmt);
        }

        self.symbols.exit_scope();
    }

    fn check_function_decl(&mut self, sig: &FunctionSig) {
        let (ty, params) = self.resolve_signature(sig);
        self.check_param_list(&params);
        self.declare_function(&sig.name, ty, false);
    }

    // ==================== Statements ====================

    fn check_block(&mut self, block: &Block) {
        self.symbols.enter_scope();
        for stmt in &block.stmts {
            self.check_stmt(stmt);
        }
        self.symbols.exit_scope();
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => self.check_block(block),
            Stmt::VarDecl { decl, init, .. } => {
                let declared = self.resolve_decl(decl);
                self.define_variable(&declared.ident, declared.ty);
                if let Some(init) = init {
                    self.check_expr(init);
                }
            }
            Stmt::Expr(expr) => self.check_expr(expr),
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    self.check_expr(value);
                }
            }
            Stmt::If { cond, then_branch, else_branch, .. } => {
                self.check_expr(cond);
                self.check_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_stmt(else_branch);
                }
            }
            Stmt::While { cond, body, .. } => {
                self.check_expr(cond);
                self.check_stmt(body);
            }
            Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Empty { .. } => {}
        }
    }

    // ==================== Expressions ====================

    /// Only name resolution; expression types are not computed
    fn check_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {}
            Expr::Ident(ident) => self.check_ident(ident),
            Expr::Binary { left, right, .. } => {
                self.check_expr(left);
                self.check_expr(right);
            }
            Expr::Unary { expr, .. } => self.check_expr(expr),
            Expr::Call { func, args, .. } => {
                self.check_expr(func);
                for arg in args {
                    self.check_expr(arg);
                }
            }
            Expr::Index { expr, index, .. } => {
                self.check_expr(expr);
                self.check_expr(index);
            }
            // The member name belongs to the struct, not to any scope
            Expr::Member { expr, .. } => self.check_expr(expr),
        }
    }
}

/// Result of one analysis run
#[derive(Debug)]
pub struct Analysis {
    /// File-scope symbols in first-occurrence order
    pub symbols: Vec<Symbol>,
    pub structs: StructRegistry,
}

impl Analysis {
    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|s| s.kind == SymbolKind::Variable)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|s| s.kind == SymbolKind::Function)
    }

    /// Full-form rendering of a symbol's type
    pub fn render_type(&self, symbol: &Symbol) -> String {
        symbol.ty.full_form(&self.structs)
    }
}

/// Analyze `program`, reporting semantic errors into `sink`
pub fn analyze(program: &Program, sink: &mut dyn ErrorSink) -> Analysis {
    SemanticAnalyzer::new(sink).analyze(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse_source;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> (Analysis, Vec<SemanticError>) {
        let program = parse_source(source).unwrap();
        let mut errors: Vec<SemanticError> = Vec::new();
        let analysis = analyze(&program, &mut errors);
        (analysis, errors)
    }

    /// (kind, name, line) of each reported error
    fn errors_of(source: &str) -> Vec<(SemanticErrorKind, String, usize)> {
        run(source)
            .1
            .into_iter()
            .map(|e| (e.kind, e.name, e.span.line))
            .collect()
    }

    fn one(kind: SemanticErrorKind, name: &str, line: usize) -> Vec<(SemanticErrorKind, String, usize)> {
        vec![(kind, name.to_string(), line)]
    }

    #[test]
    fn test_variable_redefinition() {
        assert_eq!(
            errors_of("int a;\nint a;"),
            one(SemanticErrorKind::Redefinition, "a", 2)
        );
    }

    #[test]
    fn test_function_redeclaration() {
        assert_eq!(
            errors_of("int f();\nint f();"),
            one(SemanticErrorKind::Redeclaration, "f", 2)
        );
    }

    #[test]
    fn test_function_defined_over_variable() {
        assert_eq!(
            errors_of("int z;\nint z() {}"),
            one(SemanticErrorKind::Redefinition, "z", 2)
        );
    }

    #[test]
    fn test_function_body_twice() {
        assert_eq!(
            errors_of("int g() {}\nint g() {}"),
            one(SemanticErrorKind::Redefinition, "g", 2)
        );
    }

    #[test]
    fn test_function_declared_over_variable() {
        assert_eq!(
            errors_of("int c;\nint c();"),
            one(SemanticErrorKind::Redeclaration, "c", 2)
        );
    }

    #[test]
    fn test_duplicate_parameter_in_declaration() {
        let (_, errors) = run("int h(int a,\n int a);");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, SemanticErrorKind::Redefinition);
        assert_eq!(errors[0].name, "a");
        assert_eq!((errors[0].span.line, errors[0].span.column), (2, 6));
    }

    #[test]
    fn test_declaration_reports_only_first_duplicate_parameter() {
        assert_eq!(
            errors_of("int h(int a, int a, char a);"),
            one(SemanticErrorKind::Redefinition, "a", 1)
        );
    }

    #[test]
    fn test_duplicate_parameter_in_definition() {
        assert_eq!(
            errors_of("int h(int a, char a[20]) { return a; }"),
            one(SemanticErrorKind::Redefinition, "a", 1)
        );
    }

    #[test]
    fn test_local_clashes_with_parameter() {
        assert_eq!(
            errors_of("int f(int p) {\n int p;\n}"),
            one(SemanticErrorKind::Redefinition, "p", 2)
        );
    }

    #[test]
    fn test_redefinition_within_nested_block() {
        assert_eq!(
            errors_of("int main() {\n int a;\n {\n  int a;\n  int a;\n }\n}"),
            one(SemanticErrorKind::Redefinition, "a", 5)
        );
    }

    #[test]
    fn test_shadowing_is_legal() {
        let (analysis, errors) = run("int x; int f() { int x; x; { char x; x; } return x; }");
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        assert_eq!(analysis.symbol("x").map(|s| &s.ty), Some(&Type::Int));
    }

    #[test]
    fn test_declare_then_define() {
        let (analysis, errors) = run("int f(int a); int f(int b) { return b; }");
        assert!(errors.is_empty());
        let f = analysis.symbol("f").unwrap();
        assert!(f.defined);
        assert_eq!(f.ty.short_form(), "int(int)");
        assert_eq!(analysis.symbols.len(), 1);
    }

    #[test]
    fn test_definition_replaces_declared_signature() {
        let (analysis, errors) = run("int f(); int f(char c) { return c; }");
        assert!(errors.is_empty());
        assert_eq!(analysis.symbol("f").unwrap().ty.short_form(), "int(char)");
    }

    #[test]
    fn test_declaration_after_definition() {
        assert_eq!(
            errors_of("int f() { return 0; }\nint f();"),
            one(SemanticErrorKind::Redeclaration, "f", 2)
        );
    }

    #[test]
    fn test_variable_after_function() {
        assert_eq!(
            errors_of("int f();\nint f;"),
            one(SemanticErrorKind::Redeclaration, "f", 2)
        );
    }

    #[test]
    fn test_undeclared_use() {
        assert_eq!(
            errors_of("int main() {\n  return y;\n}"),
            one(SemanticErrorKind::UndeclaredUse, "y", 2)
        );
    }

    #[test]
    fn test_undeclared_call_target_and_arguments() {
        let errors = errors_of("int main() { int a; foo(a, b); }");
        assert_eq!(
            errors,
            vec![
                (SemanticErrorKind::UndeclaredUse, "foo".to_string(), 1),
                (SemanticErrorKind::UndeclaredUse, "b".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_each_occurrence_is_reported() {
        let errors = errors_of("int main() { q = q + 1; }");
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|(k, n, _)| *k == SemanticErrorKind::UndeclaredUse && n == "q"));
    }

    #[test]
    fn test_recursive_call_resolves() {
        assert!(errors_of("int fact(int n) { return n * fact(n - 1); }").is_empty());
    }

    #[test]
    fn test_call_to_later_function_is_undeclared() {
        assert_eq!(
            errors_of("int main() { return helper(); }\nint helper() { return 1; }"),
            one(SemanticErrorKind::UndeclaredUse, "helper", 1)
        );
    }

    #[test]
    fn test_member_names_are_not_references() {
        let source = "struct P { int x; };
            int main() { struct P p; struct P *q; p.x = 1; q->x = p.x; return p.nothing; }";
        assert!(errors_of(source).is_empty());
    }

    #[test]
    fn test_initializer_sees_new_binding() {
        assert!(errors_of("int main() { int a = a; }").is_empty());
        assert_eq!(
            errors_of("int main() { int a = b; }"),
            one(SemanticErrorKind::UndeclaredUse, "b", 1)
        );
    }

    #[test]
    fn test_block_scope_ends_at_brace() {
        assert_eq!(
            errors_of("int main() {\n { int t; t; }\n t;\n}"),
            one(SemanticErrorKind::UndeclaredUse, "t", 3)
        );
    }

    #[test]
    fn test_if_and_while_bodies_are_walked() {
        let source = "int main() {\n int i;\n while (i) { i = j; }\n if (k) { } else { m; }\n}";
        let names: Vec<String> = errors_of(source).into_iter().map(|(_, n, _)| n).collect();
        assert_eq!(names, vec!["j", "k", "m"]);
    }

    #[test]
    fn test_global_forward_struct_completed_later() {
        let (analysis, errors) = run("struct S s;\nstruct S { int x; };");
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        let s = analysis.symbol("s").unwrap();
        assert_eq!(analysis.render_type(s), "struct S{int x;}");
    }

    #[test]
    fn test_global_forward_struct_never_completed() {
        assert_eq!(
            errors_of("struct S s;\nint a;"),
            one(SemanticErrorKind::IncompleteTypeDefinition, "s", 1)
        );
    }

    #[test]
    fn test_deferred_error_comes_after_immediate_errors() {
        let errors = errors_of("struct S s;\nint a;\nint a;");
        assert_eq!(
            errors,
            vec![
                (SemanticErrorKind::Redefinition, "a".to_string(), 3),
                (SemanticErrorKind::IncompleteTypeDefinition, "s".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_local_incomplete_struct_errors_immediately() {
        assert_eq!(
            errors_of("int main() {\n struct S s;\n}\nstruct S { int x; };"),
            one(SemanticErrorKind::IncompleteTypeDefinition, "s", 2)
        );
    }

    #[test]
    fn test_incomplete_struct_parameter() {
        assert_eq!(
            errors_of("struct S;\nint f(struct S s) { return 0; }"),
            one(SemanticErrorKind::IncompleteTypeDefinition, "s", 2)
        );
        // A bodyless declaration binds nothing, so nothing is checked
        assert!(errors_of("struct S;\nint f(struct S s);").is_empty());
    }

    #[test]
    fn test_array_of_incomplete_struct_is_never_deferred() {
        let (analysis, errors) = run("struct S arr[3];\nstruct S { int x; };");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, SemanticErrorKind::IncompleteTypeDefinition);
        assert_eq!(errors[0].name, "arr");
        assert!(analysis.symbol("arr").is_none());
    }

    #[test]
    fn test_local_array_of_incomplete_struct() {
        assert_eq!(
            errors_of("int main() {\n struct S a[2];\n}\nstruct S { int x; };"),
            one(SemanticErrorKind::IncompleteTypeDefinition, "a", 2)
        );
    }

    #[test]
    fn test_bad_bound_on_incomplete_struct_reports_twice() {
        // The bound error drops the array, leaving a deferred struct global
        let (analysis, errors) = run("struct S a[0];\nint b;");
        let reported: Vec<(SemanticErrorKind, String, usize)> =
            errors.into_iter().map(|e| (e.kind, e.name, e.span.line)).collect();
        assert_eq!(
            reported,
            vec![
                (SemanticErrorKind::IncompleteTypeDefinition, "a".to_string(), 1),
                (SemanticErrorKind::IncompleteTypeDefinition, "a".to_string(), 1),
            ]
        );
        assert_eq!(analysis.symbol("a").map(|s| &s.ty), Some(&Type::structure("S")));
    }

    #[test]
    fn test_pointer_to_incomplete_struct_is_fine() {
        assert!(errors_of("struct S *p;\nint main() { struct T *q; }").is_empty());
    }

    #[test]
    fn test_struct_tags_and_names_do_not_collide() {
        assert!(errors_of("struct a { int a; };\nint a;\nint main() { struct a a; a; }").is_empty());
    }

    #[test]
    fn test_analysis_continues_after_errors() {
        let source = "int a;\nint a;\nint b[0];\nstruct S { int x; };\nstruct S { int y; };\nint main() { c; }";
        let kinds: Vec<SemanticErrorKind> = errors_of(source).into_iter().map(|(k, _, _)| k).collect();
        assert_eq!(
            kinds,
            vec![
                SemanticErrorKind::Redefinition,
                SemanticErrorKind::IncompleteTypeDefinition,
                SemanticErrorKind::Redefinition,
                SemanticErrorKind::UndeclaredUse,
            ]
        );
    }

    #[test]
    fn test_bad_array_bound_still_binds_element_type() {
        let (analysis, errors) = run("int b[0];");
        assert_eq!(errors.len(), 1);
        assert_eq!(analysis.symbol("b").map(|s| &s.ty), Some(&Type::Int));
    }

    #[test]
    fn test_struct_in_parameter_list_is_reported_once() {
        let errors = errors_of("struct S { int x; };\nint f(struct S { int y; } s);");
        assert_eq!(errors, one(SemanticErrorKind::Redefinition, "S", 2));
    }

    #[test]
    fn test_declaration_errors_follow_source_order() {
        // Return specifier first, then the parameter list
        let source = "struct S { int x; };\nstruct S { int y; } f(int a,\n int a);";
        assert_eq!(
            errors_of(source),
            vec![
                (SemanticErrorKind::Redefinition, "S".to_string(), 2),
                (SemanticErrorKind::Redefinition, "a".to_string(), 3),
            ]
        );
    }

    #[test]
    fn test_error_free_program_lists_all_globals() {
        let source = "int a;\nchar *s[4];\nint (*pa)[3];\nstruct P { int x; char y; } p;\nint f(int n, char c[2]);\nint main() { return 0; }\nint f(int n, char c[2]) { return n; }";
        let (analysis, errors) = run(source);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);

        let listed: Vec<(String, String)> = analysis
            .symbols
            .iter()
            .map(|s| (s.name.clone(), analysis.render_type(s)))
            .collect();
        let expected: Vec<(String, String)> = vec![
            ("a", "int"),
            ("s", "char*[4]"),
            ("pa", "int[3]*"),
            ("p", "struct P{int x;char y;}"),
            ("f", "int(int,char[2])"),
            ("main", "int()"),
        ]
        .into_iter()
        .map(|(n, t)| (n.to_string(), t.to_string()))
        .collect();
        assert_eq!(listed, expected);
        assert_eq!(analysis.variables().count(), 4);
        assert_eq!(analysis.functions().count(), 2);
    }
}
