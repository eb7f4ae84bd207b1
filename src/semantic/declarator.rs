//! Declarator resolution
//!
//! Turns a specifier plus declarator tree into a composed [`Type`] and the
//! declared identifier. `[]` binds tighter than an unparenthesized `*`.

use log::trace;

use crate::frontend::ast::{ArraySize, Decl, Declarator, Ident, Specifier};
use crate::semantic::analyzer::SemanticAnalyzer;
use crate::types::{StructField, Type};
use crate::utils::SemanticErrorKind;

/// A resolved `specifier declarator` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declared {
    pub ident: Ident,
    pub ty: Type,
}

/// Parse an array bound; anything that is not a 32-bit integer becomes -1
pub fn parse_bound(text: &str) -> i32 {
    text.parse::<i32>().unwrap_or(-1)
}

/// `(*name)`: a parenthesized pointer directly around the identifier
fn is_paren_pointer_to_ident(declarator: &Declarator) -> bool {
    match declarator {
        Declarator::Paren { inner, .. } => matches!(
            inner.as_ref(),
            Declarator::Pointer { inner, .. } if matches!(inner.as_ref(), Declarator::Ident(_))
        ),
        _ => false,
    }
}

impl SemanticAnalyzer<'_> {
    /// Resolve the base type named by a specifier.
    ///
    /// `struct T { ... }` registers the member list as a side effect.
    pub(crate) fn resolve_specifier(&mut self, specifier: &Specifier) -> Type {
        match specifier {
            Specifier::Int(_) => Type::Int,
            Specifier::Char(_) => Type::Char,
            Specifier::Struct { tag, members: None, .. } => self.structs.declare(&tag.name),
            Specifier::Struct { tag, members: Some(members), .. } => self.define_struct(tag, members),
        }
    }

    fn define_struct(&mut self, tag: &Ident, members: &[Decl]) -> Type {
        let ty = self.structs.declare(&tag.name);
        if !self.structs.begin_definition(&tag.name) {
            self.report(SemanticErrorKind::Redefinition, tag);
            return ty;
        }

        let mut fields: Vec<StructField> = Vec::with_capacity(members.len());
        for member in members {
            let declared = self.resolve_decl(member);

            if fields.iter().any(|f| f.name == declared.ident.name) {
                self.report(SemanticErrorKind::Redefinition, &declared.ident);
                continue;
            }

            // Still recorded as a member so the layout stays printable
            if self.structs.is_incomplete(&declared.ty) {
                self.report(SemanticErrorKind::IncompleteTypeDefinition, &declared.ident);
            }

            fields.push(StructField {
                name: declared.ident.name,
                ty: declared.ty,
            });
        }

        self.structs.set_fields(&tag.name, fields);
        ty
    }

    /// Resolve a full `specifier declarator` pair
    pub(crate) fn resolve_decl(&mut self, decl: &Decl) -> Declared {
        let base = self.resolve_specifier(&decl.specifier);
        self.resolve_declarator(base, &decl.declarator)
    }

    /// Compose `base` with the shape of `declarator`
    pub(crate) fn resolve_declarator(&mut self, base: Type, declarator: &Declarator) -> Declared {
        let ident = declarator.ident().clone();
        let ty = self.compose(base, declarator, &ident);
        trace!("resolved {}: {}", ident.name, ty);
        Declared { ident, ty }
    }

    fn compose(&mut self, base: Type, declarator: &Declarator, ident: &Ident) -> Type {
        match declarator {
            Declarator::Ident(_) => base,
            Declarator::Paren { inner, .. } => self.compose(base, inner, ident),
            Declarator::Pointer { inner, .. } => match inner.as_ref() {
                // `*v[N]`: array of N pointers
                Declarator::Array { inner: elem, size, .. } => {
                    let elem = self.compose(base, elem, ident);
                    self.make_array(Type::ptr(elem), size, ident)
                }
                _ => Type::ptr(self.compose(base, inner, ident)),
            },
            Declarator::Array { inner, size, .. } => {
                if is_paren_pointer_to_ident(inner) {
                    // `(*v)[N]`: pointer to an array of N
                    Type::ptr(self.make_array(base, size, ident))
                } else {
                    let elem = self.compose(base, inner, ident);
                    self.make_array(elem, size, ident)
                }
            }
        }
    }

    /// Wrap `elem` in an array, or report a bad bound and fall back to `elem`
    fn make_array(&mut self, elem: Type, size: &ArraySize, ident: &Ident) -> Type {
        let bound = parse_bound(&size.text);
        if bound <= 0 {
            self.report(SemanticErrorKind::IncompleteTypeDefinition, ident);
            return elem;
        }
        Type::array(elem, bound as usize)
    }
}
