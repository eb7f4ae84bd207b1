//! Type Model for SPL-C
//!
//! Types are plain values. A struct type names its tag only; its member list
//! lives in a [`StructDef`] owned by whatever implements [`StructTable`], so
//! every mention of the same tag observes the same definition.

use std::fmt;

/// Resolved type of a declared entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Char,
    /// `elem[size]`; the resolver only builds arrays with a positive size
    Array { elem: Box<Type>, size: usize },
    /// Always complete, whatever it points to
    Pointer(Box<Type>),
    /// Reference to the struct definition registered under `tag`
    Struct(String),
    /// Parameter names are not part of the type
    Function { ret: Box<Type>, params: Vec<Type> },
}

impl Type {
    pub fn array(elem: Type, size: usize) -> Self {
        Self::Array { elem: Box::new(elem), size }
    }

    pub fn ptr(inner: Type) -> Self {
        Self::Pointer(Box::new(inner))
    }

    pub fn structure(tag: impl Into<String>) -> Self {
        Self::Struct(tag.into())
    }

    pub fn function(ret: Type, params: Vec<Type>) -> Self {
        Self::Function { ret: Box::new(ret), params }
    }

    /// Short signature: `int`, `char`, `T[n]`, `T*`, `struct tag`, `R(P1,P2)`
    pub fn short_form(&self) -> String {
        self.to_string()
    }

    /// Full rendering: a directly-named complete struct lists its members,
    /// everything else falls back to [`Type::short_form`].
    pub fn full_form<T: StructTable + ?Sized>(&self, table: &T) -> String {
        match self {
            Type::Struct(tag) => match table.struct_def(tag) {
                Some(def) => def.full_form(),
                None => self.short_form(),
            },
            _ => self.short_form(),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array { .. })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Char => write!(f, "char"),
            Type::Array { elem, size } => write!(f, "{}[{}]", elem, size),
            Type::Pointer(inner) => write!(f, "{}*", inner),
            Type::Struct(tag) => write!(f, "struct {}", tag),
            Type::Function { ret, params } => {
                write!(f, "{}(", ret)?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A struct member, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub ty: Type,
}

/// Layout information for one struct tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    pub tag: String,
    pub fields: Vec<StructField>,
    /// Starts false on first mention, flips to true once and never reverts
    pub complete: bool,
}

impl StructDef {
    /// A forward-declared (incomplete) struct
    pub fn forward(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            fields: Vec::new(),
            complete: false,
        }
    }

    /// `struct tag`
    pub fn short_form(&self) -> String {
        format!("struct {}", self.tag)
    }

    /// `struct tag{T1 f1;T2 f2;}` when complete and non-empty, otherwise the short form
    pub fn full_form(&self) -> String {
        if !self.complete || self.fields.is_empty() {
            return self.short_form();
        }
        let mut out = format!("struct {}{{", self.tag);
        for field in &self.fields {
            out.push_str(&format!("{} {};", field.ty, field.name));
        }
        out.push('}');
        out
    }
}

/// Lookup of struct definitions by tag
pub trait StructTable {
    fn struct_def(&self, tag: &str) -> Option<&StructDef>;
}
