//! Struct tag namespace
//!
//! One registry per analysis run. Entries are keyed by tag and updated in
//! place, so a forward reference and the later definition share one entry.

use std::collections::HashMap;

use log::debug;

use crate::types::{StructDef, StructField, StructTable, Type};

#[derive(Debug, Default)]
pub struct StructRegistry {
    defs: HashMap<String, StructDef>,
    /// Tags in first-mention order
    order: Vec<String>,
}

impl StructRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `tag`, creating an incomplete entry on first mention
    pub fn declare(&mut self, tag: &str) -> Type {
        if !self.defs.contains_key(tag) {
            debug!("forward-declare struct {}", tag);
            self.defs.insert(tag.to_string(), StructDef::forward(tag));
            self.order.push(tag.to_string());
        }
        Type::structure(tag)
    }

    pub fn get(&self, tag: &str) -> Option<&StructDef> {
        self.defs.get(tag)
    }

    pub fn is_defined(&self, tag: &str) -> bool {
        self.defs.get(tag).map_or(false, |def| def.complete)
    }

    /// Start the full definition of `tag`.
    ///
    /// Returns false when the tag already has a full definition; the existing
    /// entry is left untouched in that case. Otherwise the entry is marked
    /// complete with an empty member list, ready for [`Self::set_fields`].
    pub fn begin_definition(&mut self, tag: &str) -> bool {
        self.declare(tag);
        match self.defs.get_mut(tag) {
            Some(def) if def.complete => false,
            Some(def) => {
                def.fields.clear();
                def.complete = true;
                debug!("define struct {}", tag);
                true
            }
            None => false,
        }
    }

    pub fn set_fields(&mut self, tag: &str, fields: Vec<StructField>) {
        if let Some(def) = self.defs.get_mut(tag) {
            def.fields = fields;
        }
    }

    /// True for a struct with no known layout, or an array (of arrays) of one.
    /// Pointers are always complete.
    pub fn is_incomplete(&self, ty: &Type) -> bool {
        match ty {
            Type::Struct(tag) => !self.is_defined(tag),
            Type::Array { elem, .. } => self.is_incomplete(elem),
            _ => false,
        }
    }

    /// Definitions in first-mention order
    pub fn iter(&self) -> impl Iterator<Item = &StructDef> {
        self.order.iter().filter_map(|tag| self.defs.get(tag))
    }
}

impl StructTable for StructRegistry {
    fn struct_def(&self, tag: &str) -> Option<&StructDef> {
        self.get(tag)
    }
}
