//! Type Model

mod type_system;

pub use type_system::{StructDef, StructField, StructTable, Type};
