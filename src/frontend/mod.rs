//! Frontend module - Lexer, Parser and the program tree

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;

pub use parser::parse_source;
