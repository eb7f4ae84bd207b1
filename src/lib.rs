//! SPL-C semantic analyzer
//!
//! Front end and semantic checks for a small C-like teaching language.

pub mod feedback;
pub mod frontend;
pub mod semantic;
pub mod types;
pub mod utils;
