//! Plain-text listing of file-scope symbols

use crate::semantic::analyzer::Analysis;

impl Analysis {
    /// Variables then functions, each in first-occurrence order, with full-form types
    pub fn summary(&self) -> String {
        let mut out = String::from("Variables:\n");
        for symbol in self.variables() {
            out.push_str(&format!("{}: {}\n", symbol.name, self.render_type(symbol)));
        }

        out.push_str("\nFunctions:\n");
        for symbol in self.functions() {
            out.push_str(&format!("{}: {}\n", symbol.name, self.render_type(symbol)));
        }
        out
    }
}
