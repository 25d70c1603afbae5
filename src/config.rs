//! Backend configuration

/// Options that change what the backend emits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Run the tree-level constant folding pass before lowering
    pub optimize: bool,
    /// Write the IR text next to the Jasmin output
    pub emit_ir: bool,
}

impl Config {
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn with_emit_ir(mut self, emit_ir: bool) -> Self {
        self.emit_ir = emit_ir;
        self
    }
}
