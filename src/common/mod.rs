//! Compilation-unit state shared by lowering and code generation

pub mod import;
pub mod symtab;

pub use import::ClassResolver;
pub use symtab::{MethodSignature, Symbol, SymbolTable};
