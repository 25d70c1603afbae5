//! Attributed tree to three-address IR
//!
//! Lowering walks one class. Every name is resolved through [`Scope`], every
//! intermediate value gets a fresh `tmpN`, and every label a fresh `prefixN`
//! drawn from the run's [`CompilationContext`].

mod class;
mod context;
mod expr;
mod scope;
mod stmt;

pub use context::{ir_type_suffix, CompilationContext};
pub use expr::{ExprContext, Lowered, MethodLowering};
pub use scope::{Origin, Scope};

use crate::ast::Program;
use crate::common::SymbolTable;
use crate::error::Result;
use crate::ir;

/// Lower `program` with a fresh compilation context
pub fn lower_program(program: &Program, table: &SymbolTable) -> Result<ir::Class> {
    let mut ctx = CompilationContext::new();
    lower_program_with(program, table, &mut ctx)
}

/// Lower `program`, drawing temporaries and labels from `ctx`
pub fn lower_program_with(
    program: &Program,
    table: &SymbolTable,
    ctx: &mut CompilationContext,
) -> Result<ir::Class> {
    class::lower_class(program, table, ctx)
}
