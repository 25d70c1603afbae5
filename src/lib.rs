//! Java-- compiler backend (jmmc)
//!
//! Takes the attributed tree a front end produced for one class, lowers it to a
//! three-address IR and emits Jasmin assembler text for the JVM.
//!
//! ## Architecture
//!
//! - **ast**: attributed syntax tree (the input), loadable from JSON
//! - **common**: symbol table and import/binary-name resolution
//! - **wash**: tree-to-tree passes before lowering (constant folding and propagation)
//! - **lower**: tree to IR, with fresh temporaries and labels per run
//! - **ir**: IR data model, text form and virtual register table
//! - **codegen**: IR to Jasmin with operand-stack simulation
//! - **bin**: command-line interface
//!
//! ## Compilation Flow
//!
//! ```text
//! Attributed tree → Wash → Lower → IR → Jasmin generator → .j text
//!        ↓                          ↓
//!   SymbolTable                .ollir text
//! ```

pub mod ast;
pub mod codegen;
pub mod common;
pub mod config;
pub mod consts;
pub mod error;
pub mod ir;
pub mod lower;
pub mod wash;

pub use config::Config;
pub use error::{Error, Result};

use ast::Program;
use codegen::{JasminGenerator, MethodLimits};
use common::SymbolTable;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything one compilation produced
#[derive(Debug, Clone)]
pub struct Compilation {
    pub ir: ir::Class,
    pub ir_text: String,
    pub jasmin: String,
    pub limits: Vec<MethodLimits>,
}

/// Compile a tree, deriving the symbol table from it
pub fn compile(program: &Program, config: &Config) -> Result<Compilation> {
    let table = SymbolTable::from_program(program);
    compile_with_table(program, &table, config)
}

/// Compile a tree against a symbol table the caller already owns
pub fn compile_with_table(
    program: &Program,
    table: &SymbolTable,
    config: &Config,
) -> Result<Compilation> {
    log::info!("compiling class {}", program.class.name);

    let program = wash::Wash::new().process(program.clone(), config)?;
    let ir = lower::lower_program(&program, table)?;
    let ir_text = ir.to_string();

    let mut generator = JasminGenerator::new(&ir, table);
    let jasmin = generator.build()?.to_string();
    let limits = generator.method_limits().to_vec();

    Ok(Compilation {
        ir,
        ir_text,
        jasmin,
        limits,
    })
}

/// Read a JSON tree from `input` and write `<Class>.j` (and `<Class>.ollir` with
/// [`Config::emit_ir`]) into `output_dir`. Returns the paths written.
pub fn compile_file(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &Config,
) -> Result<Vec<PathBuf>> {
    let input = input.as_ref();
    let output_dir = output_dir.as_ref();
    log::debug!("reading attributed tree from {}", input.display());

    if output_dir.exists() && !output_dir.is_dir() {
        return Err(Error::Config {
            message: format!("output path {} is not a directory", output_dir.display()),
        });
    }

    let source = fs::read_to_string(input)?;
    let program = Program::from_json(&source)?;
    let compilation = compile(&program, config)?;

    fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    let jasmin_path = output_dir.join(format!("{}.j", compilation.ir.name));
    fs::write(&jasmin_path, &compilation.jasmin)?;
    written.push(jasmin_path);

    if config.emit_ir {
        let ir_path = output_dir.join(format!("{}.ollir", compilation.ir.name));
        fs::write(&ir_path, &compilation.ir_text)?;
        written.push(ir_path);
    }

    for path in &written {
        log::info!("wrote {}", path.display());
    }
    Ok(written)
}
