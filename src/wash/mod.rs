//! Tree-to-tree passes run between the front end and lowering
//!
//! With [`Config::optimize`] the two passes below alternate until neither changes
//! the tree:
//!
//! - Fold: integer constant folding
//! - Propagate: int literals carried from assignments to later reads

pub mod fold;
pub mod propagate;

use crate::ast::Program;
use crate::config::Config;
use crate::error::Result;

/// Pipeline of the enabled wash passes
#[derive(Debug, Default)]
pub struct Wash {
    pub fold: fold::ConstantFolding,
    pub propagate: propagate::ConstantPropagation,
}

impl Wash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, mut program: Program, config: &Config) -> Result<Program> {
        if !config.optimize {
            return Ok(program);
        }
        let mut rounds = 0;
        loop {
            rounds += 1;
            program = self.fold.process(program)?;
            program = self.propagate.process(program)?;
            if self.fold.folded == 0 && self.propagate.propagated == 0 {
                break;
            }
        }
        log::debug!("wash reached a fixpoint after {} rounds", rounds);
        Ok(program)
    }
}
