//! Specific error types for Jasmin emission

use thiserror::Error;

/// Operand-stack bookkeeping faults
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BytecodeError {
    #[error("Stack underflow: {opcode} needs {needed} values, depth is {depth}")]
    StackUnderflow {
        opcode: &'static str,
        needed: u16,
        depth: u16,
    },
    #[error("Stack overflow")]
    StackOverflow,
    #[error("Invalid opcode: {opcode:#04x}")]
    InvalidOpcode { opcode: u8 },
    #[error("Local variable index out of bounds: {index}")]
    LocalIndexOutOfBounds { index: u16 },
}

/// Result type for stack bookkeeping
pub type BytecodeResult<T> = Result<T, BytecodeError>;
