//! Jasmin code generation
//!
//! Turns an IR class into Jasmin assembler text, simulating the operand stack
//! to size each method's `.limit stack`.

pub mod code;
pub mod descriptor;
pub mod error;
pub mod jasmin;
pub mod opcodes;

pub use jasmin::{JasminGenerator, MethodLimits};
