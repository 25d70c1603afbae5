//! Code generation buffer
//!
//! Collects the instruction lines of one method and simulates the operand stack
//! as they are emitted, so the method's stack limit is known when it is done.

use crate::codegen::error::{BytecodeError, BytecodeResult};
use crate::codegen::opcodes;
use crate::consts::INDENT;
use std::fmt;

/// Operand stack state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    /// Current stack depth
    pub stacksize: u16,
    /// Maximum stack depth seen
    pub max_stacksize: u16,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, n: u16) -> BytecodeResult<()> {
        self.stacksize = self
            .stacksize
            .checked_add(n)
            .ok_or(BytecodeError::StackOverflow)?;
        self.max_stacksize = self.max_stacksize.max(self.stacksize);
        Ok(())
    }

    pub fn pop(&mut self, n: u16, opcode: &'static str) -> BytecodeResult<()> {
        if n > self.stacksize {
            return Err(BytecodeError::StackUnderflow {
                opcode,
                needed: n,
                depth: self.stacksize,
            });
        }
        self.stacksize -= n;
        Ok(())
    }

    /// Restart simulation at `depth` (a label reached from a branch taken at that depth)
    pub fn reset(&mut self, depth: u16) {
        self.stacksize = depth;
    }
}

#[derive(Debug, Default)]
pub struct Code {
    pub state: State,
    lines: Vec<String>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply(&mut self, op: u8) -> BytecodeResult<&'static str> {
        let name = opcodes::mnemonic(op).ok_or(BytecodeError::InvalidOpcode { opcode: op })?;
        let (popped, pushed) =
            opcodes::stack_effect(op).ok_or(BytecodeError::InvalidOpcode { opcode: op })?;
        self.state.pop(popped, name)?;
        self.state.push(pushed)?;
        Ok(name)
    }

    fn line(&mut self, text: String) {
        log::trace!("emit {} (depth {})", text, self.state.stacksize);
        self.lines.push(format!("{}{}", INDENT, text));
    }

    /// Operand-free instruction
    pub fn emitop0(&mut self, op: u8) -> BytecodeResult<()> {
        let name = self.apply(op)?;
        self.line(name.to_string());
        Ok(())
    }

    /// Instruction with one operand (`bipush 10`, `new Foo`, `getfield Foo/x I`)
    pub fn emitop1(&mut self, op: u8, od: impl fmt::Display) -> BytecodeResult<()> {
        let name = self.apply(op)?;
        self.line(format!("{} {}", name, od));
        Ok(())
    }

    /// Push an int constant with the shortest encoding
    pub fn emit_int(&mut self, value: i32) -> BytecodeResult<()> {
        match value {
            -1 => self.emitop0(opcodes::ICONST_M1),
            0..=5 => self.emitop0(opcodes::ICONST_0 + value as u8),
            -128..=127 => self.emitop1(opcodes::BIPUSH, value),
            -32768..=32767 => self.emitop1(opcodes::SIPUSH, value),
            _ => self.emitop1(opcodes::LDC, value),
        }
    }

    /// Load or store through `reg`, using the `_N` form for slots 0 to 3
    pub fn emit_local(&mut self, op: u8, reg: u16) -> BytecodeResult<()> {
        match opcodes::short_form(op, reg) {
            Some(short) => self.emitop0(short),
            None => self.emitop1(op, reg),
        }
    }

    pub fn emit_iinc(&mut self, reg: u16, delta: i8) -> BytecodeResult<()> {
        if reg > u16::from(u8::MAX) {
            return Err(BytecodeError::LocalIndexOutOfBounds { index: reg });
        }
        let name = self.apply(opcodes::IINC)?;
        self.line(format!("{} {} {}", name, reg, delta));
        Ok(())
    }

    /// Method invocation; `arg_size` counts the receiver when there is one
    pub fn emit_invoke(
        &mut self,
        op: u8,
        target: &str,
        arg_size: u16,
        return_size: u16,
    ) -> BytecodeResult<()> {
        let name = opcodes::mnemonic(op).ok_or(BytecodeError::InvalidOpcode { opcode: op })?;
        self.state.pop(arg_size, name)?;
        self.state.push(return_size)?;
        self.line(format!("{} {}", name, target));
        Ok(())
    }

    /// Conditional or unconditional jump to `label`
    pub fn emit_branch(&mut self, op: u8, label: &str) -> BytecodeResult<()> {
        self.emitop1(op, label)
    }

    pub fn emit_label(&mut self, label: &str) {
        self.lines.push(format!("{}:", label));
    }

    pub fn stack_depth(&self) -> u16 {
        self.state.stacksize
    }

    pub fn max_stack(&self) -> u16 {
        self.state.max_stacksize
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mnemonics(code: &Code) -> Vec<String> {
        code.lines().iter().map(|l| l.trim().to_string()).collect()
    }

    #[test]
    fn test_int_constant_encoding() {
        let mut code = Code::new();
        for value in [-1, 0, 5, 6, -128, 127, 128, -32768, 32767, 32768, -32769] {
            code.emit_int(value).unwrap();
        }
        assert_eq!(
            mnemonics(&code),
            vec![
                "iconst_m1",
                "iconst_0",
                "iconst_5",
                "bipush 6",
                "bipush -128",
                "bipush 127",
                "sipush 128",
                "sipush -32768",
                "sipush 32767",
                "ldc 32768",
                "ldc -32769",
            ]
        );
        assert_eq!(code.stack_depth(), 11);
        assert_eq!(code.max_stack(), 11);
    }

    #[test]
    fn test_local_forms() {
        let mut code = Code::new();
        code.emit_local(opcodes::ILOAD, 3).unwrap();
        code.emit_local(opcodes::ILOAD, 4).unwrap();
        code.emit_local(opcodes::ALOAD, 0).unwrap();
        code.emit_local(opcodes::ASTORE, 7).unwrap();
        code.emit_local(opcodes::ISTORE, 1).unwrap();
        code.emit_local(opcodes::ISTORE, 2).unwrap();
        assert_eq!(
            mnemonics(&code),
            vec!["iload_3", "iload 4", "aload_0", "astore 7", "istore_1", "istore_2"]
        );
        assert_eq!(code.stack_depth(), 0);
        assert_eq!(code.max_stack(), 3);
    }

    #[test]
    fn test_underflow_is_reported() {
        let mut code = Code::new();
        code.emit_int(1).unwrap();
        let err = code.emitop0(opcodes::IADD).unwrap_err();
        assert_eq!(
            err,
            BytecodeError::StackUnderflow {
                opcode: "iadd",
                needed: 2,
                depth: 1
            }
        );
    }

    #[test]
    fn test_invoke_accounting() {
        let mut code = Code::new();
        code.emitop0(opcodes::ALOAD_0).unwrap();
        code.emit_int(2).unwrap();
        code.emit_invoke(opcodes::INVOKEVIRTUAL, "Foo/bar(I)I", 2, 1)
            .unwrap();
        assert_eq!(code.stack_depth(), 1);
        assert_eq!(code.max_stack(), 2);
        assert_eq!(mnemonics(&code)[2], "invokevirtual Foo/bar(I)I");
    }

    #[test]
    fn test_labels_are_not_indented() {
        let mut code = Code::new();
        code.emit_label("loop0");
        code.emit_branch(opcodes::GOTO, "loop0").unwrap();
        assert_eq!(code.lines()[0], "loop0:");
        assert_eq!(code.lines()[1], format!("{}goto loop0", INDENT));
    }

    #[test]
    fn test_unknown_opcode() {
        let mut code = Code::new();
        assert_eq!(
            code.emitop0(0xff).unwrap_err(),
            BytecodeError::InvalidOpcode { opcode: 0xff }
        );
    }
}
