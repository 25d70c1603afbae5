//! IR class to Jasmin assembler text

use crate::ast::Type;
use crate::codegen::code::Code;
use crate::codegen::descriptor::{method_descriptor, type_to_descriptor};
use crate::codegen::opcodes;
use crate::common::{ClassResolver, SymbolTable};
use crate::consts::{DEFAULT_SUPER_CLASS, INDENT, INIT_METHOD};
use crate::error::{Error, Result};
use crate::ir::{self, BinaryOp, Call, CallKind, FieldRef, Instruction, Operand, RegisterTable, UnaryOp};
use std::fmt::Write as _;

/// Stack and locals limits of one emitted method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodLimits {
    pub name: String,
    pub max_stack: u16,
    pub max_locals: u16,
}

/// Generates Jasmin text for one IR class. Building is cached: the first call
/// emits, later calls return the same text.
pub struct JasminGenerator<'a> {
    class: &'a ir::Class,
    table: &'a SymbolTable,
    resolver: ClassResolver<'a>,
    code: Option<String>,
    limits: Vec<MethodLimits>,
}

impl<'a> JasminGenerator<'a> {
    pub fn new(class: &'a ir::Class, table: &'a SymbolTable) -> Self {
        Self {
            class,
            table,
            resolver: ClassResolver::new(table),
            code: None,
            limits: Vec::new(),
        }
    }

    pub fn build(&mut self) -> Result<&str> {
        if self.code.is_none() {
            let text = self.generate_class()?;
            self.code = Some(text);
        }
        Ok(self.code.as_deref().unwrap_or_default())
    }

    /// Limits of every method, in class order; empty until [`Self::build`] succeeds
    pub fn method_limits(&self) -> &[MethodLimits] {
        &self.limits
    }

    fn super_binary_name(&self) -> String {
        match &self.class.superclass {
            Some(superclass) => self.resolver.binary_name(superclass),
            None => DEFAULT_SUPER_CLASS.to_string(),
        }
    }

    fn generate_class(&mut self) -> Result<String> {
        log::info!("generating Jasmin for class {}", self.class.name);
        let mut out = String::new();
        let _ = writeln!(out, ".class public {}", self.resolver.binary_name(&self.class.name));
        let _ = writeln!(out, ".super {}", self.super_binary_name());

        for field in &self.class.fields {
            let _ = writeln!(
                out,
                ".field {}{} {}",
                modifiers(field.is_public, field.is_final, field.is_static),
                field.name,
                type_to_descriptor(&field.ty, &self.resolver)
            );
        }

        let mut limits = Vec::with_capacity(self.class.methods.len());
        for method in &self.class.methods {
            let (text, method_limits) = MethodGen::new(self, method).generate()?;
            out.push('\n');
            out.push_str(&text);
            limits.push(method_limits);
        }
        self.limits = limits;
        Ok(out)
    }
}

fn modifiers(is_public: bool, is_final: bool, is_static: bool) -> String {
    let mut m = String::new();
    m.push_str(if is_public { "public " } else { "private " });
    if is_final {
        m.push_str("final ");
    }
    if is_static {
        m.push_str("static ");
    }
    m
}

/// Emission state for one method
struct MethodGen<'g, 'a> {
    gen: &'g JasminGenerator<'a>,
    method: &'g ir::Method,
    registers: RegisterTable,
    code: Code,
    branch_counter: u32,
}

impl<'g, 'a> MethodGen<'g, 'a> {
    fn new(gen: &'g JasminGenerator<'a>, method: &'g ir::Method) -> Self {
        Self {
            gen,
            method,
            registers: method.var_table.clone(),
            code: Code::new(),
            branch_counter: 0,
        }
    }

    fn resolver(&self) -> &ClassResolver<'a> {
        &self.gen.resolver
    }

    fn generate(mut self) -> Result<(String, MethodLimits)> {
        let method = self.method;
        let name = if method.is_constructor {
            INIT_METHOD
        } else {
            method.name.as_str()
        };
        log::debug!("emitting {}.{}", self.gen.class.name, name);

        for (index, inst) in method.instructions.iter().enumerate() {
            for label in method.labels_at(index) {
                self.code.emit_label(label);
            }
            self.gen_instruction(inst)?;
            if let Instruction::Call(call) = inst {
                if !call.return_type.is_void() {
                    self.code.emitop0(opcodes::POP)?;
                }
            }
            if self.code.stack_depth() != 0 {
                return Err(Error::internal(format!(
                    "stack depth {} after `{}` in {}",
                    self.code.stack_depth(),
                    inst,
                    name
                )));
            }
        }
        for label in method.labels_at(method.instructions.len()) {
            self.code.emit_label(label);
        }
        if method.return_type.is_void() && !method.ends_with_return() {
            self.code.emitop0(opcodes::RETURN)?;
        }

        let this_slot = usize::from(!method.is_static && !self.registers.contains(crate::consts::THIS));
        let locals = self.registers.len().max(method.params.len()) + this_slot;
        let limits = MethodLimits {
            name: name.to_string(),
            max_stack: self.code.max_stack(),
            max_locals: u16::try_from(locals)
                .map_err(|_| Error::codegen_error(format!("too many locals in {}", name)))?,
        };

        let params: Vec<&Type> = method.params.iter().map(|p| &p.ty).collect();
        let mut out = String::new();
        let _ = writeln!(
            out,
            ".method {}{}{}",
            modifiers(method.is_public, method.is_final, method.is_static),
            name,
            method_descriptor(params, &method.return_type, self.resolver())
        );
        let _ = writeln!(out, "{}.limit stack {}", INDENT, limits.max_stack);
        let _ = writeln!(out, "{}.limit locals {}", INDENT, limits.max_locals);
        for line in self.code.lines() {
            let _ = writeln!(out, "{}", line);
        }
        let _ = writeln!(out, ".end method");
        Ok((out, limits))
    }

    fn register(&mut self, name: &str) -> u16 {
        self.registers.new_local_named(name)
    }

    fn next_branch(&mut self) -> u32 {
        let n = self.branch_counter;
        self.branch_counter += 1;
        n
    }

    fn gen_instruction(&mut self, inst: &Instruction) -> Result<()> {
        log::trace!("{}", inst);
        match inst {
            Instruction::Assign { dest, ty, value } => self.gen_assign(dest, ty, value),
            Instruction::SingleOp(operand) => self.load(operand),
            Instruction::BinaryOp { op, lhs, rhs, .. } => self.gen_binary(*op, lhs, rhs),
            Instruction::UnaryOp { op, operand, .. } => match op {
                UnaryOp::Not => {
                    self.load(operand)?;
                    self.code.emitop0(opcodes::ICONST_1)?;
                    self.code.emitop0(opcodes::IXOR)?;
                    Ok(())
                }
            },
            Instruction::Call(call) => self.gen_call(call),
            Instruction::GetField { object, field } => {
                self.load(object)?;
                let target = self.field_target(field);
                self.code.emitop1(opcodes::GETFIELD, target)?;
                Ok(())
            }
            Instruction::PutField {
                object,
                field,
                value,
            } => {
                self.load(object)?;
                self.load(value)?;
                let target = self.field_target(field);
                self.code.emitop1(opcodes::PUTFIELD, target)?;
                Ok(())
            }
            Instruction::CondBranch { condition, label } => {
                self.load(condition)?;
                self.code.emit_branch(opcodes::IFNE, label)?;
                Ok(())
            }
            Instruction::Goto(label) => {
                self.code.emit_branch(opcodes::GOTO, label)?;
                Ok(())
            }
            Instruction::Return { ty, operand } => {
                match operand {
                    Some(operand) => {
                        self.load(operand)?;
                        let op = if ty.is_reference() {
                            opcodes::ARETURN
                        } else if ty.is_void() {
                            return Err(Error::internal("void return with an operand"));
                        } else {
                            opcodes::IRETURN
                        };
                        self.code.emitop0(op)?;
                    }
                    None if ty.is_void() => self.code.emitop0(opcodes::RETURN)?,
                    None => {
                        return Err(Error::internal(format!(
                            "return of {} without an operand",
                            ty
                        )))
                    }
                }
                Ok(())
            }
        }
    }

    fn load(&mut self, operand: &Operand) -> Result<()> {
        match operand {
            Operand::Literal { value, .. } => self.code.emit_int(*value)?,
            Operand::Variable { name, ty } => {
                let reg = self.register(name);
                let op = if ty.is_reference() {
                    opcodes::ALOAD
                } else {
                    opcodes::ILOAD
                };
                self.code.emit_local(op, reg)?;
            }
            Operand::This { .. } => self.code.emitop0(opcodes::ALOAD_0)?,
            Operand::ArrayElement { array, index } => {
                let reg = self.register(array);
                self.code.emit_local(opcodes::ALOAD, reg)?;
                self.load(index)?;
                self.code.emitop0(opcodes::IALOAD)?;
            }
            Operand::Field(field) => {
                return Err(Error::internal(format!(
                    "field {} used outside a field instruction",
                    field.name
                )))
            }
        }
        Ok(())
    }

    fn store(&mut self, name: &str, ty: &Type) -> Result<()> {
        let reg = self.register(name);
        let op = if ty.is_reference() {
            opcodes::ASTORE
        } else {
            opcodes::ISTORE
        };
        self.code.emit_local(op, reg)?;
        Ok(())
    }

    fn gen_assign(&mut self, dest: &Operand, ty: &Type, value: &Instruction) -> Result<()> {
        match dest {
            Operand::ArrayElement { array, index } => {
                let reg = self.register(array);
                self.code.emit_local(opcodes::ALOAD, reg)?;
                self.load(index)?;
                self.gen_instruction(value)?;
                self.code.emitop0(opcodes::IASTORE)?;
                Ok(())
            }
            Operand::Variable { name, .. } => {
                if let Some(delta) = increment_delta(name, ty, value) {
                    let reg = self.register(name);
                    if reg <= u16::from(u8::MAX) {
                        log::debug!("iinc {} {} for {}", reg, delta, name);
                        self.code.emit_iinc(reg, delta)?;
                        return Ok(());
                    }
                }
                self.gen_instruction(value)?;
                self.store(name, ty)
            }
            other => Err(Error::internal(format!("cannot assign to '{}'", other))),
        }
    }

    fn gen_binary(&mut self, op: BinaryOp, lhs: &Operand, rhs: &Operand) -> Result<()> {
        self.load(lhs)?;
        self.load(rhs)?;
        let opcode = match op {
            BinaryOp::Add => opcodes::IADD,
            BinaryOp::Sub => opcodes::ISUB,
            BinaryOp::Mul => opcodes::IMUL,
            BinaryOp::Div => opcodes::IDIV,
            BinaryOp::And => opcodes::IAND,
            BinaryOp::Lt => return self.gen_compare(opcodes::IFLT),
            BinaryOp::Gt => return self.gen_compare(opcodes::IFGT),
            BinaryOp::Eq => return self.gen_compare(opcodes::IFEQ),
            BinaryOp::Ne => return self.gen_compare(opcodes::IFNE),
        };
        self.code.emitop0(opcode)?;
        Ok(())
    }

    /// Both operands are on the stack; leave 1 or 0 in their place
    fn gen_compare(&mut self, branch: u8) -> Result<()> {
        let n = self.next_branch();
        let true_label = format!("cmp_true_{}", n);
        let end_label = format!("cmp_end_{}", n);

        self.code.emitop0(opcodes::ISUB)?;
        self.code.emit_branch(branch, &true_label)?;
        let depth = self.code.stack_depth();
        self.code.emitop0(opcodes::ICONST_0)?;
        self.code.emit_branch(opcodes::GOTO, &end_label)?;
        self.code.emit_label(&true_label);
        self.code.state.reset(depth);
        self.code.emitop0(opcodes::ICONST_1)?;
        self.code.emit_label(&end_label);
        Ok(())
    }

    fn field_target(&self, field: &FieldRef) -> String {
        format!(
            "{}/{} {}",
            self.resolver().binary_name(&field.owner),
            field.name,
            type_to_descriptor(&field.ty, self.resolver())
        )
    }

    fn gen_call(&mut self, call: &Call) -> Result<()> {
        match call.kind {
            CallKind::New => {
                if call.return_type.is_array() {
                    let [size] = call.args.as_slice() else {
                        return Err(Error::internal("array allocation needs exactly one size"));
                    };
                    self.load(size)?;
                    self.code.emitop1(opcodes::NEWARRAY, "int")?;
                } else {
                    if !call.args.is_empty() {
                        return Err(Error::internal("object allocation takes no arguments"));
                    }
                    let class = call
                        .return_type
                        .class_name()
                        .ok_or_else(|| Error::internal("allocation of a non-object type"))?;
                    let binary = self.resolver().binary_name(class);
                    self.code.emitop1(opcodes::NEW, binary)?;
                }
                Ok(())
            }
            CallKind::ArrayLength => {
                self.load(&call.target)?;
                self.code.emitop0(opcodes::ARRAYLENGTH)?;
                Ok(())
            }
            CallKind::Special | CallKind::Virtual | CallKind::Static => self.gen_invoke(call),
        }
    }

    fn gen_invoke(&mut self, call: &Call) -> Result<()> {
        let method = call
            .method
            .as_deref()
            .ok_or_else(|| Error::internal("invocation without a method name"))?;
        let class_name = self.gen.class.name.as_str();
        let has_receiver = call.kind != CallKind::Static;

        if has_receiver {
            self.load(&call.target)?;
        }
        for arg in &call.args {
            self.load(arg)?;
        }

        let receiver_class = call.target.ty().class_name().map(str::to_string);
        let own_signature = match (&call.kind, receiver_class.as_deref()) {
            (CallKind::Virtual, Some(receiver)) if receiver == class_name => {
                self.gen.table.method(method)
            }
            _ => None,
        };

        let (opcode, owner) = match call.kind {
            CallKind::Special => {
                let owner = match &call.target {
                    Operand::This { .. } => self.gen.super_binary_name(),
                    other => {
                        let class = other.ty();
                        let class = class
                            .class_name()
                            .ok_or_else(|| Error::internal("invokespecial on a non-object"))?;
                        self.resolver().binary_name(class)
                    }
                };
                (opcodes::INVOKESPECIAL, owner)
            }
            CallKind::Static => {
                let name = match &call.target {
                    Operand::Variable { name, .. } => name.as_str(),
                    _ => return Err(Error::internal("invokestatic target must be a class name")),
                };
                (opcodes::INVOKESTATIC, self.resolver().binary_name(name))
            }
            _ => {
                let receiver = receiver_class
                    .ok_or_else(|| Error::internal("invokevirtual on a non-object"))?;
                let owner = if receiver == class_name
                    && own_signature.is_none()
                    && self.gen.class.superclass.is_some()
                {
                    self.gen.super_binary_name()
                } else {
                    self.resolver().binary_name(&receiver)
                };
                (opcodes::INVOKEVIRTUAL, owner)
            }
        };

        let descriptor = match own_signature {
            Some(signature) => method_descriptor(
                signature.params.iter().map(|p| &p.ty),
                &signature.return_type,
                self.resolver(),
            ),
            None => {
                let arg_types: Vec<Type> = call.args.iter().map(Operand::ty).collect();
                method_descriptor(arg_types.iter(), &call.return_type, self.resolver())
            }
        };

        let arg_size = u16::try_from(call.args.len() + usize::from(has_receiver))
            .map_err(|_| Error::codegen_error(format!("too many arguments to {}", method)))?;
        let return_size = u16::from(!call.return_type.is_void());
        let target = format!("{}/{}{}", owner, method, descriptor);
        self.code
            .emit_invoke(opcode, &target, arg_size, return_size)?;
        Ok(())
    }
}

/// Signed step of `x = x ± k` or `x = k + x` when it fits an `iinc`
fn increment_delta(name: &str, ty: &Type, value: &Instruction) -> Option<i8> {
    if *ty != Type::Int {
        return None;
    }
    let Instruction::BinaryOp { op, lhs, rhs, .. } = value else {
        return None;
    };
    let is_self = |o: &Operand| matches!(o, Operand::Variable { name: n, .. } if n == name);
    let literal = |o: &Operand| match o {
        Operand::Literal { value, .. } => Some(*value),
        _ => None,
    };
    let step = match op {
        BinaryOp::Add if is_self(lhs) => literal(rhs)?,
        BinaryOp::Add if is_self(rhs) => literal(lhs)?,
        BinaryOp::Sub if is_self(lhs) => literal(rhs)?.checked_neg()?,
        _ => return None,
    };
    i8::try_from(step).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(op: BinaryOp, lhs: Operand, rhs: Operand) -> Instruction {
        Instruction::BinaryOp {
            op,
            lhs,
            rhs,
            ty: Type::Int,
        }
    }

    #[test]
    fn test_increment_delta() {
        let x = || Operand::var("x", Type::Int);
        assert_eq!(
            increment_delta("x", &Type::Int, &step(BinaryOp::Add, x(), Operand::int(1))),
            Some(1)
        );
        assert_eq!(
            increment_delta("x", &Type::Int, &step(BinaryOp::Add, Operand::int(7), x())),
            Some(7)
        );
        assert_eq!(
            increment_delta("x", &Type::Int, &step(BinaryOp::Sub, x(), Operand::int(128))),
            Some(-128)
        );
        assert_eq!(
            increment_delta("x", &Type::Int, &step(BinaryOp::Add, x(), Operand::int(128))),
            None
        );
        assert_eq!(
            increment_delta("x", &Type::Int, &step(BinaryOp::Sub, Operand::int(1), x())),
            None
        );
        assert_eq!(
            increment_delta("x", &Type::Int, &step(BinaryOp::Mul, x(), Operand::int(2))),
            None
        );
    }
}
