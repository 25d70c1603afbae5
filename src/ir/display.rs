//! IR text form (`tmp0.i32 :=.i32 a.i32 +.i32 1.i32;`)

use super::*;
use crate::consts::INDENT;
use std::fmt;

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.ty.suffix())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal { value, ty } => write!(f, "{}.{}", value, ty.suffix()),
            Operand::Variable { name, ty } => write!(f, "{}.{}", name, ty.suffix()),
            Operand::ArrayElement { array, index } => write!(f, "{}[{}].i32", array, index),
            Operand::This { class } => write!(f, "this.{}", class),
            Operand::Field(field) => write!(f, "{}", field),
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Operand]) -> fmt::Result {
    for arg in args {
        write!(f, ", {}", arg)?;
    }
    Ok(())
}

fn bare_name(operand: &Operand) -> String {
    match operand {
        Operand::Variable { name, .. } => name.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = self.method.as_deref().unwrap_or("");
        match self.kind {
            CallKind::New => {
                if self.return_type.is_array() {
                    write!(f, "new(array")?;
                } else {
                    write!(f, "new({}", bare_name(&self.target))?;
                }
                write_args(f, &self.args)?;
                write!(f, ").{}", self.return_type.suffix())
            }
            CallKind::Special | CallKind::Virtual => {
                let name = if self.kind == CallKind::Special {
                    "invokespecial"
                } else {
                    "invokevirtual"
                };
                write!(f, "{}({}, \"{}\"", name, self.target, method)?;
                write_args(f, &self.args)?;
                write!(f, ").{}", self.return_type.suffix())
            }
            CallKind::Static => {
                write!(f, "invokestatic({}, \"{}\"", bare_name(&self.target), method)?;
                write_args(f, &self.args)?;
                write!(f, ").{}", self.return_type.suffix())
            }
            CallKind::ArrayLength => {
                write!(f, "arraylength({}).{}", self.target, self.return_type.suffix())
            }
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Assign { dest, ty, value } => {
                write!(f, "{} :=.{} {}", dest, ty.suffix(), value)
            }
            Instruction::SingleOp(operand) => write!(f, "{}", operand),
            Instruction::BinaryOp { op, lhs, rhs, ty } => {
                write!(f, "{} {}.{} {}", lhs, op.symbol(), ty.suffix(), rhs)
            }
            Instruction::UnaryOp { op, operand, ty } => match op {
                UnaryOp::Not => write!(f, "!.{} {}", ty.suffix(), operand),
            },
            Instruction::Call(call) => write!(f, "{}", call),
            Instruction::GetField { object, field } => {
                write!(f, "getfield({}, {}).{}", object, field, field.ty.suffix())
            }
            Instruction::PutField {
                object,
                field,
                value,
            } => write!(f, "putfield({}, {}, {}).V", object, field, value),
            Instruction::CondBranch { condition, label } => {
                write!(f, "if ({}) goto {}", condition, label)
            }
            Instruction::Goto(label) => write!(f, "goto {}", label),
            Instruction::Return { ty, operand } => match operand {
                Some(operand) => write!(f, "ret.{} {}", ty.suffix(), operand),
                None => write!(f, "ret.{}", ty.suffix()),
            },
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".field ")?;
        if self.is_public {
            write!(f, "public ")?;
        }
        if self.is_static {
            write!(f, "static ")?;
        }
        if self.is_final {
            write!(f, "final ")?;
        }
        write!(f, "{}.{};", self.name, self.ty.suffix())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_constructor {
            write!(f, ".construct {}(", self.name)?;
        } else {
            write!(f, ".method ")?;
            if self.is_public {
                write!(f, "public ")?;
            }
            if self.is_static {
                write!(f, "static ")?;
            }
            if self.is_final {
                write!(f, "final ")?;
            }
            write!(f, "{}(", self.name)?;
        }
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}.{}", p.name, p.ty.suffix()))
            .collect();
        writeln!(f, "{}).{} {{", params.join(", "), self.return_type.suffix())?;

        for (index, inst) in self.instructions.iter().enumerate() {
            for label in self.labels_at(index) {
                writeln!(f, "{}{}:", INDENT, label)?;
            }
            writeln!(f, "{}{}{};", INDENT, INDENT, inst)?;
        }
        for label in self.labels_at(self.instructions.len()) {
            writeln!(f, "{}{}:", INDENT, label)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for import in &self.imports {
            writeln!(f, "import {};", import)?;
        }
        if !self.imports.is_empty() {
            writeln!(f)?;
        }
        write!(f, "{}", self.name)?;
        if let Some(superclass) = &self.superclass {
            write!(f, " extends {}", superclass)?;
        }
        writeln!(f, " {{")?;
        writeln!(f)?;
        for field in &self.fields {
            writeln!(f, "{}", field)?;
        }
        if !self.fields.is_empty() {
            writeln!(f)?;
        }
        for method in &self.methods {
            writeln!(f, "{}", method)?;
            writeln!(f)?;
        }
        writeln!(f, "}}")
    }
}
