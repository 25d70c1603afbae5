//! Three-address intermediate representation
//!
//! Produced by [`crate::lower`], consumed exactly once by [`crate::codegen`].
//! Every instruction is stack-neutral on the target machine: whatever it pushes
//! it also consumes or stores before the next instruction starts.

mod display;
mod register_alloc;

pub use register_alloc::RegisterTable;

pub use crate::ast::{BinaryOp, Type};
use crate::common::Symbol;
use std::collections::BTreeMap;

/// Field of the current class, addressed by owner and name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub owner: String,
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Literal { value: i32, ty: Type },
    Variable { name: String, ty: Type },
    /// `array[index]` of an int array held in a local, parameter or temporary
    ArrayElement { array: String, index: Box<Operand> },
    This { class: String },
    /// Only valid inside field instructions; fields never occupy local slots
    Field(FieldRef),
}

impl Operand {
    pub fn int(value: i32) -> Self {
        Operand::Literal {
            value,
            ty: Type::Int,
        }
    }

    pub fn boolean(value: bool) -> Self {
        Operand::Literal {
            value: i32::from(value),
            ty: Type::Boolean,
        }
    }

    pub fn var(name: impl Into<String>, ty: Type) -> Self {
        Operand::Variable {
            name: name.into(),
            ty,
        }
    }

    pub fn this(class: impl Into<String>) -> Self {
        Operand::This {
            class: class.into(),
        }
    }

    pub fn element(array: impl Into<String>, index: Operand) -> Self {
        Operand::ArrayElement {
            array: array.into(),
            index: Box::new(index),
        }
    }

    pub fn ty(&self) -> Type {
        match self {
            Operand::Literal { ty, .. } | Operand::Variable { ty, .. } => ty.clone(),
            Operand::ArrayElement { .. } => Type::Int,
            Operand::This { class } => Type::Object(class.clone()),
            Operand::Field(field) => field.ty.clone(),
        }
    }

    /// Name of the local slot this operand reads, if any
    pub fn var_name(&self) -> Option<&str> {
        match self {
            Operand::Variable { name, .. } => Some(name),
            Operand::ArrayElement { array, .. } => Some(array),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Boolean complement
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    New,
    Special,
    Static,
    Virtual,
    ArrayLength,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub kind: CallKind,
    /// Receiver for virtual/special calls, class for static calls and `new`,
    /// array for `arraylength`
    pub target: Operand,
    pub method: Option<String>,
    pub args: Vec<Operand>,
    pub return_type: Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Assign {
        dest: Operand,
        ty: Type,
        value: Box<Instruction>,
    },
    SingleOp(Operand),
    BinaryOp {
        op: BinaryOp,
        lhs: Operand,
        rhs: Operand,
        ty: Type,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Operand,
        ty: Type,
    },
    Call(Call),
    GetField {
        object: Operand,
        field: FieldRef,
    },
    PutField {
        object: Operand,
        field: FieldRef,
        value: Operand,
    },
    CondBranch {
        condition: Operand,
        label: String,
    },
    Goto(String),
    Return {
        ty: Type,
        operand: Option<Operand>,
    },
}

impl Instruction {
    pub fn assign(dest: Operand, value: Instruction) -> Self {
        let ty = dest.ty();
        Instruction::Assign {
            dest,
            ty,
            value: Box::new(value),
        }
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Instruction::Return { .. })
    }

    pub fn is_jump(&self) -> bool {
        matches!(self, Instruction::Goto(_) | Instruction::Return { .. })
    }
}

/// Lowering output: instructions interleaved with the labels that target them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Label(String),
    Instr(Instruction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
    pub is_public: bool,
    pub is_static: bool,
    pub is_final: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub is_public: bool,
    pub is_static: bool,
    pub is_final: bool,
    pub is_constructor: bool,
    pub params: Vec<Symbol>,
    pub return_type: Type,
    pub instructions: Vec<Instruction>,
    /// Label name to the index of the instruction it precedes
    pub labels: BTreeMap<String, usize>,
    /// `this` and parameters; the generator grows its own copy for locals and temporaries
    pub var_table: RegisterTable,
}

impl Method {
    /// Labels placed right before instruction `index` (or at the end when `index == len`)
    pub fn labels_at(&self, index: usize) -> impl Iterator<Item = &str> {
        self.labels
            .iter()
            .filter(move |(_, &at)| at == index)
            .map(|(name, _)| name.as_str())
    }

    pub fn ends_with_return(&self) -> bool {
        self.instructions.last().map_or(false, Instruction::is_return)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    pub name: String,
    pub superclass: Option<String>,
    pub imports: Vec<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}

impl Class {
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.name == name && !m.is_constructor)
    }

    pub fn constructor(&self) -> Option<&Method> {
        self.methods.iter().find(|m| m.is_constructor)
    }
}
