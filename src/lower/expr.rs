//! Expression lowering
//!
//! Each expression becomes a reference to its value plus the instructions that
//! compute it. Where the value lands decides how much gets materialized:
//!
//! | context   | call result            | array element          |
//! |-----------|------------------------|------------------------|
//! | discarded | bare call, no temp     | n/a                    |
//! | assigned  | temp of the dest type  | used in place          |
//! | returned  | temp of the return type| used in place          |
//! | operand   | temp of the call type  | copied into a temp     |

use super::context::CompilationContext;
use super::scope::{Origin, Scope};
use crate::ast::{BinaryOp, Expr, ExprKind, Type};
use crate::common::MethodSignature;
use crate::consts::INIT_METHOD;
use crate::error::{Error, Result};
use crate::ir::{Call, CallKind, FieldRef, Fragment, Instruction, Operand, UnaryOp};

/// Where the value of an expression ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprContext {
    /// Expression statement; the value is thrown away
    Discarded,
    /// Right-hand side of an assignment to a destination of this type
    Assigned(Type),
    /// Operand of a return from a method declared with this type
    Returned(Type),
    /// Feeds another instruction
    Operand,
}

#[derive(Debug, Clone, Default)]
pub struct Lowered {
    /// `None` only for a discarded call
    pub result: Option<Operand>,
    pub code: Vec<Fragment>,
}

impl Lowered {
    fn value(operand: Operand) -> Self {
        Self {
            result: Some(operand),
            code: Vec::new(),
        }
    }

    fn with_code(operand: Operand, code: Vec<Fragment>) -> Self {
        Self {
            result: Some(operand),
            code,
        }
    }

    /// Split into operand and code, failing on a valueless result
    pub fn into_parts(self) -> Result<(Operand, Vec<Fragment>)> {
        match self.result {
            Some(operand) => Ok((operand, self.code)),
            None => Err(Error::internal("expression produced no value")),
        }
    }
}

pub(crate) fn instr(inst: Instruction) -> Fragment {
    Fragment::Instr(inst)
}

/// Lowering state for one method body
pub struct MethodLowering<'a, 'c> {
    pub(crate) ctx: &'c mut CompilationContext,
    pub(crate) scope: Scope<'a>,
}

impl<'a, 'c> MethodLowering<'a, 'c> {
    pub fn new(ctx: &'c mut CompilationContext, scope: Scope<'a>) -> Self {
        Self { ctx, scope }
    }

    pub fn lower_expr(&mut self, expr: &Expr, cx: &ExprContext) -> Result<Lowered> {
        match &expr.kind {
            ExprKind::IntLiteral(value) => Ok(Lowered::value(Operand::int(*value))),
            ExprKind::BoolLiteral(value) => Ok(Lowered::value(Operand::boolean(*value))),
            ExprKind::Paren(inner) => self.lower_expr(inner, cx),
            ExprKind::This => Ok(Lowered::value(Operand::this(self.scope.class_name()))),
            ExprKind::VarRef(name) => self.lower_var_ref(name),
            ExprKind::Binary {
                op: BinaryOp::And,
                lhs,
                rhs,
            } => self.lower_and(lhs, rhs),
            ExprKind::Binary { op, lhs, rhs } => {
                let (lhs, mut code) = self.lower_operand(lhs)?;
                let (rhs, rhs_code) = self.lower_operand(rhs)?;
                code.extend(rhs_code);
                let temp = self.ctx.temp(&expr.ty)?;
                code.push(instr(Instruction::assign(
                    temp.clone(),
                    Instruction::BinaryOp {
                        op: *op,
                        lhs,
                        rhs,
                        ty: expr.ty.clone(),
                    },
                )));
                Ok(Lowered::with_code(temp, code))
            }
            ExprKind::Not(operand) => {
                let (operand, mut code) = self.lower_operand(operand)?;
                let temp = self.ctx.temp(&Type::Boolean)?;
                code.push(instr(Instruction::assign(
                    temp.clone(),
                    Instruction::UnaryOp {
                        op: UnaryOp::Not,
                        operand,
                        ty: Type::Boolean,
                    },
                )));
                Ok(Lowered::with_code(temp, code))
            }
            ExprKind::Call {
                receiver,
                method,
                args,
            } => self.lower_call(expr, receiver, method, args, cx),
            ExprKind::NewObject(class) => {
                let ty = Type::object(class.as_str());
                let temp = self.ctx.temp(&ty)?;
                let code = vec![
                    instr(Instruction::assign(
                        temp.clone(),
                        Instruction::Call(Call {
                            kind: CallKind::New,
                            target: Operand::var(class.as_str(), ty.clone()),
                            method: None,
                            args: Vec::new(),
                            return_type: ty,
                        }),
                    )),
                    instr(Instruction::Call(Call {
                        kind: CallKind::Special,
                        target: temp.clone(),
                        method: Some(INIT_METHOD.to_string()),
                        args: Vec::new(),
                        return_type: Type::Void,
                    })),
                ];
                Ok(Lowered::with_code(temp, code))
            }
            ExprKind::NewIntArray(size) => {
                let (size, mut code) = self.lower_operand(size)?;
                let temp = self.ctx.temp(&Type::ArrayOfInt)?;
                code.push(instr(Instruction::assign(
                    temp.clone(),
                    new_int_array(size),
                )));
                Ok(Lowered::with_code(temp, code))
            }
            ExprKind::ArrayLiteral(elements) => {
                let mut code = Vec::new();
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    let (value, element_code) = self.lower_operand(element)?;
                    code.extend(element_code);
                    values.push(value);
                }
                let (array, pack_code) = self.pack_array(values)?;
                code.extend(pack_code);
                Ok(Lowered::with_code(array, code))
            }
            ExprKind::Index { array, index } => {
                let (array, mut code) = self.lower_array_base(array)?;
                let (index, index_code) = self.lower_operand(index)?;
                code.extend(index_code);
                let element = Operand::element(array, index);
                match cx {
                    ExprContext::Assigned(_) | ExprContext::Returned(_) => {
                        Ok(Lowered::with_code(element, code))
                    }
                    ExprContext::Operand | ExprContext::Discarded => {
                        let temp = self.ctx.temp(&Type::Int)?;
                        code.push(instr(Instruction::assign(
                            temp.clone(),
                            Instruction::SingleOp(element),
                        )));
                        Ok(Lowered::with_code(temp, code))
                    }
                }
            }
            ExprKind::Length(array) => {
                let (array, mut code) = self.lower_operand(array)?;
                let temp = self.ctx.temp(&Type::Int)?;
                code.push(instr(Instruction::assign(
                    temp.clone(),
                    Instruction::Call(Call {
                        kind: CallKind::ArrayLength,
                        target: array,
                        method: None,
                        args: Vec::new(),
                        return_type: Type::Int,
                    }),
                )));
                Ok(Lowered::with_code(temp, code))
            }
        }
    }

    /// Lower `expr` as an operand of another instruction
    pub fn lower_operand(&mut self, expr: &Expr) -> Result<(Operand, Vec<Fragment>)> {
        self.lower_expr(expr, &ExprContext::Operand)?.into_parts()
    }

    fn lower_var_ref(&mut self, name: &str) -> Result<Lowered> {
        match self.scope.resolve(name) {
            Origin::Local(sym) | Origin::Param(sym) => {
                Ok(Lowered::value(Operand::var(name, sym.ty.value_type())))
            }
            Origin::Field(sym) => {
                let field = self.field_ref(name, &sym.ty);
                let temp = self.ctx.temp(&field.ty)?;
                let code = vec![instr(self.read_field(temp.clone(), field))];
                Ok(Lowered::with_code(temp, code))
            }
            Origin::Class => Ok(Lowered::value(Operand::this(self.scope.class_name()))),
            Origin::Import(_) | Origin::Unknown => {
                Ok(Lowered::value(Operand::var(name, Type::object(name))))
            }
        }
    }

    pub(crate) fn field_ref(&self, name: &str, ty: &Type) -> FieldRef {
        FieldRef {
            owner: self.scope.class_name().to_string(),
            name: name.to_string(),
            ty: ty.value_type(),
        }
    }

    fn read_field(&self, dest: Operand, field: FieldRef) -> Instruction {
        Instruction::assign(
            dest,
            Instruction::GetField {
                object: Operand::this(self.scope.class_name()),
                field,
            },
        )
    }

    /// `a && b` without evaluating `b` when `a` is false
    fn lower_and(&mut self, lhs: &Expr, rhs: &Expr) -> Result<Lowered> {
        let (left, mut code) = self.lower_operand(lhs)?;
        let result = self.ctx.temp(&Type::Boolean)?;
        let right_label = self.ctx.fresh_label("andRight");
        let end_label = self.ctx.fresh_label("andEnd");

        code.push(instr(Instruction::CondBranch {
            condition: left,
            label: right_label.clone(),
        }));
        code.push(instr(Instruction::assign(
            result.clone(),
            Instruction::SingleOp(Operand::boolean(false)),
        )));
        code.push(instr(Instruction::Goto(end_label.clone())));
        code.push(Fragment::Label(right_label));

        let (right, right_code) = self.lower_operand(rhs)?;
        code.extend(right_code);
        code.push(instr(Instruction::assign(
            result.clone(),
            Instruction::SingleOp(right),
        )));
        code.push(Fragment::Label(end_label));
        Ok(Lowered::with_code(result, code))
    }

    fn lower_call(
        &mut self,
        expr: &Expr,
        receiver: &Expr,
        method: &str,
        args: &[Expr],
        cx: &ExprContext,
    ) -> Result<Lowered> {
        let class_name = self.scope.class_name().to_string();
        let receiver = receiver.skip_parens();
        let (kind, target, mut code) = match &receiver.kind {
            ExprKind::This => (CallKind::Virtual, Operand::this(&class_name), Vec::new()),
            ExprKind::VarRef(name) => match self.scope.resolve(name) {
                Origin::Local(sym) | Origin::Param(sym) => (
                    CallKind::Virtual,
                    Operand::var(name.as_str(), sym.ty.value_type()),
                    Vec::new(),
                ),
                Origin::Field(_) => {
                    let (target, code) = self.lower_var_ref(name)?.into_parts()?;
                    (CallKind::Virtual, target, code)
                }
                Origin::Class => (CallKind::Virtual, Operand::this(&class_name), Vec::new()),
                Origin::Import(_) => (
                    CallKind::Static,
                    Operand::var(name.as_str(), Type::object(name.as_str())),
                    Vec::new(),
                ),
                Origin::Unknown => {
                    log::debug!(
                        "receiver '{}' of {}() is not in scope, calling statically",
                        name,
                        method
                    );
                    (
                        CallKind::Static,
                        Operand::var(name.as_str(), Type::object(name.as_str())),
                        Vec::new(),
                    )
                }
            },
            _ => {
                let (target, code) = self.lower_operand(receiver)?;
                (CallKind::Virtual, target, code)
            }
        };

        let targets_self = kind == CallKind::Virtual
            && target.ty().class_name() == Some(class_name.as_str());
        let callee = if targets_self {
            self.scope.table().method(method)
        } else {
            None
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let (value, arg_code) = self.lower_operand(arg)?;
            code.extend(arg_code);
            values.push(value);
        }
        if let Some(signature) = callee {
            let (packed, pack_code) = self.pack_varargs(signature, values)?;
            code.extend(pack_code);
            values = packed;
        }

        let return_type = match cx {
            ExprContext::Assigned(ty) | ExprContext::Returned(ty) => ty.clone(),
            ExprContext::Operand => expr.ty.value_type(),
            ExprContext::Discarded => callee
                .map(|s| s.return_type.value_type())
                .unwrap_or_else(|| expr.ty.value_type()),
        };
        let call = Call {
            kind,
            target,
            method: Some(method.to_string()),
            args: values,
            return_type: return_type.clone(),
        };

        if *cx == ExprContext::Discarded {
            code.push(instr(Instruction::Call(call)));
            return Ok(Lowered { result: None, code });
        }
        let temp = self.ctx.temp(&return_type)?;
        code.push(instr(Instruction::assign(
            temp.clone(),
            Instruction::Call(call),
        )));
        Ok(Lowered::with_code(temp, code))
    }

    /// Pack the trailing arguments of a vararg call into a fresh int array,
    /// unless the caller already passes an array in that position
    fn pack_varargs(
        &mut self,
        signature: &MethodSignature,
        mut args: Vec<Operand>,
    ) -> Result<(Vec<Operand>, Vec<Fragment>)> {
        if !signature.has_vararg() {
            return Ok((args, Vec::new()));
        }
        let fixed = signature.params.len() - 1;
        if args.len() < fixed {
            return Err(Error::internal(format!(
                "call to {} passes {} arguments, expected at least {}",
                signature.name,
                args.len(),
                fixed
            )));
        }
        if args.len() == signature.params.len() && args[fixed].ty().is_array() {
            return Ok((args, Vec::new()));
        }
        let extra = args.split_off(fixed);
        let (array, code) = self.pack_array(extra)?;
        args.push(array);
        Ok((args, code))
    }

    /// Fresh int array holding `values` in order
    pub(crate) fn pack_array(&mut self, values: Vec<Operand>) -> Result<(Operand, Vec<Fragment>)> {
        let array = self.ctx.temp(&Type::ArrayOfInt)?;
        let name = array
            .var_name()
            .map(str::to_string)
            .ok_or_else(|| Error::internal("array temporary has no name"))?;
        let length = i32::try_from(values.len())
            .map_err(|_| Error::internal("array literal too long"))?;

        let mut code = Vec::with_capacity(values.len() + 1);
        code.push(instr(Instruction::assign(
            array.clone(),
            new_int_array(Operand::int(length)),
        )));
        for (i, value) in values.into_iter().enumerate() {
            let index = Operand::int(i as i32);
            code.push(instr(Instruction::assign(
                Operand::element(name.as_str(), index),
                Instruction::SingleOp(value),
            )));
        }
        Ok((array, code))
    }

    /// Name of a slot holding the array `expr` evaluates to
    pub(crate) fn lower_array_base(&mut self, expr: &Expr) -> Result<(String, Vec<Fragment>)> {
        let (array, code) = self.lower_operand(expr)?;
        match array {
            Operand::Variable { name, .. } => Ok((name, code)),
            other => Err(Error::internal(format!(
                "'{}' cannot be indexed",
                other
            ))),
        }
    }
}

fn new_int_array(size: Operand) -> Instruction {
    Instruction::Call(Call {
        kind: CallKind::New,
        target: Operand::var("array", Type::ArrayOfInt),
        method: None,
        args: vec![size],
        return_type: Type::ArrayOfInt,
    })
}
