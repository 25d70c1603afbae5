//! Statement lowering

use super::expr::{instr, ExprContext, MethodLowering};
use super::scope::Origin;
use crate::ast::{BinaryOp, Expr, ExprKind, Stmt, StmtKind, Type};
use crate::error::{Error, Result};
use crate::ir::{Fragment, Instruction, Operand};

/// Whether control can fall off the end of `code`
fn falls_through(code: &[Fragment]) -> bool {
    !matches!(code.last(), Some(Fragment::Instr(inst)) if inst.is_jump())
}

impl<'a, 'c> MethodLowering<'a, 'c> {
    pub fn lower_stmt(&mut self, stmt: &Stmt) -> Result<Vec<Fragment>> {
        match &stmt.kind {
            StmtKind::Block(stmts) => {
                let mut code = Vec::new();
                for stmt in stmts {
                    code.extend(self.lower_stmt(stmt)?);
                }
                Ok(code)
            }
            StmtKind::Expr(expr) => Ok(self.lower_expr(expr, &ExprContext::Discarded)?.code),
            StmtKind::Assign { target, value } => self.lower_assign(target, value),
            StmtKind::Return(value) => self.lower_return(value.as_ref()),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let (condition, mut code) = self.lower_operand(cond)?;
                let then_label = self.ctx.fresh_label("then");
                let end_label = self.ctx.fresh_label("endif");

                code.push(instr(Instruction::CondBranch {
                    condition,
                    label: then_label.clone(),
                }));
                if let Some(else_branch) = else_branch {
                    code.extend(self.lower_stmt(else_branch)?);
                }
                if falls_through(&code) {
                    code.push(instr(Instruction::Goto(end_label.clone())));
                }
                code.push(Fragment::Label(then_label));
                code.extend(self.lower_stmt(then_branch)?);
                code.push(Fragment::Label(end_label));
                Ok(code)
            }
            StmtKind::While { cond, body } => {
                let cond_label = self.ctx.fresh_label("whileCond");
                let body_label = self.ctx.fresh_label("whileBody");
                let end_label = self.ctx.fresh_label("whileEnd");

                let mut code = vec![Fragment::Label(cond_label.clone())];
                let (condition, cond_code) = self.lower_operand(cond)?;
                code.extend(cond_code);
                code.push(instr(Instruction::CondBranch {
                    condition,
                    label: body_label.clone(),
                }));
                code.push(instr(Instruction::Goto(end_label.clone())));
                code.push(Fragment::Label(body_label));
                code.extend(self.lower_stmt(body)?);
                if falls_through(&code) {
                    code.push(instr(Instruction::Goto(cond_label)));
                }
                code.push(Fragment::Label(end_label));
                Ok(code)
            }
        }
    }

    fn lower_return(&mut self, value: Option<&Expr>) -> Result<Vec<Fragment>> {
        let ty = self.scope.return_type().value_type();
        let Some(value) = value else {
            return Ok(vec![instr(Instruction::Return {
                ty: Type::Void,
                operand: None,
            })]);
        };
        let (operand, mut code) = self
            .lower_expr(value, &ExprContext::Returned(ty.clone()))?
            .into_parts()?;
        code.push(instr(Instruction::Return {
            ty,
            operand: Some(operand),
        }));
        Ok(code)
    }

    fn lower_assign(&mut self, target: &Expr, value: &Expr) -> Result<Vec<Fragment>> {
        match &target.skip_parens().kind {
            ExprKind::VarRef(name) => match self.scope.resolve(name) {
                Origin::Local(sym) | Origin::Param(sym) => {
                    let ty = sym.ty.value_type();
                    let dest = Operand::var(name.as_str(), ty.clone());
                    if let Some(step) = increment_step(name, &ty, value) {
                        log::trace!("{} keeps its increment shape", name);
                        return Ok(vec![instr(Instruction::assign(dest, step))]);
                    }
                    let (operand, mut code) = self
                        .lower_expr(value, &ExprContext::Assigned(ty))?
                        .into_parts()?;
                    code.push(instr(Instruction::assign(
                        dest,
                        Instruction::SingleOp(operand),
                    )));
                    Ok(code)
                }
                Origin::Field(sym) => {
                    let field = self.field_ref(name, &sym.ty);
                    let (operand, mut code) = self
                        .lower_expr(value, &ExprContext::Assigned(field.ty.clone()))?
                        .into_parts()?;
                    code.push(instr(Instruction::PutField {
                        object: Operand::this(self.scope.class_name()),
                        field,
                        value: operand,
                    }));
                    Ok(code)
                }
                Origin::Import(_) | Origin::Class | Origin::Unknown => Err(Error::internal(
                    format!("'{}' is not assignable", name),
                )),
            },
            ExprKind::Index { array, index } => {
                let (array, mut code) = self.lower_array_base(array)?;
                let (index, index_code) = self.lower_operand(index)?;
                code.extend(index_code);
                let (operand, value_code) = self
                    .lower_expr(value, &ExprContext::Assigned(Type::Int))?
                    .into_parts()?;
                code.extend(value_code);
                code.push(instr(Instruction::assign(
                    Operand::element(array, index),
                    Instruction::SingleOp(operand),
                )));
                Ok(code)
            }
            _ => Err(Error::internal(format!(
                "invalid assignment target '{}'",
                target
            ))),
        }
    }
}

/// `x = x + k`, `x = x - k` or `x = k + x` on an int variable, kept whole so the
/// generator can pick an in-place increment
fn increment_step(name: &str, ty: &Type, value: &Expr) -> Option<Instruction> {
    if *ty != Type::Int {
        return None;
    }
    let ExprKind::Binary { op, lhs, rhs } = &value.skip_parens().kind else {
        return None;
    };
    if !matches!(op, BinaryOp::Add | BinaryOp::Sub) {
        return None;
    }
    let is_self = |e: &Expr| matches!(&e.skip_parens().kind, ExprKind::VarRef(n) if n == name);
    let literal = |e: &Expr| match &e.skip_parens().kind {
        ExprKind::IntLiteral(v) => Some(*v),
        _ => None,
    };
    let (lhs, rhs) = if is_self(lhs) {
        (Operand::var(name, Type::Int), Operand::int(literal(rhs)?))
    } else if *op == BinaryOp::Add && is_self(rhs) {
        (Operand::int(literal(lhs)?), Operand::var(name, Type::Int))
    } else {
        return None;
    };
    Some(Instruction::BinaryOp {
        op: *op,
        lhs,
        rhs,
        ty: Type::Int,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_shapes() {
        let x = || Expr::var("x", Type::Int);
        let add = Expr::binary(BinaryOp::Add, x(), Expr::int(1));
        assert!(increment_step("x", &Type::Int, &add).is_some());

        let flipped = Expr::binary(BinaryOp::Add, Expr::int(3), x());
        assert!(increment_step("x", &Type::Int, &flipped).is_some());

        let sub = Expr::binary(BinaryOp::Sub, x(), Expr::int(2));
        assert!(increment_step("x", &Type::Int, &sub).is_some());
    }

    #[test]
    fn test_non_increment_shapes() {
        let x = || Expr::var("x", Type::Int);
        let reversed_sub = Expr::binary(BinaryOp::Sub, Expr::int(2), x());
        assert!(increment_step("x", &Type::Int, &reversed_sub).is_none());

        let other_var = Expr::binary(BinaryOp::Add, Expr::var("y", Type::Int), Expr::int(1));
        assert!(increment_step("x", &Type::Int, &other_var).is_none());

        let mul = Expr::binary(BinaryOp::Mul, x(), Expr::int(2));
        assert!(increment_step("x", &Type::Int, &mul).is_none());

        let add = Expr::binary(BinaryOp::Add, x(), Expr::int(1));
        assert!(increment_step("x", &Type::Boolean, &add).is_none());
    }
}
