//! Constant folding
//!
//! Replaces integer arithmetic over literal operands with its value, bottom-up,
//! using 32-bit two's complement wrapping. Division by zero is left alone so it
//! still fails at run time.

use crate::ast::{BinaryOp, ClassDecl, Expr, ExprKind, Program, Stmt, StmtKind};
use crate::error::Result;

#[derive(Debug, Default)]
pub struct ConstantFolding {
    /// Nodes replaced in the last run
    pub folded: usize,
}

impl ConstantFolding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, mut program: Program) -> Result<Program> {
        self.folded = 0;
        self.fold_class(&mut program.class);
        log::debug!("constant folding replaced {} expressions", self.folded);
        Ok(program)
    }

    fn fold_class(&mut self, class: &mut ClassDecl) {
        for method in &mut class.methods {
            for stmt in &mut method.body {
                self.fold_stmt(stmt);
            }
        }
    }

    fn fold_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Block(stmts) => {
                for stmt in stmts {
                    self.fold_stmt(stmt);
                }
            }
            StmtKind::Assign { target, value } => {
                self.fold_expr(target);
                self.fold_expr(value);
            }
            StmtKind::Expr(expr) => self.fold_expr(expr),
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.fold_expr(value);
                }
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.fold_expr(cond);
                self.fold_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.fold_stmt(else_branch);
                }
            }
            StmtKind::While { cond, body } => {
                self.fold_expr(cond);
                self.fold_stmt(body);
            }
        }
    }

    pub fn fold_expr(&mut self, expr: &mut Expr) {
        self.fold_children(expr);
        let value = match &expr.kind {
            ExprKind::Binary { op, lhs, rhs } => match (int_value(lhs), int_value(rhs)) {
                (Some(l), Some(r)) => evaluate(*op, l, r),
                _ => None,
            },
            _ => None,
        };
        if let Some(value) = value {
            expr.kind = ExprKind::IntLiteral(value);
            self.folded += 1;
        }
    }

    fn fold_children(&mut self, expr: &mut Expr) {
        match &mut expr.kind {
            ExprKind::Binary { lhs, rhs, .. } => {
                self.fold_expr(lhs);
                self.fold_expr(rhs);
            }
            ExprKind::Not(inner) | ExprKind::Paren(inner) | ExprKind::NewIntArray(inner) => {
                self.fold_expr(inner)
            }
            ExprKind::Length(inner) => self.fold_expr(inner),
            ExprKind::Call { receiver, args, .. } => {
                self.fold_expr(receiver);
                for arg in args {
                    self.fold_expr(arg);
                }
            }
            ExprKind::ArrayLiteral(elements) => {
                for element in elements {
                    self.fold_expr(element);
                }
            }
            ExprKind::Index { array, index } => {
                self.fold_expr(array);
                self.fold_expr(index);
            }
            ExprKind::IntLiteral(_)
            | ExprKind::BoolLiteral(_)
            | ExprKind::VarRef(_)
            | ExprKind::This
            | ExprKind::NewObject(_) => {}
        }
    }
}

fn int_value(expr: &Expr) -> Option<i32> {
    match &expr.skip_parens().kind {
        ExprKind::IntLiteral(value) => Some(*value),
        _ => None,
    }
}

fn evaluate(op: BinaryOp, l: i32, r: i32) -> Option<i32> {
    match op {
        BinaryOp::Add => Some(l.wrapping_add(r)),
        BinaryOp::Sub => Some(l.wrapping_sub(r)),
        BinaryOp::Mul => Some(l.wrapping_mul(r)),
        BinaryOp::Div if r != 0 => Some(l.wrapping_div(r)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Type;

    fn folded(mut expr: Expr) -> (Expr, usize) {
        let mut folding = ConstantFolding::new();
        folding.fold_expr(&mut expr);
        (expr, folding.folded)
    }

    #[test]
    fn test_nested_arithmetic() {
        // (2 + 3) * 4
        let expr = Expr::binary(
            BinaryOp::Mul,
            Expr::paren(Expr::binary(BinaryOp::Add, Expr::int(2), Expr::int(3))),
            Expr::int(4),
        );
        let (expr, count) = folded(expr);
        assert!(matches!(expr.kind, ExprKind::IntLiteral(20)));
        assert_eq!(count, 2);
    }

    #[test]
    fn test_wrapping() {
        let (expr, _) = folded(Expr::binary(BinaryOp::Add, Expr::int(i32::MAX), Expr::int(1)));
        assert!(matches!(expr.kind, ExprKind::IntLiteral(i32::MIN)));
        let (expr, _) = folded(Expr::binary(BinaryOp::Div, Expr::int(i32::MIN), Expr::int(-1)));
        assert!(matches!(expr.kind, ExprKind::IntLiteral(i32::MIN)));
    }

    #[test]
    fn test_division_by_zero_is_kept() {
        let (expr, count) = folded(Expr::binary(BinaryOp::Div, Expr::int(1), Expr::int(0)));
        assert!(matches!(expr.kind, ExprKind::Binary { .. }));
        assert_eq!(count, 0);
    }

    #[test]
    fn test_comparisons_and_variables_are_kept() {
        let (expr, _) = folded(Expr::binary(BinaryOp::Lt, Expr::int(1), Expr::int(2)));
        assert!(matches!(expr.kind, ExprKind::Binary { .. }));
        let (expr, _) = folded(Expr::binary(
            BinaryOp::Add,
            Expr::var("a", Type::Int),
            Expr::int(2),
        ));
        assert!(matches!(expr.kind, ExprKind::Binary { .. }));
    }

    #[test]
    fn test_folds_inside_calls_and_indexes() {
        let expr = Expr::index(
            Expr::var("a", Type::ArrayOfInt),
            Expr::binary(BinaryOp::Sub, Expr::int(3), Expr::int(1)),
        );
        let (expr, count) = folded(expr);
        assert_eq!(count, 1);
        match expr.kind {
            ExprKind::Index { index, .. } => {
                assert!(matches!(index.kind, ExprKind::IntLiteral(2)))
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
