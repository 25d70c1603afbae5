//! Constant propagation
//!
//! Replaces reads of an int local or parameter with the literal it was last
//! assigned, walking each method body in order. Assignment targets are never
//! replaced. Branches keep only the constants both sides agree on, and a variable
//! named anywhere inside a `while` body is left alone in that loop.

use crate::ast::{ClassDecl, Expr, ExprKind, MethodDecl, Program, Stmt, StmtKind, Type};
use crate::error::Result;
use std::collections::{BTreeMap, BTreeSet};

type Constants = BTreeMap<String, i32>;

#[derive(Debug, Default)]
pub struct ConstantPropagation {
    /// Reads replaced in the last run
    pub propagated: usize,
}

impl ConstantPropagation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, mut program: Program) -> Result<Program> {
        self.propagated = 0;
        self.propagate_class(&mut program.class);
        log::debug!("constant propagation replaced {} reads", self.propagated);
        Ok(program)
    }

    fn propagate_class(&mut self, class: &mut ClassDecl) {
        for method in &mut class.methods {
            self.propagate_method(method);
        }
    }

    fn propagate_method(&mut self, method: &mut MethodDecl) {
        let tracked: BTreeSet<String> = method
            .params
            .iter()
            .map(|p| (&p.name, &p.ty))
            .chain(method.locals.iter().map(|l| (&l.name, &l.ty)))
            .filter(|(_, ty)| **ty == Type::Int)
            .map(|(name, _)| name.clone())
            .collect();
        let mut walk = MethodWalk {
            tracked: &tracked,
            propagated: 0,
        };
        let mut constants = Constants::new();
        for stmt in &mut method.body {
            walk.stmt(stmt, &mut constants);
        }
        self.propagated += walk.propagated;
    }
}

/// Propagation state for one method body
struct MethodWalk<'t> {
    /// Int locals and parameters; anything else may change behind our back
    tracked: &'t BTreeSet<String>,
    propagated: usize,
}

impl MethodWalk<'_> {
    fn stmt(&mut self, stmt: &mut Stmt, constants: &mut Constants) {
        match &mut stmt.kind {
            StmtKind::Block(stmts) => {
                for stmt in stmts {
                    self.stmt(stmt, constants);
                }
            }
            StmtKind::Expr(expr) => self.expr(expr, constants),
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.expr(value, constants);
                }
            }
            StmtKind::Assign { target, value } => {
                self.expr(value, constants);
                match &mut target.kind {
                    ExprKind::VarRef(name) => {
                        let literal = match &value.skip_parens().kind {
                            ExprKind::IntLiteral(v) => Some(*v),
                            _ => None,
                        };
                        match literal {
                            Some(v) if self.tracked.contains(name.as_str()) => {
                                constants.insert(name.clone(), v);
                            }
                            _ => {
                                constants.remove(name.as_str());
                            }
                        }
                    }
                    ExprKind::Index { array, index } => {
                        self.expr(array, constants);
                        self.expr(index, constants);
                    }
                    _ => {}
                }
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.expr(cond, constants);
                let mut then_constants = constants.clone();
                self.stmt(then_branch, &mut then_constants);
                if let Some(else_branch) = else_branch {
                    self.stmt(else_branch, constants);
                }
                constants.retain(|name, value| then_constants.get(name) == Some(value));
            }
            StmtKind::While { cond, body } => {
                let mut named = BTreeSet::new();
                names_in_stmt(body, &mut named);
                let mut loop_constants = constants.clone();
                loop_constants.retain(|name, _| !named.contains(name));

                self.expr(cond, &loop_constants);
                self.stmt(body, &mut loop_constants);

                let mut assigned = BTreeSet::new();
                assigned_in_stmt(body, &mut assigned);
                constants.retain(|name, _| !assigned.contains(name));
            }
        }
    }

    fn expr(&mut self, expr: &mut Expr, constants: &Constants) {
        let value = match &expr.kind {
            ExprKind::VarRef(name) => constants.get(name).copied(),
            _ => None,
        };
        if let Some(value) = value {
            expr.kind = ExprKind::IntLiteral(value);
            self.propagated += 1;
            return;
        }
        match &mut expr.kind {
            ExprKind::Binary { lhs, rhs, .. } => {
                self.expr(lhs, constants);
                self.expr(rhs, constants);
            }
            ExprKind::Not(inner)
            | ExprKind::Paren(inner)
            | ExprKind::NewIntArray(inner)
            | ExprKind::Length(inner) => self.expr(inner, constants),
            ExprKind::Call { receiver, args, .. } => {
                self.expr(receiver, constants);
                for arg in args {
                    self.expr(arg, constants);
                }
            }
            ExprKind::ArrayLiteral(elements) => {
                for element in elements {
                    self.expr(element, constants);
                }
            }
            ExprKind::Index { array, index } => {
                self.expr(array, constants);
                self.expr(index, constants);
            }
            ExprKind::IntLiteral(_)
            | ExprKind::BoolLiteral(_)
            | ExprKind::VarRef(_)
            | ExprKind::This
            | ExprKind::NewObject(_) => {}
        }
    }
}

/// Every variable `stmt` reads or writes
fn names_in_stmt(stmt: &Stmt, names: &mut BTreeSet<String>) {
    match &stmt.kind {
        StmtKind::Block(stmts) => stmts.iter().for_each(|s| names_in_stmt(s, names)),
        StmtKind::Expr(expr) => names_in_expr(expr, names),
        StmtKind::Return(value) => {
            if let Some(value) = value {
                names_in_expr(value, names);
            }
        }
        StmtKind::Assign { target, value } => {
            names_in_expr(target, names);
            names_in_expr(value, names);
        }
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            names_in_expr(cond, names);
            names_in_stmt(then_branch, names);
            if let Some(else_branch) = else_branch {
                names_in_stmt(else_branch, names);
            }
        }
        StmtKind::While { cond, body } => {
            names_in_expr(cond, names);
            names_in_stmt(body, names);
        }
    }
}

fn names_in_expr(expr: &Expr, names: &mut BTreeSet<String>) {
    match &expr.kind {
        ExprKind::VarRef(name) => {
            names.insert(name.clone());
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            names_in_expr(lhs, names);
            names_in_expr(rhs, names);
        }
        ExprKind::Not(inner)
        | ExprKind::Paren(inner)
        | ExprKind::NewIntArray(inner)
        | ExprKind::Length(inner) => names_in_expr(inner, names),
        ExprKind::Call { receiver, args, .. } => {
            names_in_expr(receiver, names);
            args.iter().for_each(|a| names_in_expr(a, names));
        }
        ExprKind::ArrayLiteral(elements) => elements.iter().for_each(|e| names_in_expr(e, names)),
        ExprKind::Index { array, index } => {
            names_in_expr(array, names);
            names_in_expr(index, names);
        }
        ExprKind::IntLiteral(_) | ExprKind::BoolLiteral(_) | ExprKind::This | ExprKind::NewObject(_) => {}
    }
}

/// Variables `stmt` assigns directly
fn assigned_in_stmt(stmt: &Stmt, names: &mut BTreeSet<String>) {
    match &stmt.kind {
        StmtKind::Block(stmts) => stmts.iter().for_each(|s| assigned_in_stmt(s, names)),
        StmtKind::Assign { target, .. } => {
            if let ExprKind::VarRef(name) = &target.kind {
                names.insert(name.clone());
            }
        }
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            assigned_in_stmt(then_branch, names);
            if let Some(else_branch) = else_branch {
                assigned_in_stmt(else_branch, names);
            }
        }
        StmtKind::While { body, .. } => assigned_in_stmt(body, names),
        StmtKind::Expr(_) | StmtKind::Return(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;

    fn int(name: &str) -> Expr {
        Expr::var(name, Type::Int)
    }

    fn set(name: &str, value: Expr) -> Stmt {
        Stmt::assign(int(name), value)
    }

    fn run(method: MethodDecl) -> (MethodDecl, usize) {
        let mut pass = ConstantPropagation::new();
        let program = pass
            .process(Program::new(ClassDecl::new("Foo").method(method)))
            .unwrap();
        let method = program.class.methods.into_iter().next().unwrap();
        (method, pass.propagated)
    }

    fn returned(method: &MethodDecl) -> &Expr {
        match &method.body.last().unwrap().kind {
            StmtKind::Return(Some(value)) => value,
            other => panic!("expected a return, got {:?}", other),
        }
    }

    #[test]
    fn test_literal_reaches_later_read() {
        let method = MethodDecl::new("f", Type::Int)
            .local("x", Type::Int)
            .stmt(set("x", Expr::int(5)))
            .stmt(Stmt::ret(Some(Expr::binary(BinaryOp::Add, int("x"), Expr::int(1)))));
        let (method, count) = run(method);
        assert_eq!(count, 1);
        match &returned(&method).kind {
            ExprKind::Binary { lhs, .. } => assert!(matches!(lhs.kind, ExprKind::IntLiteral(5))),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_assignment_target_is_kept() {
        let method = MethodDecl::new("f", Type::Void)
            .local("x", Type::Int)
            .stmt(set("x", Expr::int(5)))
            .stmt(set("x", Expr::int(6)));
        let (method, count) = run(method);
        assert_eq!(count, 0);
        match &method.body[1].kind {
            StmtKind::Assign { target, .. } => {
                assert!(matches!(&target.kind, ExprKind::VarRef(n) if n == "x"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_non_literal_assignment_forgets_constant() {
        let method = MethodDecl::new("f", Type::Int)
            .param("a", Type::Int)
            .local("x", Type::Int)
            .stmt(set("x", Expr::int(5)))
            .stmt(set("x", int("a")))
            .stmt(Stmt::ret(Some(int("x"))));
        let (method, count) = run(method);
        assert_eq!(count, 0);
        assert!(matches!(&returned(&method).kind, ExprKind::VarRef(n) if n == "x"));
    }

    #[test]
    fn test_loop_variables_are_left_alone() {
        let method = MethodDecl::new("f", Type::Int)
            .local("i", Type::Int)
            .local("n", Type::Int)
            .stmt(set("i", Expr::int(0)))
            .stmt(set("n", Expr::int(10)))
            .stmt(Stmt::while_loop(
                Expr::binary(BinaryOp::Lt, int("i"), int("n")),
                set("i", Expr::binary(BinaryOp::Add, int("i"), Expr::int(1))),
            ))
            .stmt(Stmt::ret(Some(Expr::binary(BinaryOp::Add, int("i"), int("n")))));
        let (method, count) = run(method);

        // only `n` in the loop condition and `n` after the loop
        assert_eq!(count, 2);
        match &returned(&method).kind {
            ExprKind::Binary { lhs, rhs, .. } => {
                assert!(matches!(&lhs.kind, ExprKind::VarRef(n) if n == "i"));
                assert!(matches!(rhs.kind, ExprKind::IntLiteral(10)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_branches_keep_only_agreeing_constants() {
        let method = MethodDecl::new("f", Type::Int)
            .param("c", Type::Boolean)
            .local("x", Type::Int)
            .local("y", Type::Int)
            .stmt(set("x", Expr::int(1)))
            .stmt(set("y", Expr::int(2)))
            .stmt(Stmt::if_else(
                Expr::var("c", Type::Boolean),
                set("x", Expr::int(3)),
                Some(set("y", Expr::int(2))),
            ))
            .stmt(Stmt::ret(Some(Expr::binary(BinaryOp::Add, int("x"), int("y")))));
        let (method, _) = run(method);
        match &returned(&method).kind {
            ExprKind::Binary { lhs, rhs, .. } => {
                assert!(matches!(&lhs.kind, ExprKind::VarRef(n) if n == "x"));
                assert!(matches!(rhs.kind, ExprKind::IntLiteral(2)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_fields_are_not_tracked() {
        let method = MethodDecl::new("f", Type::Int)
            .stmt(set("count", Expr::int(4)))
            .stmt(Stmt::ret(Some(int("count"))));
        let (method, count) = run(method);
        assert_eq!(count, 0);
        assert!(matches!(&returned(&method).kind, ExprKind::VarRef(_)));
    }
}
