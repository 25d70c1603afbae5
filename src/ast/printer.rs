use super::nodes::*;
use super::Program;

/// Tree printer for debugging and the `tree` subcommand
pub struct AstPrinter {
    indent_level: usize,
    output: String,
}

impl Default for AstPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl AstPrinter {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            output: String::new(),
        }
    }

    pub fn print(&mut self, program: &Program) -> String {
        self.output.clear();
        self.print_program(program);
        self.output.clone()
    }

    fn indent(&mut self) {
        self.indent_level += 2;
    }

    fn dedent(&mut self) {
        if self.indent_level >= 2 {
            self.indent_level -= 2;
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push(' ');
        }
    }

    fn writeln(&mut self, s: &str) {
        self.write_indent();
        self.output.push_str(s);
        self.output.push('\n');
    }

    fn print_program(&mut self, program: &Program) {
        self.writeln("Program");
        self.indent();
        for import in &program.imports {
            self.writeln(&format!("Import: {}", import.dotted()));
        }
        self.print_class(&program.class);
        self.dedent();
    }

    fn print_class(&mut self, class: &ClassDecl) {
        match &class.superclass {
            Some(sup) => self.writeln(&format!("Class: {} extends {}", class.name, sup)),
            None => self.writeln(&format!("Class: {}", class.name)),
        }
        self.indent();
        for field in &class.fields {
            self.writeln(&format!("Field: {} {}", field.ty, field.name));
        }
        for method in &class.methods {
            self.print_method(method);
        }
        self.dedent();
    }

    fn print_method(&mut self, method: &MethodDecl) {
        let mut header = String::from("Method: ");
        if method.is_public {
            header.push_str("public ");
        }
        if method.is_static {
            header.push_str("static ");
        }
        if method.is_final {
            header.push_str("final ");
        }
        let params: Vec<String> = method
            .params
            .iter()
            .map(|p| format!("{} {}", p.ty, p.name))
            .collect();
        header.push_str(&format!(
            "{} {}({})",
            method.return_type,
            method.name,
            params.join(", ")
        ));
        self.writeln(&header);
        self.indent();
        for local in &method.locals {
            self.writeln(&format!("Local: {} {}", local.ty, local.name));
        }
        for stmt in &method.body {
            self.print_stmt(stmt);
        }
        self.dedent();
    }

    fn print_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Block(stmts) => {
                self.writeln("Block");
                self.indent();
                for s in stmts {
                    self.print_stmt(s);
                }
                self.dedent();
            }
            StmtKind::Assign { target, value } => {
                self.writeln("Assign");
                self.indent();
                self.print_expr(target);
                self.print_expr(value);
                self.dedent();
            }
            StmtKind::Expr(expr) => {
                self.writeln("ExprStmt");
                self.indent();
                self.print_expr(expr);
                self.dedent();
            }
            StmtKind::Return(value) => {
                self.writeln("Return");
                if let Some(value) = value {
                    self.indent();
                    self.print_expr(value);
                    self.dedent();
                }
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.writeln("If");
                self.indent();
                self.print_expr(cond);
                self.print_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.writeln("Else");
                    self.indent();
                    self.print_stmt(else_branch);
                    self.dedent();
                }
                self.dedent();
            }
            StmtKind::While { cond, body } => {
                self.writeln("While");
                self.indent();
                self.print_expr(cond);
                self.print_stmt(body);
                self.dedent();
            }
        }
    }

    fn print_expr(&mut self, expr: &Expr) {
        let label = match &expr.kind {
            ExprKind::IntLiteral(v) => format!("IntLiteral({})", v),
            ExprKind::BoolLiteral(b) => format!("BoolLiteral({})", b),
            ExprKind::VarRef(name) => format!("VarRef({})", name),
            ExprKind::This => "This".to_string(),
            ExprKind::Binary { op, .. } => format!("Binary({})", op.symbol()),
            ExprKind::Not(_) => "Not".to_string(),
            ExprKind::Paren(_) => "Paren".to_string(),
            ExprKind::Call { method, .. } => format!("Call({})", method),
            ExprKind::NewObject(class) => format!("NewObject({})", class),
            ExprKind::NewIntArray(_) => "NewIntArray".to_string(),
            ExprKind::ArrayLiteral(elements) => format!("ArrayLiteral[{}]", elements.len()),
            ExprKind::Index { .. } => "Index".to_string(),
            ExprKind::Length(_) => "Length".to_string(),
        };
        self.writeln(&format!("{} : {}", label, expr.ty));

        self.indent();
        match &expr.kind {
            ExprKind::Binary { lhs, rhs, .. } => {
                self.print_expr(lhs);
                self.print_expr(rhs);
            }
            ExprKind::Not(inner)
            | ExprKind::Paren(inner)
            | ExprKind::NewIntArray(inner)
            | ExprKind::Length(inner) => self.print_expr(inner),
            ExprKind::Call { receiver, args, .. } => {
                self.print_expr(receiver);
                for arg in args {
                    self.print_expr(arg);
                }
            }
            ExprKind::ArrayLiteral(elements) => {
                for e in elements {
                    self.print_expr(e);
                }
            }
            ExprKind::Index { array, index } => {
                self.print_expr(array);
                self.print_expr(index);
            }
            _ => {}
        }
        self.dedent();
    }
}
