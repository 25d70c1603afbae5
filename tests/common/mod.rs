// Common test utilities
#![allow(dead_code)]

use jmmc::ast::{ClassDecl, Expr, MethodDecl, Program, Stmt, Type};
use jmmc::ir;
use jmmc::{Compilation, Config};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Single-class program with no imports
pub fn program(class: ClassDecl) -> Program {
    Program::new(class)
}

pub fn compile(program: &Program) -> Compilation {
    init_logger();
    jmmc::compile(program, &Config::default()).expect("compilation failed")
}

pub fn compile_optimized(program: &Program) -> Compilation {
    init_logger();
    jmmc::compile(program, &Config::default().with_optimize(true)).expect("compilation failed")
}

pub fn ir_method<'a>(compilation: &'a Compilation, name: &str) -> &'a ir::Method {
    compilation
        .ir
        .method(name)
        .unwrap_or_else(|| panic!("no IR method {}", name))
}

/// IR instructions of `name`, one per line, without labels
pub fn ir_lines(compilation: &Compilation, name: &str) -> Vec<String> {
    ir_method(compilation, name)
        .instructions
        .iter()
        .map(|i| format!("{};", i))
        .collect()
}

/// Trimmed lines of the Jasmin block of method `name` (`<init>` for the constructor),
/// header and `.end method` excluded
pub fn jasmin_method(jasmin: &str, name: &str) -> Vec<String> {
    let needle = format!(" {}(", name);
    let mut lines = jasmin.lines();
    lines
        .by_ref()
        .find(|l| l.starts_with(".method") && l.contains(&needle))
        .unwrap_or_else(|| panic!("no Jasmin method {} in\n{}", name, jasmin));
    lines
        .take_while(|l| *l != ".end method")
        .map(|l| l.trim().to_string())
        .collect()
}

/// Jasmin instructions and labels of method `name`, directives excluded
pub fn jasmin_body(jasmin: &str, name: &str) -> Vec<String> {
    jasmin_method(jasmin, name)
        .into_iter()
        .filter(|l| !l.starts_with('.'))
        .collect()
}

pub fn int(name: &str) -> Expr {
    Expr::var(name, Type::Int)
}

pub fn boolean(name: &str) -> Expr {
    Expr::var(name, Type::Boolean)
}

pub fn assign(name: &str, ty: Type, value: Expr) -> Stmt {
    Stmt::assign(Expr::var(name, ty), value)
}

/// `class <name> { <method> }`
pub fn class_with(name: &str, methods: Vec<MethodDecl>) -> ClassDecl {
    methods
        .into_iter()
        .fold(ClassDecl::new(name), |class, m| class.method(m))
}
