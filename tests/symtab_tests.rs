//! Symbol table derivation and tree outline

mod common;

use common::*;
use jmmc::ast::{AstPrinter, BinaryOp, ClassDecl, Expr, MethodDecl, Stmt, Type};
use jmmc::common::{Symbol, SymbolTable};

fn sample() -> jmmc::ast::Program {
    let class = ClassDecl::new("Foo")
        .extends("Base")
        .field("count", Type::Int)
        .method(
            MethodDecl::new("sum", Type::Int)
                .param("k", Type::Int)
                .param("rest", Type::Vararg)
                .local("acc", Type::Int)
                .stmt(Stmt::ret(Some(Expr::binary(
                    BinaryOp::Add,
                    int("k"),
                    Expr::length(Expr::var("rest", Type::ArrayOfInt)),
                )))),
        )
        .method(MethodDecl::new("main", Type::Void).with_static());
    program(class).import("java.util.List").import("pkg.Base")
}

#[test]
fn test_table_from_program() {
    let table = SymbolTable::from_program(&sample());

    assert_eq!(table.class_name(), "Foo");
    assert_eq!(table.superclass(), Some("Base"));
    assert_eq!(table.imports(), &["java.util.List".to_string(), "pkg.Base".to_string()]);
    assert_eq!(table.field("count"), Some(&Symbol::new("count", Type::Int)));
    assert_eq!(table.method_names(), vec!["sum", "main"]);
    assert_eq!(table.locals("sum"), &[Symbol::new("acc", Type::Int)]);
    assert_eq!(table.return_type("sum"), Some(&Type::Int));
    assert!(table.method("sum").unwrap().has_vararg());
    assert!(!table.has_method("missing"));
    assert!(table.parameters("missing").is_empty());
}

#[test]
fn test_main_gets_args_parameter() {
    let table = SymbolTable::from_program(&sample());
    let main = table.method("main").unwrap();
    assert!(main.is_static);
    assert_eq!(main.params, vec![Symbol::new("args", Type::ArrayOfString)]);
}

#[test]
fn test_import_lookup_matches_last_segment() {
    let table = SymbolTable::from_program(&sample());
    assert_eq!(table.import_for("List"), Some("java.util.List"));
    assert_eq!(table.import_for("Base"), Some("pkg.Base"));
    assert_eq!(table.import_for("util"), None);
}

#[test]
fn test_table_round_trips_through_json() {
    let table = SymbolTable::from_program(&sample());
    let json = serde_json::to_string(&table).unwrap();
    let decoded: SymbolTable = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, table);
}

#[test]
fn test_tree_outline() {
    let outline = AstPrinter::new().print(&sample());
    let lines: Vec<&str> = outline.lines().collect();

    assert_eq!(
        &lines[..6],
        &[
            "Program",
            "  Import: java.util.List",
            "  Import: pkg.Base",
            "  Class: Foo extends Base",
            "    Field: int count",
            "    Method: public int sum(int k, int... rest)",
        ]
    );
    assert!(outline.contains("        Binary(+) : int\n"));
    assert!(outline.contains("          Length : int\n"));
    assert!(outline.contains("    Method: public static void main()\n"));
}
