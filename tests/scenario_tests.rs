//! End-to-end scenarios and generator-wide properties

mod common;

use common::*;
use jmmc::ast::{BinaryOp, Expr, MethodDecl, Stmt, Type};
use jmmc::codegen::{JasminGenerator, MethodLimits};
use jmmc::common::{Symbol, SymbolTable};
use jmmc::ir::{self, Instruction, Operand, RegisterTable};
use std::collections::BTreeMap;

fn add_one() -> MethodDecl {
    MethodDecl::new("foo", Type::Void)
        .param("a", Type::Int)
        .local("x", Type::Int)
        .stmt(assign(
            "x",
            Type::Int,
            Expr::binary(BinaryOp::Add, int("a"), Expr::int(1)),
        ))
}

fn less_than() -> MethodDecl {
    MethodDecl::new("lt", Type::Boolean)
        .param("a", Type::Int)
        .param("b", Type::Int)
        .stmt(Stmt::ret(Some(Expr::binary(BinaryOp::Lt, int("a"), int("b")))))
}

fn limits<'a>(limits: &'a [MethodLimits], name: &str) -> &'a MethodLimits {
    limits
        .iter()
        .find(|l| l.name == name)
        .unwrap_or_else(|| panic!("no limits for {}", name))
}

#[test]
fn test_assignment_of_sum() {
    let compilation = compile(&program(class_with("Foo", vec![add_one()])));

    assert_eq!(
        ir_lines(&compilation, "foo"),
        vec![
            "tmp0.i32 :=.i32 a.i32 +.i32 1.i32;",
            "x.i32 :=.i32 tmp0.i32;",
            "ret.V;",
        ]
    );
    assert_eq!(
        jasmin_body(&compilation.jasmin, "foo"),
        vec![
            "iload_1", "iconst_1", "iadd", "istore_2", "iload_2", "istore_3", "return",
        ]
    );
    let foo = limits(&compilation.limits, "foo");
    assert_eq!(foo.max_stack, 2);
    assert_eq!(foo.max_locals, 4);
}

#[test]
fn test_relational_return() {
    let compilation = compile(&program(class_with("Foo", vec![less_than()])));

    assert_eq!(
        jasmin_body(&compilation.jasmin, "lt"),
        vec![
            "iload_1",
            "iload_2",
            "isub",
            "iflt cmp_true_0",
            "iconst_0",
            "goto cmp_end_0",
            "cmp_true_0:",
            "iconst_1",
            "cmp_end_0:",
            "istore_3",
            "iload_3",
            "ireturn",
        ]
    );
    assert_eq!(limits(&compilation.limits, "lt").max_stack, 2);
}

#[test]
fn test_relational_labels_count_per_method() {
    let method = MethodDecl::new("both", Type::Boolean)
        .param("a", Type::Int)
        .param("b", Type::Int)
        .local("p", Type::Boolean)
        .stmt(assign("p", Type::Boolean, Expr::binary(BinaryOp::Gt, int("a"), int("b"))))
        .stmt(Stmt::ret(Some(Expr::binary(BinaryOp::Eq, int("a"), int("b")))));
    let compilation = compile(&program(class_with("Foo", vec![less_than(), method])));

    let body = jasmin_body(&compilation.jasmin, "both");
    assert!(body.contains(&"ifgt cmp_true_0".to_string()));
    assert!(body.contains(&"ifeq cmp_true_1".to_string()));
    assert!(body.contains(&"cmp_end_1:".to_string()));
}

#[test]
fn test_every_method_is_stack_balanced() {
    let class = class_with("Foo", vec![add_one(), less_than()]).field("n", Type::Int);
    let compilation = compile(&program(class));

    assert_eq!(compilation.limits.len(), 3);
    for method in &compilation.limits {
        assert!(method.max_stack <= 2, "{} uses {}", method.name, method.max_stack);
    }
}

fn bad_class() -> ir::Class {
    ir::Class {
        name: "Foo".to_string(),
        superclass: None,
        imports: Vec::new(),
        fields: Vec::new(),
        methods: vec![ir::Method {
            name: "leak".to_string(),
            is_public: true,
            is_static: false,
            is_final: false,
            is_constructor: false,
            params: Vec::new(),
            return_type: Type::Void,
            instructions: vec![
                Instruction::SingleOp(Operand::int(1)),
                Instruction::Return {
                    ty: Type::Void,
                    operand: None,
                },
            ],
            labels: BTreeMap::new(),
            var_table: RegisterTable::for_method(false, std::iter::empty()),
        }],
    }
}

#[test]
fn test_unbalanced_instruction_is_internal_error() {
    let class = bad_class();
    let table = SymbolTable::new("Foo");
    let mut generator = JasminGenerator::new(&class, &table);

    let err = generator.build().unwrap_err();
    assert!(err.is_internal(), "unexpected error: {}", err);
    assert!(generator.method_limits().is_empty());
}

#[test]
fn test_typed_return_without_operand_is_internal_error() {
    let mut class = bad_class();
    class.methods[0].return_type = Type::Int;
    class.methods[0].instructions = vec![Instruction::Return {
        ty: Type::Int,
        operand: None,
    }];
    let table = SymbolTable::new("Foo");

    let err = JasminGenerator::new(&class, &table).build().unwrap_err();
    assert!(err.is_internal());
}

#[test]
fn test_implicit_return_in_jasmin() {
    let compilation = compile(&program(class_with("Foo", vec![add_one()])));
    let body = jasmin_body(&compilation.jasmin, "foo");
    assert_eq!(body.iter().filter(|l| *l == "return").count(), 1);
    assert_eq!(body.last().map(String::as_str), Some("return"));
}

#[test]
fn test_generator_adds_missing_void_return() {
    let mut class = bad_class();
    class.methods[0].instructions = vec![Instruction::assign(
        Operand::var("x", Type::Int),
        Instruction::SingleOp(Operand::int(3)),
    )];
    let table = SymbolTable::new("Foo");

    let mut generator = JasminGenerator::new(&class, &table);
    let text = generator.build().unwrap().to_string();
    assert_eq!(jasmin_body(&text, "leak"), vec!["iconst_3", "istore_1", "return"]);
}

#[test]
fn test_build_is_idempotent() {
    let program = program(class_with("Foo", vec![add_one(), less_than()]));
    let table = SymbolTable::from_program(&program);
    let class = jmmc::lower::lower_program(&program, &table).unwrap();

    let mut generator = JasminGenerator::new(&class, &table);
    let first = generator.build().unwrap().to_string();
    let second = generator.build().unwrap().to_string();
    assert_eq!(first, second);
    assert_eq!(generator.method_limits().len(), 3);
}

#[test]
fn test_slots_are_stable() {
    let program = program(class_with("Foo", vec![add_one()]));
    let table = SymbolTable::from_program(&program);
    let first = jmmc::lower::lower_program(&program, &table).unwrap();
    let second = jmmc::lower::lower_program(&program, &table).unwrap();

    let foo = first.method("foo").unwrap();
    assert_eq!(foo.var_table.get("this"), Some(0));
    assert_eq!(foo.var_table.get("a"), Some(1));
    assert_eq!(foo.var_table, second.method("foo").unwrap().var_table);
    assert_eq!(first, second);

    let a = JasminGenerator::new(&first, &table).build().unwrap().to_string();
    let b = JasminGenerator::new(&second, &table).build().unwrap().to_string();
    assert_eq!(a, b);
}

#[test]
fn test_static_method_slots_start_at_zero() {
    let method = MethodDecl::new("twice", Type::Int)
        .with_static()
        .param("n", Type::Int)
        .stmt(Stmt::ret(Some(Expr::binary(BinaryOp::Mul, int("n"), Expr::int(2)))));
    let compilation = compile(&program(class_with("Foo", vec![method])));

    let twice = ir_method(&compilation, "twice");
    assert_eq!(twice.var_table.get("this"), None);
    assert_eq!(twice.var_table.get("n"), Some(0));
    assert_eq!(
        jasmin_body(&compilation.jasmin, "twice"),
        vec!["iload_0", "iconst_2", "imul", "istore_1", "iload_1", "ireturn"]
    );
    assert_eq!(limits(&compilation.limits, "twice").max_locals, 2);
}

#[test]
fn test_symbol_table_can_be_supplied() {
    let program = program(class_with("Foo", vec![add_one()]));
    let mut table = SymbolTable::from_program(&program);
    table.fields.push(Symbol::new("a", Type::Int));

    // parameters still win over fields of the same name
    let compilation = jmmc::compile_with_table(&program, &table, &jmmc::Config::default()).unwrap();
    assert_eq!(
        ir_lines(&compilation, "foo")[0],
        "tmp0.i32 :=.i32 a.i32 +.i32 1.i32;"
    );
}
