//! Class and method assembly

use super::context::CompilationContext;
use super::expr::MethodLowering;
use super::scope::Scope;
use crate::ast::{ClassDecl, MethodDecl, Program, Type};
use crate::common::{Symbol, SymbolTable};
use crate::consts::INIT_METHOD;
use crate::error::Result;
use crate::ir::{self, Call, CallKind, Fragment, Instruction, Operand, RegisterTable};
use std::collections::BTreeMap;

pub fn lower_class(
    program: &Program,
    table: &SymbolTable,
    ctx: &mut CompilationContext,
) -> Result<ir::Class> {
    let class = &program.class;
    log::debug!("lowering class {}", class.name);

    let mut methods = Vec::with_capacity(class.methods.len() + 1);
    for method in &class.methods {
        methods.push(lower_method(method, table, ctx)?);
    }
    methods.push(default_constructor(class));

    Ok(ir::Class {
        name: class.name.clone(),
        superclass: class.superclass.clone(),
        imports: program.imports.iter().map(|i| i.dotted()).collect(),
        fields: class
            .fields
            .iter()
            .map(|f| ir::Field {
                name: f.name.clone(),
                ty: f.ty.value_type(),
                is_public: true,
                is_static: false,
                is_final: false,
            })
            .collect(),
        methods,
    })
}

fn lower_method(
    method: &MethodDecl,
    table: &SymbolTable,
    ctx: &mut CompilationContext,
) -> Result<ir::Method> {
    let params: Vec<Symbol> = match table.method(&method.name) {
        Some(signature) => signature.params.clone(),
        None => method
            .params
            .iter()
            .map(|p| Symbol::new(p.name.clone(), p.ty.clone()))
            .collect(),
    };

    ctx.reserve_names(
        params
            .iter()
            .map(|p| p.name.as_str())
            .chain(table.locals(&method.name).iter().map(|l| l.name.as_str()))
            .chain(method.locals.iter().map(|l| l.name.as_str())),
    );
    let mut lowering = MethodLowering::new(ctx, Scope::new(table, &method.name));
    let mut fragments = Vec::new();
    for stmt in &method.body {
        fragments.extend(lowering.lower_stmt(stmt)?);
    }

    let (mut instructions, mut labels) = assemble(fragments);
    prune_trailing_labels(&instructions, &mut labels);
    let label_at_end = labels.values().any(|&at| at == instructions.len());
    let ends_in_return = instructions.last().map_or(false, Instruction::is_return);
    if method.return_type.is_void() && (!ends_in_return || label_at_end) {
        instructions.push(Instruction::Return {
            ty: Type::Void,
            operand: None,
        });
    }
    log::debug!(
        "lowered {}: {} instructions, {} labels",
        method.name,
        instructions.len(),
        labels.len()
    );

    Ok(ir::Method {
        name: method.name.clone(),
        is_public: method.is_public,
        is_static: method.is_static,
        is_final: method.is_final,
        is_constructor: false,
        var_table: RegisterTable::for_method(
            method.is_static,
            params.iter().map(|p| p.name.as_str()),
        ),
        params,
        return_type: method.return_type.clone(),
        instructions,
        labels,
    })
}

/// Split lowered fragments into instructions and a label index
fn assemble(fragments: Vec<Fragment>) -> (Vec<Instruction>, BTreeMap<String, usize>) {
    let mut instructions = Vec::with_capacity(fragments.len());
    let mut labels = BTreeMap::new();
    for fragment in fragments {
        match fragment {
            Fragment::Label(name) => {
                labels.insert(name, instructions.len());
            }
            Fragment::Instr(inst) => instructions.push(inst),
        }
    }
    (instructions, labels)
}

/// Drop labels past the last instruction that no jump targets
fn prune_trailing_labels(instructions: &[Instruction], labels: &mut BTreeMap<String, usize>) {
    let end = instructions.len();
    labels.retain(|name, &mut at| {
        at != end
            || instructions.iter().any(|inst| match inst {
                Instruction::Goto(target) | Instruction::CondBranch { label: target, .. } => {
                    target == name
                }
                _ => false,
            })
    });
}

/// Constructor that only chains to the superclass
fn default_constructor(class: &ClassDecl) -> ir::Method {
    ir::Method {
        name: class.name.clone(),
        is_public: true,
        is_static: false,
        is_final: false,
        is_constructor: true,
        params: Vec::new(),
        return_type: Type::Void,
        instructions: vec![
            Instruction::Call(Call {
                kind: CallKind::Special,
                target: Operand::this(class.name.as_str()),
                method: Some(INIT_METHOD.to_string()),
                args: Vec::new(),
                return_type: Type::Void,
            }),
            Instruction::Return {
                ty: Type::Void,
                operand: None,
            },
        ],
        labels: BTreeMap::new(),
        var_table: RegisterTable::for_method(false, std::iter::empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_points_labels_at_next_instruction() {
        let fragments = vec![
            Fragment::Label("top".to_string()),
            Fragment::Instr(Instruction::Goto("end".to_string())),
            Fragment::Label("end".to_string()),
        ];
        let (instructions, labels) = assemble(fragments);
        assert_eq!(instructions.len(), 1);
        assert_eq!(labels["top"], 0);
        assert_eq!(labels["end"], 1);
    }

    #[test]
    fn test_unreferenced_trailing_labels_are_dropped() {
        let instructions = vec![
            Instruction::CondBranch {
                condition: Operand::boolean(true),
                label: "then0".to_string(),
            },
            Instruction::Goto("endif1".to_string()),
        ];
        let mut labels = BTreeMap::new();
        labels.insert("then0".to_string(), 2);
        labels.insert("endif1".to_string(), 2);
        labels.insert("unused2".to_string(), 2);
        labels.insert("mid3".to_string(), 1);
        prune_trailing_labels(&instructions, &mut labels);
        let kept: Vec<&str> = labels.keys().map(String::as_str).collect();
        assert_eq!(kept, vec!["endif1", "mid3", "then0"]);
    }

    #[test]
    fn test_default_constructor_shape() {
        let ctor = default_constructor(&ClassDecl::new("Foo"));
        assert!(ctor.is_constructor);
        assert_eq!(ctor.name, "Foo");
        assert_eq!(ctor.instructions.len(), 2);
        assert!(ctor.ends_with_return());
        assert_eq!(ctor.var_table.get("this"), Some(0));
    }
}
