//! Symbol table for one compilation unit
//!
//! Built once before the backend runs and read-only afterwards. A front end may hand
//! one over directly; [`SymbolTable::from_program`] derives it from an attributed tree.

use crate::ast::{MethodDecl, Program, Type};
use crate::consts::MAIN_METHOD;
use serde::{Deserialize, Serialize};

/// Named, typed declaration owned by a class (fields) or a method (params, locals)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Everything the backend needs to know about one method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<Symbol>,
    pub locals: Vec<Symbol>,
    pub return_type: Type,
    #[serde(default)]
    pub is_static: bool,
}

impl MethodSignature {
    /// Whether the trailing formal parameter packs extra arguments
    pub fn has_vararg(&self) -> bool {
        matches!(self.params.last(), Some(p) if p.ty == Type::Vararg)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTable {
    pub class_name: String,
    #[serde(default)]
    pub superclass: Option<String>,
    /// Import paths in dotted form, in declaration order
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub fields: Vec<Symbol>,
    #[serde(default)]
    pub methods: Vec<MethodSignature>,
}

impl SymbolTable {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            superclass: None,
            imports: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Build the table from an attributed tree
    pub fn from_program(program: &Program) -> Self {
        let class = &program.class;
        let table = Self {
            class_name: class.name.clone(),
            superclass: class.superclass.clone(),
            imports: program.imports.iter().map(|i| i.dotted()).collect(),
            fields: class
                .fields
                .iter()
                .map(|f| Symbol::new(f.name.clone(), f.ty.clone()))
                .collect(),
            methods: class.methods.iter().map(Self::signature_of).collect(),
        };
        log::debug!(
            "symbol table for {}: {} imports, {} fields, {} methods",
            table.class_name,
            table.imports.len(),
            table.fields.len(),
            table.methods.len()
        );
        table
    }

    fn signature_of(method: &MethodDecl) -> MethodSignature {
        let mut params: Vec<Symbol> = method
            .params
            .iter()
            .map(|p| Symbol::new(p.name.clone(), p.ty.clone()))
            .collect();
        if method.name == MAIN_METHOD && method.is_static && params.is_empty() {
            params.push(Symbol::new("args", Type::ArrayOfString));
        }
        MethodSignature {
            name: method.name.clone(),
            params,
            locals: method
                .locals
                .iter()
                .map(|l| Symbol::new(l.name.clone(), l.ty.clone()))
                .collect(),
            return_type: method.return_type.clone(),
            is_static: method.is_static,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn fields(&self) -> &[Symbol] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Symbol> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method_names(&self) -> Vec<&str> {
        self.methods.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn method(&self, name: &str) -> Option<&MethodSignature> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.method(name).is_some()
    }

    pub fn parameters(&self, method: &str) -> &[Symbol] {
        self.method(method).map(|m| m.params.as_slice()).unwrap_or(&[])
    }

    pub fn locals(&self, method: &str) -> &[Symbol] {
        self.method(method).map(|m| m.locals.as_slice()).unwrap_or(&[])
    }

    pub fn return_type(&self, method: &str) -> Option<&Type> {
        self.method(method).map(|m| &m.return_type)
    }

    /// Dotted import path whose last segment is `simple`
    pub fn import_for(&self, simple: &str) -> Option<&str> {
        crate::common::ClassResolver::new(self).import_for(simple)
    }
}
