//! Origin resolution for names used inside a method body
//!
//! One service for every lowering rule: probe locals, then parameters, then fields,
//! then imports, then the enclosing class and its superclass.

use crate::ast::Type;
use crate::common::{ClassResolver, Symbol, SymbolTable};
use crate::consts::THIS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin<'a> {
    Local(&'a Symbol),
    Param(&'a Symbol),
    Field(&'a Symbol),
    /// Dotted path of the matching import
    Import(&'a str),
    /// `this`, the enclosing class or its superclass named bare
    Class,
    Unknown,
}

#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    table: &'a SymbolTable,
    method: &'a str,
}

impl<'a> Scope<'a> {
    pub fn new(table: &'a SymbolTable, method: &'a str) -> Self {
        Self { table, method }
    }

    pub fn table(&self) -> &'a SymbolTable {
        self.table
    }

    pub fn method_name(&self) -> &'a str {
        self.method
    }

    pub fn class_name(&self) -> &'a str {
        self.table.class_name()
    }

    pub fn return_type(&self) -> Type {
        self.table
            .return_type(self.method)
            .cloned()
            .unwrap_or(Type::Void)
    }

    pub fn resolve(&self, name: &str) -> Origin<'a> {
        if name == THIS {
            return Origin::Class;
        }
        if let Some(sym) = self.table.locals(self.method).iter().find(|s| s.name == name) {
            return Origin::Local(sym);
        }
        if let Some(sym) = self
            .table
            .parameters(self.method)
            .iter()
            .find(|s| s.name == name)
        {
            return Origin::Param(sym);
        }
        if let Some(sym) = self.table.field(name) {
            return Origin::Field(sym);
        }
        if let Some(path) = ClassResolver::new(self.table).import_for(name) {
            return Origin::Import(path);
        }
        if name == self.table.class_name() || self.table.superclass() == Some(name) {
            return Origin::Class;
        }
        Origin::Unknown
    }
}
