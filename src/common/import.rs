//! Import resolution
//!
//! Maps the simple class names the language uses to the slash-separated binary
//! names the target assembler expects. Unresolvable names fall back to themselves.

use crate::common::symtab::SymbolTable;
use crate::consts::{STRING_BINARY_NAME, THIS};

#[derive(Debug, Clone, Copy)]
pub struct ClassResolver<'a> {
    class_name: &'a str,
    imports: &'a [String],
}

impl<'a> ClassResolver<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self {
            class_name: table.class_name(),
            imports: table.imports(),
        }
    }

    pub fn from_parts(class_name: &'a str, imports: &'a [String]) -> Self {
        Self { class_name, imports }
    }

    /// Dotted import path whose last segment is `simple`
    pub fn import_for(&self, simple: &str) -> Option<&'a str> {
        self.imports
            .iter()
            .find(|path| path.rsplit('.').next() == Some(simple))
            .map(String::as_str)
    }

    /// Binary name of `name` (`java.util.List` imported as `List` becomes `java/util/List`)
    pub fn binary_name(&self, name: &str) -> String {
        if name == THIS || name == self.class_name {
            return to_binary(self.class_name);
        }
        if let Some(path) = self.import_for(name) {
            return to_binary(path);
        }
        if name == "String" {
            return STRING_BINARY_NAME.to_string();
        }
        log::trace!("class name '{}' left unresolved", name);
        name.to_string()
    }
}

fn to_binary(dotted: &str) -> String {
    dotted.replace('.', "/")
}
