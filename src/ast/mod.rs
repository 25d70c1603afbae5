//! Attributed syntax tree handed to the backend
//!
//! The front end (parser and semantic analysis) produces this tree with every
//! expression already carrying its resolved [`Type`]. The backend never re-validates it.

mod nodes;
mod printer;
mod types;

pub use nodes::*;
pub use printer::*;
pub use types::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source location information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Span of source code (start and end locations)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }

    pub fn from_to(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            start: Location::new(start_line, start_col),
            end: Location::new(end_line, end_col),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start.line, self.start.column)
    }
}

/// Nodes that know where they came from
pub trait AstNode {
    fn span(&self) -> Span;
}

/// Root of one compilation unit: imports plus the single class it declares
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub imports: Vec<ImportDecl>,
    pub class: ClassDecl,
    #[serde(default)]
    pub span: Span,
}

impl Program {
    pub fn new(class: ClassDecl) -> Self {
        Self {
            imports: Vec::new(),
            class,
            span: Span::default(),
        }
    }

    /// Add an import given in dotted form (`java.util.List`)
    pub fn import(mut self, dotted: &str) -> Self {
        self.imports.push(ImportDecl::from_dotted(dotted));
        self
    }

    /// Decode a JSON-encoded attributed tree
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl AstNode for Program {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for import in &self.imports {
            writeln!(f, "{}", import)?;
        }
        write!(f, "{}", self.class)
    }
}
