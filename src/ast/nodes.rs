use super::{AstNode, Span, Type};
use serde::{Deserialize, Serialize};
use std::fmt;

// Imports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDecl {
    /// Dotted path split into its segments
    pub path: Vec<String>,
    #[serde(default)]
    pub span: Span,
}

impl ImportDecl {
    pub fn from_dotted(dotted: &str) -> Self {
        Self {
            path: dotted.split('.').map(str::to_string).collect(),
            span: Span::default(),
        }
    }

    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

impl fmt::Display for ImportDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "import {};", self.dotted())
    }
}

// Declarations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub fields: Vec<VarDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default)]
    pub span: Span,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            fields: Vec::new(),
            methods: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.fields.push(VarDecl::new(name, ty));
        self
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }
}

impl AstNode for ClassDecl {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for ClassDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.name)?;
        if let Some(superclass) = &self.superclass {
            write!(f, " extends {}", superclass)?;
        }
        Ok(())
    }
}

/// Field or local variable declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub ty: Type,
    #[serde(default)]
    pub span: Span,
}

impl VarDecl {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            span: Span::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_final: bool,
    pub return_type: Type,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub locals: Vec<VarDecl>,
    #[serde(default)]
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub span: Span,
}

fn default_true() -> bool {
    true
}

impl MethodDecl {
    pub fn new(name: impl Into<String>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            is_public: true,
            is_static: false,
            is_final: false,
            return_type,
            params: Vec::new(),
            locals: Vec::new(),
            body: Vec::new(),
            span: Span::default(),
        }
    }

    /// `public static void main(String[] args)`
    pub fn main() -> Self {
        Self::new(crate::consts::MAIN_METHOD, Type::Void)
            .with_static()
            .param("args", Type::ArrayOfString)
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.params.push(Param {
            name: name.into(),
            ty,
            span: Span::default(),
        });
        self
    }

    pub fn local(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.locals.push(VarDecl::new(name, ty));
        self
    }

    pub fn stmt(mut self, stmt: Stmt) -> Self {
        self.body.push(stmt);
        self
    }
}

impl AstNode for MethodDecl {
    fn span(&self) -> Span {
        self.span
    }
}

// Statements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StmtKind {
    Block(Vec<Stmt>),
    Assign { target: Expr, value: Expr },
    Expr(Expr),
    Return(Option<Expr>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While { cond: Expr, body: Box<Stmt> },
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Self {
            kind,
            span: Span::default(),
        }
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Self::new(StmtKind::Assign { target, value })
    }

    pub fn expr(expr: Expr) -> Self {
        Self::new(StmtKind::Expr(expr))
    }

    pub fn ret(value: Option<Expr>) -> Self {
        Self::new(StmtKind::Return(value))
    }

    pub fn block(stmts: Vec<Stmt>) -> Self {
        Self::new(StmtKind::Block(stmts))
    }

    pub fn if_else(cond: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Self {
        Self::new(StmtKind::If {
            cond,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        })
    }

    pub fn while_loop(cond: Expr, body: Stmt) -> Self {
        Self::new(StmtKind::While {
            cond,
            body: Box::new(body),
        })
    }

    pub fn is_return(&self) -> bool {
        matches!(self.kind, StmtKind::Return(_))
    }
}

impl AstNode for Stmt {
    fn span(&self) -> Span {
        self.span
    }
}

// Expressions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    /// Resolved type attribute set by semantic analysis
    pub ty: Type,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExprKind {
    IntLiteral(i32),
    BoolLiteral(bool),
    VarRef(String),
    This,
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Not(Box<Expr>),
    /// Parenthesized expression; lowers to whatever its child lowers to
    Paren(Box<Expr>),
    Call {
        receiver: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    NewObject(String),
    NewIntArray(Box<Expr>),
    ArrayLiteral(Vec<Expr>),
    Index { array: Box<Expr>, index: Box<Expr> },
    Length(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Eq,
    Ne,
    And,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div)
    }

    /// Type semantic analysis assigns to `lhs op rhs`
    pub fn result_type(&self) -> Type {
        if self.is_arithmetic() {
            Type::Int
        } else {
            Type::Boolean
        }
    }
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type) -> Self {
        Self {
            kind,
            ty,
            span: Span::default(),
        }
    }

    pub fn int(value: i32) -> Self {
        Self::new(ExprKind::IntLiteral(value), Type::Int)
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(ExprKind::BoolLiteral(value), Type::Boolean)
    }

    pub fn var(name: impl Into<String>, ty: Type) -> Self {
        Self::new(ExprKind::VarRef(name.into()), ty)
    }

    pub fn this(class: impl Into<String>) -> Self {
        Self::new(ExprKind::This, Type::Object(class.into()))
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Self::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            op.result_type(),
        )
    }

    pub fn not(operand: Expr) -> Self {
        Self::new(ExprKind::Not(Box::new(operand)), Type::Boolean)
    }

    pub fn paren(inner: Expr) -> Self {
        let ty = inner.ty.clone();
        Self::new(ExprKind::Paren(Box::new(inner)), ty)
    }

    pub fn call(receiver: Expr, method: impl Into<String>, args: Vec<Expr>, ty: Type) -> Self {
        Self::new(
            ExprKind::Call {
                receiver: Box::new(receiver),
                method: method.into(),
                args,
            },
            ty,
        )
    }

    pub fn new_object(class: impl Into<String>) -> Self {
        let class = class.into();
        Self::new(ExprKind::NewObject(class.clone()), Type::Object(class))
    }

    pub fn new_int_array(size: Expr) -> Self {
        Self::new(ExprKind::NewIntArray(Box::new(size)), Type::ArrayOfInt)
    }

    pub fn array_literal(elements: Vec<Expr>) -> Self {
        Self::new(ExprKind::ArrayLiteral(elements), Type::ArrayOfInt)
    }

    pub fn index(array: Expr, index: Expr) -> Self {
        Self::new(
            ExprKind::Index {
                array: Box::new(array),
                index: Box::new(index),
            },
            Type::Int,
        )
    }

    pub fn length(array: Expr) -> Self {
        Self::new(ExprKind::Length(Box::new(array)), Type::Int)
    }

    /// Strip any number of enclosing parentheses
    pub fn skip_parens(&self) -> &Expr {
        let mut expr = self;
        while let ExprKind::Paren(inner) = &expr.kind {
            expr = inner;
        }
        expr
    }
}

impl AstNode for Expr {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::IntLiteral(v) => write!(f, "{}", v),
            ExprKind::BoolLiteral(b) => write!(f, "{}", b),
            ExprKind::VarRef(name) => write!(f, "{}", name),
            ExprKind::This => write!(f, "this"),
            ExprKind::Binary { op, lhs, rhs } => write!(f, "{} {} {}", lhs, op.symbol(), rhs),
            ExprKind::Not(operand) => write!(f, "!{}", operand),
            ExprKind::Paren(inner) => write!(f, "({})", inner),
            ExprKind::Call { receiver, method, args } => {
                write!(f, "{}.{}(", receiver, method)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            ExprKind::NewObject(class) => write!(f, "new {}()", class),
            ExprKind::NewIntArray(size) => write!(f, "new int[{}]", size),
            ExprKind::ArrayLiteral(elements) => {
                write!(f, "[")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", e)?;
                }
                write!(f, "]")
            }
            ExprKind::Index { array, index } => write!(f, "{}[{}]", array, index),
            ExprKind::Length(array) => write!(f, "{}.length", array),
        }
    }
}
