use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolved type of a declaration or expression.
///
/// `ArrayOfInt` is the only array shape the language has; `ArrayOfString` exists solely for
/// the `args` parameter of `main`. `Vararg` is only legal as the last formal parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Int,
    Boolean,
    Void,
    ArrayOfInt,
    ArrayOfString,
    Vararg,
    Object(String),
}

impl Type {
    pub fn object(name: impl Into<String>) -> Self {
        Type::Object(name.into())
    }

    pub fn string() -> Self {
        Type::Object("String".to_string())
    }

    /// Types that live in a reference slot (`aload`/`astore` family)
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::ArrayOfInt | Type::ArrayOfString | Type::Vararg | Type::Object(_)
        )
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::ArrayOfInt | Type::ArrayOfString | Type::Vararg)
    }

    /// The type a value of this type has once it is inside a method body.
    /// A vararg parameter is seen by the body as the array it was packed into.
    pub fn value_type(&self) -> Type {
        match self {
            Type::Vararg => Type::ArrayOfInt,
            other => other.clone(),
        }
    }

    /// IR suffix without the leading dot. `Vararg` renders as its packed array form;
    /// lowering refuses to name a `Vararg` value through `lower::ir_type_suffix`.
    pub fn suffix(&self) -> String {
        match self {
            Type::Int => "i32".to_string(),
            Type::Boolean => "bool".to_string(),
            Type::Void => "V".to_string(),
            Type::ArrayOfInt | Type::Vararg => "array.i32".to_string(),
            Type::ArrayOfString => "array.String".to_string(),
            Type::Object(name) => name.clone(),
        }
    }

    /// Class name carried by an object type
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Object(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Boolean => write!(f, "boolean"),
            Type::Void => write!(f, "void"),
            Type::ArrayOfInt => write!(f, "int[]"),
            Type::ArrayOfString => write!(f, "String[]"),
            Type::Vararg => write!(f, "int..."),
            Type::Object(name) => write!(f, "{}", name),
        }
    }
}
