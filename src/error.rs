use thiserror::Error;

/// Result type for jmmc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the jmmc backend
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed attributed tree: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Code generation error: {message}")]
    CodeGen { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The front end handed over a shape the backend has no rule for.
    #[error("Internal compiler error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Create a code generation error
    pub fn codegen_error(message: impl Into<String>) -> Self {
        Self::CodeGen { message: message.into() }
    }

    /// Create an internal (front-end contract violation) error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

impl From<crate::codegen::error::BytecodeError> for Error {
    fn from(err: crate::codegen::error::BytecodeError) -> Self {
        Self::Internal {
            message: format!("bytecode stack error: {}", err),
        }
    }
}
