use thiserror::Error;

use crate::ir::verify::VerifyError;

pub type Result<T> = std::result::Result<T, Error>;

/// Every violation the front-end can detect. All of them are fatal: the
/// first error aborts compilation, no recovery is attempted.
#[derive(Debug, Error)]
pub enum Error {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("duplicated symbol definition: {0}")]
    DuplicatedDef(String),

    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("using break/continue outside of loop")]
    NotInLoop,

    #[error("division by zero in constant expression")]
    DivisionByZero,

    #[error("unexpected non-constant initializer")]
    NonConstInit,

    #[error("array size must be a non-negative integer constant")]
    InvalidArrayLen,

    #[error("initializer overflow")]
    InitializerOverflow,

    #[error("nested initializer list is too deep")]
    InitializerTooDeep,

    #[error("scalar variable cannot take a list initializer")]
    ScalarListInit,

    #[error("float type cannot use mod operator")]
    FloatMod,

    #[error("unknown type cast: {from} -> {to}")]
    InvalidCast { from: String, to: String },

    #[error("argument mismatch in call to {0}")]
    ArgMismatch(String),

    #[error("using a void value")]
    UseVoidValue,

    #[error("assigning to an array")]
    ArrayAssign,

    #[error("returning a value in void function")]
    RetValInVoidFunc,

    #[error("verifier: {0}")]
    Verify(#[from] VerifyError),
}

/// The six-kind taxonomy used for the driver's fatal log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Type,
    Shape,
    Const,
    Scope,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax(_) => ErrorKind::Syntax,
            Error::DuplicatedDef(_) | Error::SymbolNotFound(_) | Error::NotInLoop => {
                ErrorKind::Scope
            }
            Error::DivisionByZero | Error::NonConstInit => ErrorKind::Const,
            Error::InvalidArrayLen
            | Error::InitializerOverflow
            | Error::InitializerTooDeep
            | Error::ScalarListInit => ErrorKind::Shape,
            Error::FloatMod
            | Error::InvalidCast { .. }
            | Error::ArgMismatch(_)
            | Error::UseVoidValue
            | Error::ArrayAssign
            | Error::RetValInVoidFunc => ErrorKind::Type,
            Error::Verify(_) => ErrorKind::Internal,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Shape => "ShapeError",
            ErrorKind::Const => "ConstError",
            ErrorKind::Scope => "ScopeError",
            ErrorKind::Internal => "InternalError",
        };
        f.write_str(s)
    }
}
